//! Per-service-type dashboard summaries.
//!
//! `aggregate` holds pure functions over loaded rows; `service` loads the
//! rows and caches results per vendor.

pub mod aggregate;
pub mod service;

pub use aggregate::{DashboardView, HotelSummary, InventorySummary, MonthlyPoint, PlatformSummary, TransportSummary};
pub use service::DashboardService;
