//! Subscription billing: plan catalog, limit checks, payment gateway and the
//! upgrade / renewal workflow.

pub mod plans;
pub mod limits;
pub mod gateway;
pub mod retry;
pub mod repository;
pub mod service;

pub use plans::{Plan, PlanLimits, Resource, Usage};
pub use service::SubscriptionService;
