//! Business services for the Shiteni platform.
//! - Vendor onboarding, auth and subscription billing are shared by every
//!   service type.
//! - `hotel`, `inventory` and `transport` hold the per-type operations.
//! - Entities and field validation live in the `models` crate.

use uuid::Uuid;

pub mod errors;
pub mod auth;
pub mod billing;
pub mod vendor_service;
pub mod user_service;
pub mod staff_service;
pub mod hotel;
pub mod inventory;
pub mod transport;
pub mod dashboard;
#[cfg(test)]
pub mod test_support;

/// Who is acting on a vendor-scoped resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Staff of the owning vendor.
    Vendor(Uuid),
    /// A customer account booking or buying for itself.
    Customer(Uuid),
}
