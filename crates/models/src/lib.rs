pub mod errors;
pub mod db;
pub mod kinds;
pub mod vendor;
pub mod user;
pub mod user_credentials;
pub mod subscription;
pub mod payment;
pub mod staff;
pub mod room;
pub mod booking;
pub mod inventory_item;
pub mod sale;
pub mod bus;
pub mod trip;
pub mod ticket;

pub use kinds::{
    BookingStatus, ItemKind, PaymentStatus, PlanTier, Role, RoomStatus, ServiceType, SubscriptionStatus,
    TicketStatus, VendorStatus,
};

#[cfg(test)]
mod tests;
