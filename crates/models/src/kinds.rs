//! String-backed domain enums.
//!
//! Columns store the lowercase form returned by `as_str`; parsing is
//! case-insensitive and ignores surrounding whitespace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(ModelError::Validation(format!("invalid {}: {other:?}", $label))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }
    };
}

string_enum!(
    /// Business category of a vendor; decides which dashboard and data set apply.
    ServiceType, "service type" {
        Hotel => "hotel",
        Store => "store",
        Pharmacy => "pharmacy",
        Bus => "bus",
    }
);

string_enum!(Role, "role" { Admin => "admin", Vendor => "vendor", Customer => "customer" });

string_enum!(
    /// Subscription tiers, ordered by price.
    PlanTier, "plan tier" {
        Basic => "basic",
        Premium => "premium",
        Enterprise => "enterprise",
    }
);

string_enum!(VendorStatus, "vendor status" { Active => "active", Suspended => "suspended" });

string_enum!(SubscriptionStatus, "subscription status" {
    Active => "active",
    Pending => "pending",
    PastDue => "past_due",
    Canceled => "canceled",
});

string_enum!(PaymentStatus, "payment status" { Succeeded => "succeeded", Pending => "pending", Failed => "failed" });

string_enum!(BookingStatus, "booking status" { Confirmed => "confirmed", Cancelled => "cancelled", Completed => "completed" });

string_enum!(RoomStatus, "room status" { Available => "available", Maintenance => "maintenance" });

string_enum!(ItemKind, "item kind" { Product => "product", Medicine => "medicine" });

string_enum!(TicketStatus, "ticket status" { Issued => "issued", Cancelled => "cancelled" });

impl ServiceType {
    /// Frontend route of the vendor dashboard for this service type.
    pub fn dashboard_path(&self) -> String {
        format!("/dashboard/{}", self.as_str())
    }

    /// Inventory kind a vendor of this type manages, if it keeps inventory.
    pub fn item_kind(&self) -> Option<ItemKind> {
        match self {
            ServiceType::Store => Some(ItemKind::Product),
            ServiceType::Pharmacy => Some(ItemKind::Medicine),
            ServiceType::Hotel | ServiceType::Bus => None,
        }
    }
}

impl PlanTier {
    fn rank(&self) -> u8 {
        match self { PlanTier::Basic => 0, PlanTier::Premium => 1, PlanTier::Enterprise => 2 }
    }
}

impl PartialOrd for PlanTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for PlanTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering { self.rank().cmp(&other.rank()) }
}

impl BookingStatus {
    /// Bookings that hold the room and count towards revenue.
    pub fn is_billable(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }
}
