//! Hotel vendors: rooms and date-ranged bookings.
//!
//! A booking holds its room for the half-open night range
//! `[check_in, check_out)`, so a guest may check in on the day the previous
//! one checks out.

pub mod rooms;
pub mod bookings;

use chrono::NaiveDate;
use models::{booking, BookingStatus};
use sea_orm::{ColumnTrait, Condition};

use crate::errors::ServiceError;

pub const MAX_NIGHTS: i64 = 365;

/// Number of nights between two dates; `check_out` must be later.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64, ServiceError> {
    let n = (check_out - check_in).num_days();
    if n <= 0 {
        return Err(ServiceError::Validation("check_out must be after check_in".into()));
    }
    if n > MAX_NIGHTS {
        return Err(ServiceError::Validation(format!("stays are limited to {MAX_NIGHTS} nights")));
    }
    Ok(n)
}

/// Live bookings sharing at least one night with `[check_in, check_out)`.
pub(crate) fn live_overlap(check_in: NaiveDate, check_out: NaiveDate) -> Condition {
    Condition::all()
        .add(booking::Column::Status.ne(BookingStatus::Cancelled.as_str()))
        .add(booking::Column::CheckIn.lt(check_out))
        .add(booking::Column::CheckOut.gt(check_in))
}

/// Stay price in cents.
pub fn quote(price_per_night_cents: i64, nights: i64) -> Result<i64, ServiceError> {
    price_per_night_cents
        .checked_mul(nights)
        .ok_or_else(|| ServiceError::Validation("booking total overflows".into()))
}

/// Only confirmed bookings move, and only to cancelled or completed.
pub fn check_transition(from: BookingStatus, to: BookingStatus) -> Result<(), ServiceError> {
    match (from, to) {
        (BookingStatus::Confirmed, BookingStatus::Cancelled | BookingStatus::Completed) => Ok(()),
        _ => Err(ServiceError::Conflict(format!("booking cannot move from {from} to {to}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, 3, day).unwrap() }

    #[test]
    fn nights_require_positive_range() {
        assert_eq!(nights(d(1), d(4)).unwrap(), 3);
        assert!(matches!(nights(d(4), d(4)), Err(ServiceError::Validation(_))));
        assert!(matches!(nights(d(5), d(4)), Err(ServiceError::Validation(_))));
        let far = NaiveDate::from_ymd_opt(2027, 3, 5).unwrap();
        assert!(nights(d(1), far).is_err());
    }

    #[test]
    fn overlap_is_strict_on_both_ends() {
        use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};
        let sql = booking::Entity::find()
            .filter(live_overlap(d(3), d(5)))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""booking"."status" <> 'cancelled'"#), "{sql}");
        assert!(sql.contains(r#""booking"."check_in" < '2026-03-05'"#), "{sql}");
        assert!(sql.contains(r#""booking"."check_out" > '2026-03-03'"#), "{sql}");
    }

    #[test]
    fn quote_multiplies_nights() {
        assert_eq!(quote(12_500, 3).unwrap(), 37_500);
        assert_eq!(quote(0, 2).unwrap(), 0);
        assert!(quote(i64::MAX, 2).is_err());
    }

    #[test]
    fn status_transitions() {
        assert!(check_transition(BookingStatus::Confirmed, BookingStatus::Cancelled).is_ok());
        assert!(check_transition(BookingStatus::Confirmed, BookingStatus::Completed).is_ok());
        assert!(check_transition(BookingStatus::Cancelled, BookingStatus::Confirmed).is_err());
        assert!(check_transition(BookingStatus::Completed, BookingStatus::Cancelled).is_err());
        assert!(check_transition(BookingStatus::Confirmed, BookingStatus::Confirmed).is_err());
    }
}
