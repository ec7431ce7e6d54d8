//! Store and pharmacy stock: products, medicines and point-of-sale records.

pub mod items;
pub mod sales;

use chrono::NaiveDate;
use models::inventory_item;

use crate::errors::ServiceError;

/// In stock but at or below the reorder level.
pub fn is_low_stock(item: &inventory_item::Model) -> bool {
    item.quantity > 0 && item.quantity <= item.reorder_level
}

/// Not yet expired, but expiring within `window_days` of `today`.
pub fn expires_within(item: &inventory_item::Model, today: NaiveDate, window_days: i64) -> bool {
    item.expiry_date
        .is_some_and(|d| d >= today && (d - today).num_days() <= window_days)
}

pub fn apply_stock_delta(quantity: i32, delta: i32) -> Result<i32, ServiceError> {
    match quantity.checked_add(delta) {
        Some(q) if q >= 0 => Ok(q),
        _ => Err(ServiceError::Validation(format!("stock adjustment {delta} would leave {quantity} negative"))),
    }
}

pub fn line_total(unit_price_cents: i64, quantity: i32) -> Result<i64, ServiceError> {
    unit_price_cents
        .checked_mul(quantity as i64)
        .ok_or_else(|| ServiceError::Validation("sale total overflows".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(quantity: i32, reorder_level: i32, expiry: Option<NaiveDate>) -> inventory_item::Model {
        let now = Utc::now().into();
        inventory_item::Model {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            kind: "medicine".into(),
            sku: "AMOX-250".into(),
            name: "Amoxicillin 250mg".into(),
            unit_price_cents: 450,
            quantity,
            reorder_level,
            expiry_date: expiry,
            batch_no: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn low_stock_excludes_empty_shelves() {
        assert!(is_low_stock(&item(3, 5, None)));
        assert!(is_low_stock(&item(5, 5, None)));
        assert!(!is_low_stock(&item(6, 5, None)));
        assert!(!is_low_stock(&item(0, 5, None)));
    }

    #[test]
    fn expiry_window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let in_30 = today + chrono::Duration::days(30);
        assert!(expires_within(&item(1, 0, Some(in_30)), today, 30));
        assert!(!expires_within(&item(1, 0, Some(in_30)), today, 29));
        assert!(expires_within(&item(1, 0, Some(today)), today, 0));
        assert!(!expires_within(&item(1, 0, Some(today - chrono::Duration::days(1))), today, 30));
        assert!(!expires_within(&item(1, 0, None), today, 30));
    }

    #[test]
    fn stock_never_goes_negative() {
        assert_eq!(apply_stock_delta(10, -4).unwrap(), 6);
        assert_eq!(apply_stock_delta(10, -10).unwrap(), 0);
        assert!(apply_stock_delta(3, -4).is_err());
        assert!(apply_stock_delta(i32::MAX, 1).is_err());
    }

    #[test]
    fn totals_multiply() {
        assert_eq!(line_total(450, 3).unwrap(), 1_350);
        assert!(line_total(i64::MAX, 2).is_err());
    }
}
