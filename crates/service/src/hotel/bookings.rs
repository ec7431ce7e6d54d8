use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use common::metrics::BOOKINGS_CREATED_TOTAL;
use common::pagination::Pagination;
use common::types::Page;
use models::{booking, room, vendor, BookingStatus, RoomStatus};

use super::{check_transition, live_overlap, nights, quote};
use crate::errors::ServiceError;
use crate::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub room_id: Uuid,
    pub guest_name: String,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Book a room. The room row is locked for the duration of the overlap check
/// so concurrent requests for the same nights cannot both succeed.
#[instrument(skip(db, input), fields(room_id = %input.room_id, check_in = %input.check_in, check_out = %input.check_out))]
pub async fn create_booking(db: &DatabaseConnection, by: Actor, input: NewBooking, today: NaiveDate) -> Result<booking::Model, ServiceError> {
    models::user::validate_name(&input.guest_name)?;
    let n = nights(input.check_in, input.check_out)?;
    if input.check_in < today {
        return Err(ServiceError::Validation("check_in is in the past".into()));
    }

    let txn = db.begin().await?;
    let r = room::Entity::find_by_id(input.room_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("room"))?;
    let customer_id = match by {
        Actor::Vendor(vid) if r.vendor_id != vid => return Err(ServiceError::not_found("room")),
        Actor::Vendor(_) => input.customer_id,
        Actor::Customer(cid) => {
            let owner = vendor::Entity::find_by_id(r.vendor_id).one(&txn).await?;
            if !owner.is_some_and(|v| v.is_active()) {
                return Err(ServiceError::not_found("room"));
            }
            Some(cid)
        }
    };
    if r.status()? != RoomStatus::Available {
        return Err(ServiceError::Conflict(format!("room {} is not available", r.number)));
    }

    let clashes = booking::Entity::find()
        .filter(booking::Column::RoomId.eq(r.id))
        .filter(live_overlap(input.check_in, input.check_out))
        .count(&txn)
        .await?;
    if clashes > 0 {
        return Err(ServiceError::Conflict(format!("room {} is already booked for those dates", r.number)));
    }

    let now = Utc::now().into();
    let am = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(r.vendor_id),
        room_id: Set(r.id),
        customer_id: Set(customer_id),
        guest_name: Set(input.guest_name.trim().to_string()),
        check_in: Set(input.check_in),
        check_out: Set(input.check_out),
        nights: Set(n as i32),
        total_cents: Set(quote(r.price_per_night_cents, n)?),
        status: Set(BookingStatus::Confirmed.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(&txn).await?;
    txn.commit().await?;

    BOOKINGS_CREATED_TOTAL.inc();
    info!(booking_id = %created.id, vendor_id = %created.vendor_id, total_cents = created.total_cents, "booking_created");
    Ok(created)
}

async fn find_for(db: &DatabaseConnection, by: Actor, id: Uuid) -> Result<booking::Model, ServiceError> {
    let col = match by {
        Actor::Vendor(vid) => booking::Column::VendorId.eq(vid),
        Actor::Customer(cid) => booking::Column::CustomerId.eq(cid),
    };
    booking::Entity::find_by_id(id)
        .filter(col)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("booking"))
}

/// Move a booking along its lifecycle. Customers may only cancel.
#[instrument(skip(db))]
pub async fn set_booking_status(db: &DatabaseConnection, by: Actor, id: Uuid, to: BookingStatus) -> Result<booking::Model, ServiceError> {
    if matches!(by, Actor::Customer(_)) && to != BookingStatus::Cancelled {
        return Err(ServiceError::Forbidden("customers can only cancel bookings".into()));
    }
    let b = find_for(db, by, id).await?;
    check_transition(b.status()?, to)?;
    let mut am: booking::ActiveModel = b.into();
    am.status = Set(to.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(booking_id = %updated.id, status = %to, "booking_status_changed");
    Ok(updated)
}

pub async fn get_booking(db: &DatabaseConnection, by: Actor, id: Uuid) -> Result<booking::Model, ServiceError> {
    find_for(db, by, id).await
}

/// Vendor bookings, latest check-in first, optionally by status.
pub async fn list_bookings(
    db: &DatabaseConnection,
    vendor_id: Uuid,
    status: Option<BookingStatus>,
    opts: Pagination,
) -> Result<Page<booking::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut query = booking::Entity::find().filter(booking::Column::VendorId.eq(vendor_id));
    if let Some(s) = status {
        query = query.filter(booking::Column::Status.eq(s.as_str()));
    }
    let paginator = query.order_by_desc(booking::Column::CheckIn).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page { items, page: page_idx as u32 + 1, per_page: per_page as u32, total })
}

pub async fn list_customer_bookings(db: &DatabaseConnection, customer_id: Uuid) -> Result<Vec<booking::Model>, ServiceError> {
    Ok(booking::Entity::find()
        .filter(booking::Column::CustomerId.eq(customer_id))
        .order_by_desc(booking::Column::CheckIn)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotel::rooms::{create_room, NewRoom};
    use crate::test_support::{get_db, vendor_of};
    use chrono::Duration;
    use models::ServiceType;

    fn stay(room_id: Uuid, from: NaiveDate, nights: i64) -> NewBooking {
        NewBooking { room_id, guest_name: "Wanjiru".into(), customer_id: None, check_in: from, check_out: from + Duration::days(nights) }
    }

    #[tokio::test]
    async fn overlapping_stays_conflict_and_back_to_back_do_not() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let v = vendor_of(&db, ServiceType::Hotel).await;
        let r = create_room(&db, &v, NewRoom { number: "12".into(), room_type: "twin".into(), price_per_night_cents: 5_000, capacity: 2 }).await?;
        let today = Utc::now().date_naive();
        let by = Actor::Vendor(v.id);

        let first = create_booking(&db, by, stay(r.id, today + Duration::days(1), 3), today).await?;
        assert_eq!(first.nights, 3);
        assert_eq!(first.total_cents, 15_000);

        let clash = create_booking(&db, by, stay(r.id, today + Duration::days(2), 1), today).await;
        assert!(matches!(clash, Err(ServiceError::Conflict(_))));

        create_booking(&db, by, stay(r.id, today + Duration::days(4), 2), today).await?;

        set_booking_status(&db, by, first.id, BookingStatus::Cancelled).await?;
        create_booking(&db, by, stay(r.id, today + Duration::days(2), 1), today).await?;
        Ok(())
    }

    #[tokio::test]
    async fn customers_book_active_vendors_and_only_cancel() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let v = vendor_of(&db, ServiceType::Hotel).await;
        let r = create_room(&db, &v, NewRoom { number: "3".into(), room_type: "suite".into(), price_per_night_cents: 20_000, capacity: 4 }).await?;
        let today = Utc::now().date_naive();
        let customer = Uuid::new_v4();

        let past = create_booking(&db, Actor::Customer(customer), stay(r.id, today - Duration::days(1), 2), today).await;
        assert!(matches!(past, Err(ServiceError::Validation(_))));

        let b = create_booking(&db, Actor::Customer(customer), stay(r.id, today, 2), today).await?;
        assert_eq!(b.customer_id, Some(customer));
        assert_eq!(list_customer_bookings(&db, customer).await?.len(), 1);

        let complete = set_booking_status(&db, Actor::Customer(customer), b.id, BookingStatus::Completed).await;
        assert!(matches!(complete, Err(ServiceError::Forbidden(_))));
        let other = set_booking_status(&db, Actor::Customer(Uuid::new_v4()), b.id, BookingStatus::Cancelled).await;
        assert!(matches!(other, Err(ServiceError::NotFound(_))));
        set_booking_status(&db, Actor::Customer(customer), b.id, BookingStatus::Cancelled).await?;
        let again = set_booking_status(&db, Actor::Vendor(v.id), b.id, BookingStatus::Completed).await;
        assert!(matches!(again, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn rooms_in_maintenance_refuse_bookings() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let v = vendor_of(&db, ServiceType::Hotel).await;
        let r = create_room(&db, &v, NewRoom { number: "9".into(), room_type: "single".into(), price_per_night_cents: 3_000, capacity: 1 }).await?;
        let patch = crate::hotel::rooms::RoomPatch { status: Some(RoomStatus::Maintenance), ..Default::default() };
        crate::hotel::rooms::update_room(&db, &v, r.id, patch).await?;
        let today = Utc::now().date_naive();
        let res = create_booking(&db, Actor::Vendor(v.id), stay(r.id, today, 1), today).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));
        Ok(())
    }
}
