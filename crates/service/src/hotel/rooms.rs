use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{booking, room, vendor, RoomStatus};

use crate::billing::limits::ensure_capacity;
use crate::billing::Resource;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
    pub number: String,
    pub room_type: String,
    pub price_per_night_cents: i64,
    pub capacity: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomPatch {
    pub room_type: Option<String>,
    pub price_per_night_cents: Option<i64>,
    pub capacity: Option<i32>,
    pub status: Option<RoomStatus>,
}

fn validate_room_type(room_type: &str) -> Result<(), ServiceError> {
    let t = room_type.trim();
    if t.is_empty() || t.chars().count() > 64 {
        return Err(ServiceError::Validation("room_type must be 1..=64 characters".into()));
    }
    Ok(())
}

/// Add a room; counts against the plan's listing and seat limits.
#[instrument(skip(db, vendor, input), fields(vendor_id = %vendor.id, number = %input.number))]
pub async fn create_room(db: &DatabaseConnection, vendor: &vendor::Model, input: NewRoom) -> Result<room::Model, ServiceError> {
    room::validate_number(&input.number)?;
    validate_room_type(&input.room_type)?;
    room::validate_price(input.price_per_night_cents)?;
    room::validate_capacity(input.capacity)?;

    let txn = db.begin().await?;
    ensure_capacity(&txn, vendor, Resource::Listings, 1).await?;
    ensure_capacity(&txn, vendor, Resource::Seats, input.capacity as u64).await?;

    let now = Utc::now().into();
    let am = room::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        number: Set(input.number.trim().to_string()),
        room_type: Set(input.room_type.trim().to_string()),
        price_per_night_cents: Set(input.price_per_night_cents),
        capacity: Set(input.capacity),
        status: Set(RoomStatus::Available.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(&txn).await.map_err(|e| ServiceError::from_db(e, "room number"))?;
    txn.commit().await?;
    info!(room_id = %created.id, "room_created");
    Ok(created)
}

/// Room owned by `vendor_id`; other vendors' rooms read as missing.
pub async fn get_room(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<room::Model, ServiceError> {
    room::Entity::find_by_id(id)
        .filter(room::Column::VendorId.eq(vendor_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("room"))
}

pub async fn list_rooms(db: &DatabaseConnection, vendor_id: Uuid) -> Result<Vec<room::Model>, ServiceError> {
    Ok(room::Entity::find()
        .filter(room::Column::VendorId.eq(vendor_id))
        .order_by_asc(room::Column::Number)
        .all(db)
        .await?)
}

/// Bookable rooms, optionally free for the whole `[check_in, check_out)` range.
pub async fn available_rooms(
    db: &DatabaseConnection,
    vendor_id: Uuid,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<room::Model>, ServiceError> {
    let rooms: Vec<room::Model> = list_rooms(db, vendor_id)
        .await?
        .into_iter()
        .filter(|r| r.status == RoomStatus::Available.as_str())
        .collect();
    let Some((check_in, check_out)) = range else { return Ok(rooms) };
    super::nights(check_in, check_out)?;

    let busy: Vec<Uuid> = booking::Entity::find()
        .filter(booking::Column::VendorId.eq(vendor_id))
        .filter(super::live_overlap(check_in, check_out))
        .all(db)
        .await?
        .into_iter()
        .map(|b| b.room_id)
        .collect();
    Ok(rooms.into_iter().filter(|r| !busy.contains(&r.id)).collect())
}

#[instrument(skip(db, vendor, patch), fields(vendor_id = %vendor.id))]
pub async fn update_room(db: &DatabaseConnection, vendor: &vendor::Model, id: Uuid, patch: RoomPatch) -> Result<room::Model, ServiceError> {
    let txn = db.begin().await?;
    let existing = room::Entity::find_by_id(id)
        .filter(room::Column::VendorId.eq(vendor.id))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("room"))?;
    let old_capacity = existing.capacity;
    let mut am: room::ActiveModel = existing.into();
    if let Some(t) = patch.room_type {
        validate_room_type(&t)?;
        am.room_type = Set(t.trim().to_string());
    }
    if let Some(p) = patch.price_per_night_cents {
        room::validate_price(p)?;
        am.price_per_night_cents = Set(p);
    }
    if let Some(c) = patch.capacity {
        room::validate_capacity(c)?;
        if c > old_capacity {
            ensure_capacity(&txn, vendor, Resource::Seats, (c - old_capacity) as u64).await?;
        }
        am.capacity = Set(c);
    }
    if let Some(s) = patch.status {
        am.status = Set(s.as_str().to_string());
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(room_id = %updated.id, "room_updated");
    Ok(updated)
}

/// Delete a room that was never booked. Rooms with history, cancelled stays
/// included, should be put into maintenance instead.
#[instrument(skip(db))]
pub async fn delete_room(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let r = get_room(db, vendor_id, id).await?;
    let held = booking::Entity::find().filter(booking::Column::RoomId.eq(r.id)).count(db).await?;
    if held > 0 {
        return Err(ServiceError::Conflict("room has bookings; set it to maintenance instead".into()));
    }
    room::Entity::delete_by_id(r.id).exec(db).await?;
    info!(room_id = %r.id, "room_deleted");
    Ok(())
}
