use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{bus, trip, vendor};

use crate::billing::limits::ensure_capacity;
use crate::billing::Resource;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBus {
    pub registration: String,
    pub name: String,
    pub capacity: i32,
}

/// Register a bus; counts against listing and seat limits.
#[instrument(skip(db, vendor, input), fields(vendor_id = %vendor.id, registration = %input.registration))]
pub async fn create_bus(db: &DatabaseConnection, vendor: &vendor::Model, input: NewBus) -> Result<bus::Model, ServiceError> {
    let registration = bus::normalize_registration(&input.registration)?;
    models::user::validate_name(&input.name)?;
    bus::validate_capacity(input.capacity)?;

    let txn = db.begin().await?;
    ensure_capacity(&txn, vendor, Resource::Listings, 1).await?;
    ensure_capacity(&txn, vendor, Resource::Seats, input.capacity as u64).await?;

    let created = bus::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        registration: Set(registration),
        name: Set(input.name.trim().to_string()),
        capacity: Set(input.capacity),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(|e| ServiceError::from_db(e, "registration"))?;
    txn.commit().await?;
    info!(bus_id = %created.id, capacity = created.capacity, "bus_created");
    Ok(created)
}

pub async fn get_bus(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<bus::Model, ServiceError> {
    bus::Entity::find_by_id(id)
        .filter(bus::Column::VendorId.eq(vendor_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("bus"))
}

pub async fn list_buses(db: &DatabaseConnection, vendor_id: Uuid) -> Result<Vec<bus::Model>, ServiceError> {
    Ok(bus::Entity::find()
        .filter(bus::Column::VendorId.eq(vendor_id))
        .order_by_asc(bus::Column::Registration)
        .all(db)
        .await?)
}

/// Remove a bus that has no scheduled trips.
#[instrument(skip(db))]
pub async fn delete_bus(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let b = get_bus(db, vendor_id, id).await?;
    let trips = trip::Entity::find().filter(trip::Column::BusId.eq(b.id)).count(db).await?;
    if trips > 0 {
        return Err(ServiceError::Conflict("bus has trips and cannot be removed".into()));
    }
    bus::Entity::delete_by_id(b.id).exec(db).await?;
    info!(bus_id = %b.id, "bus_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, vendor_of};
    use models::ServiceType;

    #[tokio::test]
    async fn registrations_unique_and_seats_capped() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let v = vendor_of(&db, ServiceType::Bus).await;

        let b = create_bus(&db, &v, NewBus { registration: "kbx 101a".into(), name: "Coast Express".into(), capacity: 60 }).await?;
        assert_eq!(b.registration, "KBX101A");
        let dup = create_bus(&db, &v, NewBus { registration: "KBX101A".into(), name: "Again".into(), capacity: 10 }).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        let too_many = create_bus(&db, &v, NewBus { registration: "KBY2".into(), name: "Big".into(), capacity: 41 }).await;
        assert!(matches!(too_many, Err(ServiceError::LimitExceeded(_))));
        let oversize = create_bus(&db, &v, NewBus { registration: "KBY3".into(), name: "Huge".into(), capacity: 121 }).await;
        assert!(matches!(oversize, Err(ServiceError::Validation(_))));

        delete_bus(&db, v.id, b.id).await?;
        assert!(list_buses(&db, v.id).await?.is_empty());
        Ok(())
    }
}
