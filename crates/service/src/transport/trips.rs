use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::trip;

use super::buses::get_bus;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrip {
    pub bus_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departs_at: DateTime<Utc>,
    pub arrives_at: DateTime<Utc>,
    pub fare_cents: i64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TripFilter {
    #[serde(default)]
    pub upcoming: bool,
    pub bus_id: Option<Uuid>,
}

/// Schedule a trip. A bus cannot run two trips whose time windows overlap.
#[instrument(skip(db, input), fields(bus_id = %input.bus_id, departs_at = %input.departs_at))]
pub async fn create_trip(db: &DatabaseConnection, vendor_id: Uuid, input: NewTrip, now: DateTime<Utc>) -> Result<trip::Model, ServiceError> {
    let b = get_bus(db, vendor_id, input.bus_id).await?;
    trip::validate_route(&input.origin, &input.destination)?;
    trip::validate_schedule(input.departs_at.into(), input.arrives_at.into())?;
    if input.departs_at <= now {
        return Err(ServiceError::Validation("departure must be in the future".into()));
    }
    if input.fare_cents < 0 {
        return Err(ServiceError::Validation("fare must not be negative".into()));
    }

    let busy = trip::Entity::find()
        .filter(trip::Column::BusId.eq(b.id))
        .filter(trip::Column::DepartsAt.lt(input.arrives_at))
        .filter(trip::Column::ArrivesAt.gt(input.departs_at))
        .count(db)
        .await?;
    if busy > 0 {
        return Err(ServiceError::Conflict(format!("bus {} is already on a trip at that time", b.registration)));
    }

    let created = trip::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor_id),
        bus_id: Set(b.id),
        origin: Set(input.origin.trim().to_string()),
        destination: Set(input.destination.trim().to_string()),
        departs_at: Set(input.departs_at.into()),
        arrives_at: Set(input.arrives_at.into()),
        fare_cents: Set(input.fare_cents),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    info!(trip_id = %created.id, route = %format!("{} -> {}", created.origin, created.destination), "trip_created");
    Ok(created)
}

pub async fn get_trip(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<trip::Model, ServiceError> {
    trip::Entity::find_by_id(id)
        .filter(trip::Column::VendorId.eq(vendor_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("trip"))
}

/// Trips by departure time.
pub async fn list_trips(db: &DatabaseConnection, vendor_id: Uuid, filter: TripFilter, now: DateTime<Utc>) -> Result<Vec<trip::Model>, ServiceError> {
    let mut query = trip::Entity::find().filter(trip::Column::VendorId.eq(vendor_id));
    if filter.upcoming {
        query = query.filter(trip::Column::DepartsAt.gt(now));
    }
    if let Some(bus_id) = filter.bus_id {
        query = query.filter(trip::Column::BusId.eq(bus_id));
    }
    Ok(query.order_by_asc(trip::Column::DepartsAt).all(db).await?)
}
