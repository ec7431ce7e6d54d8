use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use common::metrics::TICKETS_ISSUED_TOTAL;
use models::{bus, ticket, trip, vendor, TicketStatus};

use super::{seat_map, SeatMap};
use crate::errors::ServiceError;
use crate::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub trip_id: Uuid,
    pub passenger_name: String,
    pub seat_no: i32,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
}

fn departed_guard(t: &trip::Model, now: DateTime<Utc>) -> Result<(), ServiceError> {
    if t.departs_at.with_timezone(&Utc) <= now {
        return Err(ServiceError::Conflict("trip has already departed".into()));
    }
    Ok(())
}

/// Sell one seat. The trip row is locked while the seat is checked so two
/// passengers never hold the same seat.
#[instrument(skip(db, input), fields(trip_id = %input.trip_id, seat_no = input.seat_no))]
pub async fn issue_ticket(db: &DatabaseConnection, by: Actor, input: NewTicket, now: DateTime<Utc>) -> Result<ticket::Model, ServiceError> {
    models::user::validate_name(&input.passenger_name)?;

    let txn = db.begin().await?;
    let t = trip::Entity::find_by_id(input.trip_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("trip"))?;
    let customer_id = match by {
        Actor::Vendor(vid) if t.vendor_id != vid => return Err(ServiceError::not_found("trip")),
        Actor::Vendor(_) => input.customer_id,
        Actor::Customer(cid) => {
            let owner = vendor::Entity::find_by_id(t.vendor_id).one(&txn).await?;
            if !owner.is_some_and(|v| v.is_active()) {
                return Err(ServiceError::not_found("trip"));
            }
            Some(cid)
        }
    };
    departed_guard(&t, now)?;

    let capacity = bus::Entity::find_by_id(t.bus_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("bus"))?
        .capacity;
    if !(1..=capacity).contains(&input.seat_no) {
        return Err(ServiceError::Validation(format!("seat_no must be within 1..={capacity}")));
    }
    let held = ticket::Entity::find()
        .filter(ticket::Column::TripId.eq(t.id))
        .filter(ticket::Column::SeatNo.eq(input.seat_no))
        .filter(ticket::Column::Status.eq(TicketStatus::Issued.as_str()))
        .count(&txn)
        .await?;
    if held > 0 {
        return Err(ServiceError::Conflict(format!("seat {} is taken", input.seat_no)));
    }

    let now_tz = Utc::now().into();
    let created = ticket::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(t.vendor_id),
        trip_id: Set(t.id),
        customer_id: Set(customer_id),
        passenger_name: Set(input.passenger_name.trim().to_string()),
        seat_no: Set(input.seat_no),
        fare_cents: Set(t.fare_cents),
        status: Set(TicketStatus::Issued.as_str().to_string()),
        created_at: Set(now_tz),
        updated_at: Set(now_tz),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    TICKETS_ISSUED_TOTAL.inc();
    info!(ticket_id = %created.id, vendor_id = %created.vendor_id, seat_no = created.seat_no, "ticket_issued");
    Ok(created)
}

fn scoped(by: Actor) -> sea_orm::sea_query::SimpleExpr {
    match by {
        Actor::Vendor(vid) => ticket::Column::VendorId.eq(vid),
        Actor::Customer(cid) => ticket::Column::CustomerId.eq(cid),
    }
}

/// Cancel an issued ticket before departure, freeing the seat.
#[instrument(skip(db))]
pub async fn cancel_ticket(db: &DatabaseConnection, by: Actor, id: Uuid, now: DateTime<Utc>) -> Result<ticket::Model, ServiceError> {
    let tk = ticket::Entity::find_by_id(id)
        .filter(scoped(by))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("ticket"))?;
    if tk.status()? != TicketStatus::Issued {
        return Err(ServiceError::Conflict("ticket is already cancelled".into()));
    }
    let t = trip::Entity::find_by_id(tk.trip_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("trip"))?;
    departed_guard(&t, now)?;

    let mut am: ticket::ActiveModel = tk.into();
    am.status = Set(TicketStatus::Cancelled.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(ticket_id = %updated.id, "ticket_cancelled");
    Ok(updated)
}

pub async fn list_tickets(db: &DatabaseConnection, vendor_id: Uuid, trip_id: Option<Uuid>) -> Result<Vec<ticket::Model>, ServiceError> {
    let mut query = ticket::Entity::find().filter(ticket::Column::VendorId.eq(vendor_id));
    if let Some(tid) = trip_id {
        query = query.filter(ticket::Column::TripId.eq(tid));
    }
    Ok(query
        .order_by_asc(ticket::Column::TripId)
        .order_by_asc(ticket::Column::SeatNo)
        .all(db)
        .await?)
}

pub async fn list_customer_tickets(db: &DatabaseConnection, customer_id: Uuid) -> Result<Vec<ticket::Model>, ServiceError> {
    Ok(ticket::Entity::find()
        .filter(ticket::Column::CustomerId.eq(customer_id))
        .order_by_desc(ticket::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Seat map of a trip. `vendor_id = None` is the public view and only
/// covers active vendors.
pub async fn trip_seat_map(db: &DatabaseConnection, vendor_id: Option<Uuid>, trip_id: Uuid) -> Result<SeatMap, ServiceError> {
    let t = trip::Entity::find_by_id(trip_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("trip"))?;
    match vendor_id {
        Some(vid) if vid != t.vendor_id => return Err(ServiceError::not_found("trip")),
        Some(_) => {}
        None => {
            let owner = vendor::Entity::find_by_id(t.vendor_id).one(db).await?;
            if !owner.is_some_and(|v| v.is_active()) {
                return Err(ServiceError::not_found("trip"));
            }
        }
    }
    let capacity = bus::Entity::find_by_id(t.bus_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("bus"))?
        .capacity;
    let tickets = ticket::Entity::find().filter(ticket::Column::TripId.eq(t.id)).all(db).await?;
    Ok(seat_map(capacity, &tickets))
}
