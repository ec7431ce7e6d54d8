use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use models::{bus, ticket, trip};
use service::auth::domain::Claims;
use service::transport::buses::{self, NewBus};
use service::transport::tickets::{self, NewTicket};
use service::transport::trips::{self, NewTrip, TripFilter};
use service::transport::SeatMap;
use service::Actor;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;
use crate::routes::vendor::{current_vendor, TRANSPORT};

#[utoipa::path(get, path = "/vendor/buses", tag = "transport", responses((status = 200, description = "Fleet")))]
pub async fn list_buses(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<Vec<bus::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    Ok(Json(buses::list_buses(&state.db, v.id).await?))
}

#[utoipa::path(post, path = "/vendor/buses", tag = "transport", request_body = crate::openapi::NewBusRequest, responses((status = 201, description = "Created"), (status = 402, description = "Plan limit reached"), (status = 409, description = "Duplicate registration")))]
pub async fn create_bus(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewBus>,
) -> Result<(StatusCode, Json<bus::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    let b = buses::create_bus(&state.db, &v, input).await?;
    state.dashboard.invalidate(v.id).await;
    Ok((StatusCode::CREATED, Json(b)))
}

#[utoipa::path(delete, path = "/vendor/buses/{id}", tag = "transport", params(("id" = Uuid, Path, description = "Bus ID")), responses((status = 204, description = "Deleted"), (status = 409, description = "Bus has trips")))]
pub async fn delete_bus(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    buses::delete_bus(&state.db, v.id, id).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/vendor/trips", tag = "transport", responses((status = 200, description = "Trips by departure")))]
pub async fn list_trips(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<TripFilter>,
) -> Result<Json<Vec<trip::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    Ok(Json(trips::list_trips(&state.db, v.id, filter, Utc::now()).await?))
}

#[utoipa::path(post, path = "/vendor/trips", tag = "transport", request_body = crate::openapi::NewTripRequest, responses((status = 201, description = "Scheduled"), (status = 409, description = "Bus already on the road")))]
pub async fn create_trip(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewTrip>,
) -> Result<(StatusCode, Json<trip::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    let t = trips::create_trip(&state.db, v.id, input, Utc::now()).await?;
    state.dashboard.invalidate(v.id).await;
    Ok((StatusCode::CREATED, Json(t)))
}

#[utoipa::path(get, path = "/vendor/trips/{id}", tag = "transport", params(("id" = Uuid, Path, description = "Trip ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_trip(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<trip::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    Ok(Json(trips::get_trip(&state.db, v.id, id).await?))
}

#[utoipa::path(get, path = "/vendor/trips/{id}/seats", tag = "transport", params(("id" = Uuid, Path, description = "Trip ID")), responses((status = 200, description = "Seat map")))]
pub async fn seat_map(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<SeatMap>, JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    Ok(Json(tickets::trip_seat_map(&state.db, Some(v.id), id).await?))
}

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub trip_id: Option<Uuid>,
}

#[utoipa::path(get, path = "/vendor/tickets", tag = "transport", responses((status = 200, description = "Tickets, optionally for one trip")))]
pub async fn list_tickets(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<TicketQuery>,
) -> Result<Json<Vec<ticket::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    Ok(Json(tickets::list_tickets(&state.db, v.id, q.trip_id).await?))
}

#[utoipa::path(post, path = "/vendor/tickets", tag = "transport", request_body = crate::openapi::NewTicketRequest, responses((status = 201, description = "Issued"), (status = 409, description = "Seat taken or trip departed")))]
pub async fn issue_ticket(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewTicket>,
) -> Result<(StatusCode, Json<ticket::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    let t = tickets::issue_ticket(&state.db, Actor::Vendor(v.id), input, Utc::now()).await?;
    state.dashboard.invalidate(v.id).await;
    Ok((StatusCode::CREATED, Json(t)))
}

#[utoipa::path(post, path = "/vendor/tickets/{id}/cancel", tag = "transport", params(("id" = Uuid, Path, description = "Ticket ID")), responses((status = 200, description = "Cancelled"), (status = 409, description = "Already cancelled or departed")))]
pub async fn cancel_ticket(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ticket::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, TRANSPORT).await?;
    let t = tickets::cancel_ticket(&state.db, Actor::Vendor(v.id), id, Utc::now()).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(Json(t))
}
