use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use models::{booking, ticket, BookingStatus};
use service::auth::domain::Claims;
use service::hotel::bookings::{self, NewBooking};
use service::transport::tickets::{self, NewTicket};
use service::Actor;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(post, path = "/customer/bookings", tag = "customer", request_body = crate::openapi::NewBookingRequest, responses((status = 201, description = "Booked"), (status = 404, description = "Room not offered"), (status = 409, description = "Room taken for those nights")))]
pub async fn create_booking(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewBooking>,
) -> Result<(StatusCode, Json<booking::Model>), JsonApiError> {
    let b = bookings::create_booking(&state.db, Actor::Customer(claims.uid), input, Utc::now().date_naive()).await?;
    state.dashboard.invalidate(b.vendor_id).await;
    Ok((StatusCode::CREATED, Json(b)))
}

#[utoipa::path(get, path = "/customer/bookings", tag = "customer", responses((status = 200, description = "Own bookings")))]
pub async fn list_bookings(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<Vec<booking::Model>>, JsonApiError> {
    Ok(Json(bookings::list_customer_bookings(&state.db, claims.uid).await?))
}

#[utoipa::path(post, path = "/customer/bookings/{id}/cancel", tag = "customer", params(("id" = Uuid, Path, description = "Booking ID")), responses((status = 200, description = "Cancelled"), (status = 404, description = "Not Found"), (status = 409, description = "Not cancellable")))]
pub async fn cancel_booking(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<booking::Model>, JsonApiError> {
    let b = bookings::set_booking_status(&state.db, Actor::Customer(claims.uid), id, BookingStatus::Cancelled).await?;
    state.dashboard.invalidate(b.vendor_id).await;
    Ok(Json(b))
}

#[utoipa::path(post, path = "/customer/tickets", tag = "customer", request_body = crate::openapi::NewTicketRequest, responses((status = 201, description = "Issued"), (status = 409, description = "Seat taken or trip departed")))]
pub async fn buy_ticket(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewTicket>,
) -> Result<(StatusCode, Json<ticket::Model>), JsonApiError> {
    let t = tickets::issue_ticket(&state.db, Actor::Customer(claims.uid), input, Utc::now()).await?;
    state.dashboard.invalidate(t.vendor_id).await;
    Ok((StatusCode::CREATED, Json(t)))
}

#[utoipa::path(get, path = "/customer/tickets", tag = "customer", responses((status = 200, description = "Own tickets")))]
pub async fn list_tickets(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<Vec<ticket::Model>>, JsonApiError> {
    Ok(Json(tickets::list_customer_tickets(&state.db, claims.uid).await?))
}

#[utoipa::path(post, path = "/customer/tickets/{id}/cancel", tag = "customer", params(("id" = Uuid, Path, description = "Ticket ID")), responses((status = 200, description = "Cancelled"), (status = 404, description = "Not Found")))]
pub async fn cancel_ticket(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ticket::Model>, JsonApiError> {
    let t = tickets::cancel_ticket(&state.db, Actor::Customer(claims.uid), id, Utc::now()).await?;
    state.dashboard.invalidate(t.vendor_id).await;
    Ok(Json(t))
}
