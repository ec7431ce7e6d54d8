use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{booking, room, BookingStatus};
use service::auth::domain::Claims;
use service::hotel::bookings::{self, NewBooking};
use service::hotel::rooms::{self, NewRoom, RoomPatch};
use service::Actor;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;
use crate::routes::public::StayQuery;
use crate::routes::vendor::{current_vendor, HOTEL};

#[utoipa::path(get, path = "/vendor/rooms", tag = "hotel", responses((status = 200, description = "All rooms")))]
pub async fn list_rooms(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<Vec<room::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    Ok(Json(rooms::list_rooms(&state.db, v.id).await?))
}

#[utoipa::path(get, path = "/vendor/rooms/available", tag = "hotel", responses((status = 200, description = "Rooms free over the range")))]
pub async fn available_rooms(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<StayQuery>,
) -> Result<Json<Vec<room::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    Ok(Json(rooms::available_rooms(&state.db, v.id, q.range()?).await?))
}

#[utoipa::path(post, path = "/vendor/rooms", tag = "hotel", request_body = crate::openapi::NewRoomRequest, responses((status = 201, description = "Created"), (status = 402, description = "Plan limit reached"), (status = 409, description = "Duplicate number")))]
pub async fn create_room(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewRoom>,
) -> Result<(StatusCode, Json<room::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    let r = rooms::create_room(&state.db, &v, input).await?;
    state.dashboard.invalidate(v.id).await;
    Ok((StatusCode::CREATED, Json(r)))
}

#[utoipa::path(put, path = "/vendor/rooms/{id}", tag = "hotel", params(("id" = Uuid, Path, description = "Room ID")), request_body = crate::openapi::RoomPatchRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update_room(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RoomPatch>,
) -> Result<Json<room::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    let r = rooms::update_room(&state.db, &v, id, patch).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(Json(r))
}

#[utoipa::path(delete, path = "/vendor/rooms/{id}", tag = "hotel", params(("id" = Uuid, Path, description = "Room ID")), responses((status = 204, description = "Deleted"), (status = 409, description = "Room has bookings")))]
pub async fn delete_room(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    rooms::delete_room(&state.db, v.id, id).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
}

#[utoipa::path(get, path = "/vendor/bookings", tag = "hotel", responses((status = 200, description = "Bookings page")))]
pub async fn list_bookings(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<BookingQuery>,
    Query(p): Query<Pagination>,
) -> Result<Json<Page<booking::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    Ok(Json(bookings::list_bookings(&state.db, v.id, q.status, p).await?))
}

#[utoipa::path(post, path = "/vendor/bookings", tag = "hotel", request_body = crate::openapi::NewBookingRequest, responses((status = 201, description = "Booked"), (status = 409, description = "Room taken for those nights")))]
pub async fn create_booking(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewBooking>,
) -> Result<(StatusCode, Json<booking::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    let b = bookings::create_booking(&state.db, Actor::Vendor(v.id), input, Utc::now().date_naive()).await?;
    state.dashboard.invalidate(v.id).await;
    Ok((StatusCode::CREATED, Json(b)))
}

#[utoipa::path(get, path = "/vendor/bookings/{id}", tag = "hotel", params(("id" = Uuid, Path, description = "Booking ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_booking(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<booking::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    Ok(Json(bookings::get_booking(&state.db, Actor::Vendor(v.id), id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: BookingStatus,
}

#[utoipa::path(put, path = "/vendor/bookings/{id}/status", tag = "hotel", params(("id" = Uuid, Path, description = "Booking ID")), request_body = crate::openapi::BookingStatusRequest, responses((status = 200, description = "Updated"), (status = 409, description = "Transition not allowed")))]
pub async fn set_booking_status(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusChange>,
) -> Result<Json<booking::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, HOTEL).await?;
    let b = bookings::set_booking_status(&state.db, Actor::Vendor(v.id), id, body.status).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(Json(b))
}
