use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use common::types::Health;
use models::{inventory_item, room, trip, vendor, ServiceType};
use service::billing::plans::{self, Plan};
use service::hotel::rooms;
use service::inventory::items::{self, ItemFilter};
use service::transport::{tickets, trips, SeatMap};
use service::vendor_service::{self, OnboardInput, Onboarded};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

#[utoipa::path(get, path = "/plans", tag = "billing", responses((status = 200, description = "Plan catalog")))]
pub async fn list_plans() -> Json<&'static [Plan]> {
    Json(plans::catalog())
}

/// Business sign-up: vendor, owner account and a basic subscription.
#[utoipa::path(post, path = "/vendors/onboard", tag = "vendors", request_body = crate::openapi::OnboardRequest, responses((status = 201, description = "Onboarded"), (status = 400, description = "Bad Request"), (status = 409, description = "Email taken")))]
pub async fn onboard(
    State(state): State<ServerState>,
    Json(input): Json<OnboardInput>,
) -> Result<(StatusCode, Json<Onboarded>), JsonApiError> {
    let out = vendor_service::onboard(&state.db, input, state.billing.currency()).await?;
    state.dashboard.invalidate(out.vendor.id).await;
    Ok((StatusCode::CREATED, Json(out)))
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub service_type: Option<ServiceType>,
}

#[utoipa::path(get, path = "/catalog/vendors", tag = "catalog", responses((status = 200, description = "Active vendors")))]
pub async fn catalog_vendors(
    State(state): State<ServerState>,
    Query(q): Query<CatalogQuery>,
) -> Result<Json<Vec<vendor::Model>>, JsonApiError> {
    Ok(Json(vendor_service::public_catalog(&state.db, q.service_type).await?))
}

#[utoipa::path(get, path = "/catalog/vendors/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Vendor ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn catalog_vendor(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<vendor::Model>, JsonApiError> {
    Ok(Json(vendor_service::catalog_vendor(&state.db, id).await?))
}

async fn catalog_of(state: &ServerState, id: Uuid, expected: &[ServiceType]) -> Result<vendor::Model, JsonApiError> {
    let v = vendor_service::catalog_vendor(&state.db, id).await?;
    let st = v.service_type().map_err(service::errors::ServiceError::from)?;
    if !expected.contains(&st) {
        return Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("{st} vendors do not offer this listing"))));
    }
    Ok(v)
}

#[derive(Debug, Deserialize)]
pub struct StayQuery {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

impl StayQuery {
    pub fn range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, JsonApiError> {
        match (self.check_in, self.check_out) {
            (Some(a), Some(b)) => Ok(Some((a, b))),
            (None, None) => Ok(None),
            _ => Err(JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some("check_in and check_out go together".into()))),
        }
    }
}

/// Rooms open for booking, optionally free over `[check_in, check_out)`.
#[utoipa::path(get, path = "/catalog/vendors/{id}/rooms", tag = "catalog", params(("id" = Uuid, Path, description = "Vendor ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn catalog_rooms(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(q): Query<StayQuery>,
) -> Result<Json<Vec<room::Model>>, JsonApiError> {
    let range = q.range()?;
    let v = catalog_of(&state, id, &[ServiceType::Hotel]).await?;
    Ok(Json(rooms::available_rooms(&state.db, v.id, range).await?))
}

#[utoipa::path(get, path = "/catalog/vendors/{id}/items", tag = "catalog", params(("id" = Uuid, Path, description = "Vendor ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn catalog_items(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<inventory_item::Model>>, JsonApiError> {
    let v = catalog_of(&state, id, &[ServiceType::Store, ServiceType::Pharmacy]).await?;
    let today = Utc::now().date_naive();
    let listed = items::list_items(&state.db, v.id, ItemFilter::default(), today)
        .await?
        .into_iter()
        .filter(|i| i.quantity > 0 && !i.is_expired(today))
        .collect();
    Ok(Json(listed))
}

#[utoipa::path(get, path = "/catalog/vendors/{id}/trips", tag = "catalog", params(("id" = Uuid, Path, description = "Vendor ID")), responses((status = 200, description = "Upcoming trips"), (status = 404, description = "Not Found")))]
pub async fn catalog_trips(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<trip::Model>>, JsonApiError> {
    let v = catalog_of(&state, id, &[ServiceType::Bus]).await?;
    let filter = trips::TripFilter { upcoming: true, bus_id: None };
    Ok(Json(trips::list_trips(&state.db, v.id, filter, Utc::now()).await?))
}

#[utoipa::path(get, path = "/catalog/trips/{id}/seats", tag = "catalog", params(("id" = Uuid, Path, description = "Trip ID")), responses((status = 200, description = "Seat map"), (status = 404, description = "Not Found")))]
pub async fn catalog_seat_map(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<SeatMap>, JsonApiError> {
    Ok(Json(tickets::trip_seat_map(&state.db, None, id).await?))
}
