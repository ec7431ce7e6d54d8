use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{payment, staff, vendor, ServiceType};
use service::auth::domain::Claims;
use service::billing::service::{ChangePlanInput, PlanChange, SubscriptionView};
use service::dashboard::DashboardView;
use service::staff_service::{self, NewStaff};
use service::vendor_service;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

/// Service types allowed to use a route group.
pub const HOTEL: &[ServiceType] = &[ServiceType::Hotel];
pub const INVENTORY: &[ServiceType] = &[ServiceType::Store, ServiceType::Pharmacy];
pub const TRANSPORT: &[ServiceType] = &[ServiceType::Bus];
pub const ANY: &[ServiceType] = ServiceType::ALL;

/// The caller's vendor, active and of one of the `allowed` service types.
pub async fn current_vendor(state: &ServerState, claims: &Claims, allowed: &[ServiceType]) -> Result<vendor::Model, JsonApiError> {
    let vid = claims.vid.ok_or_else(|| JsonApiError::forbidden("token carries no vendor"))?;
    let v = vendor_service::require_vendor(&state.db, vid).await?;
    if !v.is_active() {
        return Err(JsonApiError::forbidden("vendor account is suspended"));
    }
    let st = v.service_type().map_err(service::errors::ServiceError::from)?;
    if !allowed.contains(&st) {
        return Err(JsonApiError::forbidden(format!("not available to {st} vendors")));
    }
    Ok(v)
}

#[utoipa::path(get, path = "/vendor/subscription", tag = "billing", responses((status = 200, description = "Subscription, plan and usage")))]
pub async fn get_subscription(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SubscriptionView>, JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    Ok(Json(state.billing.current(v.id).await?))
}

#[utoipa::path(post, path = "/vendor/subscription/upgrade", tag = "billing", request_body = crate::openapi::ChangePlanRequest, responses((status = 200, description = "Plan changed or payment pending"), (status = 402, description = "Payment failed"), (status = 409, description = "Conflict")))]
pub async fn change_plan(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<ChangePlanInput>,
) -> Result<Json<PlanChange>, JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    let out = state.billing.change_plan(v.id, input, Utc::now()).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(Json(out))
}

#[utoipa::path(post, path = "/vendor/subscription/cancel", tag = "billing", responses((status = 200, description = "Cancels at period end"), (status = 409, description = "Already on basic")))]
pub async fn cancel_subscription(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<models::subscription::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    let sub = state.billing.cancel(v.id, Utc::now()).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(Json(sub))
}

#[utoipa::path(get, path = "/vendor/payments", tag = "billing", responses((status = 200, description = "Payment history")))]
pub async fn list_payments(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(p): Query<Pagination>,
) -> Result<Json<Page<payment::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    Ok(Json(state.billing.list_payments(v.id, p).await?))
}

#[utoipa::path(get, path = "/vendor/staff", tag = "vendor", responses((status = 200, description = "Staff list")))]
pub async fn list_staff(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<staff::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    Ok(Json(staff_service::list_staff(&state.db, v.id).await?))
}

#[utoipa::path(post, path = "/vendor/staff", tag = "vendor", request_body = crate::openapi::NewStaffRequest, responses((status = 201, description = "Added"), (status = 402, description = "Plan limit reached")))]
pub async fn add_staff(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewStaff>,
) -> Result<(StatusCode, Json<staff::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    let s = staff_service::add_staff(&state.db, &v, input).await?;
    info!(vendor_id = %v.id, staff_id = %s.id, "staff_added");
    Ok((StatusCode::CREATED, Json(s)))
}

#[utoipa::path(delete, path = "/vendor/staff/{id}", tag = "vendor", params(("id" = Uuid, Path, description = "Staff ID")), responses((status = 204, description = "Removed"), (status = 404, description = "Not Found")))]
pub async fn remove_staff(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    staff_service::remove_staff(&state.db, v.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/vendor/dashboard", tag = "dashboard", responses((status = 200, description = "Summary for the vendor's service type")))]
pub async fn dashboard(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DashboardView>, JsonApiError> {
    let v = current_vendor(&state, &claims, ANY).await?;
    let view = state.dashboard.vendor_dashboard(&v, Utc::now()).await?;
    Ok(Json(DashboardView::clone(&view)))
}
