use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{payment, vendor, PaymentStatus, VendorStatus};
use service::billing::service::{PlanChange, RenewalReport};
use service::dashboard::PlatformSummary;
use service::vendor_service::{self, VendorFilter};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/admin/vendors", tag = "admin", responses((status = 200, description = "Vendors page, filterable by service_type and status")))]
pub async fn list_vendors(
    State(state): State<ServerState>,
    Query(filter): Query<VendorFilter>,
    Query(p): Query<Pagination>,
) -> Result<Json<Page<vendor::Model>>, JsonApiError> {
    Ok(Json(vendor_service::list_vendors(&state.db, filter, p).await?))
}

#[utoipa::path(get, path = "/admin/vendors/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Vendor ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_vendor(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<vendor::Model>, JsonApiError> {
    Ok(Json(vendor_service::require_vendor(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct VendorStatusChange {
    pub status: VendorStatus,
}

#[utoipa::path(put, path = "/admin/vendors/{id}/status", tag = "admin", params(("id" = Uuid, Path, description = "Vendor ID")), request_body = crate::openapi::VendorStatusRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn set_vendor_status(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(body): Json<VendorStatusChange>,
) -> Result<Json<vendor::Model>, JsonApiError> {
    let v = vendor_service::set_status(&state.db, id, body.status).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(Json(v))
}

#[utoipa::path(get, path = "/admin/payments", tag = "admin", responses((status = 200, description = "All subscription payments")))]
pub async fn list_payments(State(state): State<ServerState>, Query(p): Query<Pagination>) -> Result<Json<Page<payment::Model>>, JsonApiError> {
    Ok(Json(state.billing.list_all_payments(p).await?))
}

#[derive(Debug, Deserialize)]
pub struct Settlement {
    pub status: PaymentStatus,
}

/// Resolve a payment the gateway left pending.
#[utoipa::path(post, path = "/admin/payments/{id}/settle", tag = "admin", params(("id" = Uuid, Path, description = "Payment ID")), request_body = crate::openapi::SettlementRequest, responses((status = 200, description = "Settled"), (status = 409, description = "Payment not pending")))]
pub async fn settle_payment(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Settlement>,
) -> Result<Json<PlanChange>, JsonApiError> {
    let out = state.billing.settle_payment(id, body.status, Utc::now()).await?;
    state.dashboard.invalidate(out.subscription.vendor_id).await;
    Ok(Json(out))
}

#[utoipa::path(get, path = "/admin/dashboard", tag = "admin", responses((status = 200, description = "Platform summary")))]
pub async fn dashboard(State(state): State<ServerState>) -> Result<Json<PlatformSummary>, JsonApiError> {
    let summary = state.dashboard.platform_dashboard(Utc::now()).await?;
    Ok(Json(PlatformSummary::clone(&summary)))
}

/// Run the renewal pass over subscriptions whose period has ended.
#[utoipa::path(post, path = "/admin/billing/renew", tag = "admin", responses((status = 200, description = "Renewal report")))]
pub async fn renew_due(State(state): State<ServerState>) -> Result<Json<RenewalReport>, JsonApiError> {
    let report = state.billing.renew_due(Utc::now()).await?;
    info!(renewed = report.renewed, reverted = report.reverted, past_due = report.past_due, "renewal_run");
    if report != RenewalReport::default() {
        // Renewals touch many vendors at once.
        state.dashboard.invalidate_all();
    }
    Ok(Json(report))
}
