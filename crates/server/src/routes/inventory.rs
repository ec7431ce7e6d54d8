use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{inventory_item, sale};
use service::auth::domain::Claims;
use service::inventory::items::{self, ItemFilter, ItemPatch, NewItem};
use service::inventory::sales::{self, NewSale};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;
use crate::routes::vendor::{current_vendor, INVENTORY};

#[utoipa::path(get, path = "/vendor/items", tag = "inventory", responses((status = 200, description = "Items, optionally low-stock or expiring only")))]
pub async fn list_items(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<Vec<inventory_item::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, INVENTORY).await?;
    Ok(Json(items::list_items(&state.db, v.id, filter, Utc::now().date_naive()).await?))
}

#[utoipa::path(post, path = "/vendor/items", tag = "inventory", request_body = crate::openapi::NewItemRequest, responses((status = 201, description = "Created"), (status = 402, description = "Plan limit reached"), (status = 409, description = "Duplicate SKU")))]
pub async fn create_item(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewItem>,
) -> Result<(StatusCode, Json<inventory_item::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, INVENTORY).await?;
    let item = items::create_item(&state.db, &v, input).await?;
    state.dashboard.invalidate(v.id).await;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(get, path = "/vendor/items/{id}", tag = "inventory", params(("id" = Uuid, Path, description = "Item ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_item(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<inventory_item::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, INVENTORY).await?;
    Ok(Json(items::get_item(&state.db, v.id, id).await?))
}

#[utoipa::path(put, path = "/vendor/items/{id}", tag = "inventory", params(("id" = Uuid, Path, description = "Item ID")), request_body = crate::openapi::ItemPatchRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Stock would go negative")))]
pub async fn update_item(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<inventory_item::Model>, JsonApiError> {
    let v = current_vendor(&state, &claims, INVENTORY).await?;
    let item = items::update_item(&state.db, v.id, id, patch).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(Json(item))
}

#[utoipa::path(delete, path = "/vendor/items/{id}", tag = "inventory", params(("id" = Uuid, Path, description = "Item ID")), responses((status = 204, description = "Deleted"), (status = 409, description = "Item has sales")))]
pub async fn delete_item(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    let v = current_vendor(&state, &claims, INVENTORY).await?;
    items::delete_item(&state.db, v.id, id).await?;
    state.dashboard.invalidate(v.id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/vendor/sales", tag = "inventory", responses((status = 200, description = "Sales page, newest first")))]
pub async fn list_sales(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(p): Query<Pagination>,
) -> Result<Json<Page<sale::Model>>, JsonApiError> {
    let v = current_vendor(&state, &claims, INVENTORY).await?;
    Ok(Json(sales::list_sales(&state.db, v.id, p).await?))
}

#[utoipa::path(post, path = "/vendor/sales", tag = "inventory", request_body = crate::openapi::NewSaleRequest, responses((status = 201, description = "Recorded"), (status = 409, description = "Insufficient stock or expired")))]
pub async fn record_sale(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<NewSale>,
) -> Result<(StatusCode, Json<sale::Model>), JsonApiError> {
    let v = current_vendor(&state, &claims, INVENTORY).await?;
    let s = sales::record_sale(&state.db, v.id, input, Utc::now().date_naive()).await?;
    state.dashboard.invalidate(v.id).await;
    Ok((StatusCode::CREATED, Json(s)))
}
