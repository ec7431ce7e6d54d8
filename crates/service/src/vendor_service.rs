use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{subscription, user, user_credentials, vendor, Role, ServiceType, VendorStatus};

use crate::auth::service::{hash_password, validate_password, PASSWORD_ALGORITHM};
use crate::billing::service::initial_subscription;
use crate::errors::ServiceError;

/// Self-service sign-up of a business.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardInput {
    pub business_name: String,
    pub service_type: ServiceType,
    pub owner_email: String,
    pub owner_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Onboarded {
    pub vendor: vendor::Model,
    pub owner: user::Model,
    pub subscription: subscription::Model,
    /// Frontend route the owner lands on after login.
    pub dashboard_path: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct VendorFilter {
    pub service_type: Option<ServiceType>,
    pub status: Option<VendorStatus>,
}

/// Create vendor, owner account, credentials and a basic subscription in
/// one transaction.
#[instrument(skip(db, input), fields(business = %input.business_name, service_type = %input.service_type))]
pub async fn onboard(db: &DatabaseConnection, input: OnboardInput, currency: &str) -> Result<Onboarded, ServiceError> {
    validate_password(&input.password).map_err(|e| ServiceError::Validation(e.to_string()))?;
    if user::find_by_email(db, &input.owner_email).await?.is_some() {
        return Err(ServiceError::Conflict("an account with this email already exists".into()));
    }
    let hash = hash_password(&input.password).map_err(|e| ServiceError::Validation(e.to_string()))?;

    let txn = db.begin().await?;
    let v = vendor::create(&txn, &input.business_name, input.service_type, &input.owner_email).await?;
    let owner = user::create(&txn, &input.owner_email, &input.owner_name, Role::Vendor, Some(v.id)).await?;
    user_credentials::upsert_password(&txn, owner.id, hash, PASSWORD_ALGORITHM).await?;
    let sub = subscription::ActiveModel::from(initial_subscription(v.id, currency, Utc::now()))
        .reset_all()
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_db(e, "subscription"))?;
    txn.commit().await?;

    info!(vendor_id = %v.id, owner_id = %owner.id, "vendor_onboarded");
    let dashboard_path = input.service_type.dashboard_path();
    Ok(Onboarded { vendor: v, owner, subscription: sub, dashboard_path })
}

pub async fn get_vendor(db: &DatabaseConnection, id: Uuid) -> Result<Option<vendor::Model>, ServiceError> {
    Ok(vendor::Entity::find_by_id(id).one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?)
}

/// Vendor by id, `NotFound` when missing.
pub async fn require_vendor(db: &DatabaseConnection, id: Uuid) -> Result<vendor::Model, ServiceError> {
    get_vendor(db, id).await?.ok_or_else(|| ServiceError::not_found("vendor"))
}

/// List vendors with optional filters, newest first.
pub async fn list_vendors(db: &DatabaseConnection, filter: VendorFilter, opts: Pagination) -> Result<Page<vendor::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut query = vendor::Entity::find();
    if let Some(t) = filter.service_type {
        query = query.filter(vendor::Column::ServiceType.eq(t.as_str()));
    }
    if let Some(s) = filter.status {
        query = query.filter(vendor::Column::Status.eq(s.as_str()));
    }
    let paginator = query.order_by_desc(vendor::Column::CreatedAt).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page { items, page: page_idx as u32 + 1, per_page: per_page as u32, total })
}

#[instrument(skip(db))]
pub async fn set_status(db: &DatabaseConnection, id: Uuid, status: VendorStatus) -> Result<vendor::Model, ServiceError> {
    require_vendor(db, id).await?;
    let updated = vendor::set_status(db, id, status).await?;
    info!(vendor_id = %id, status = %status, "vendor_status_changed");
    Ok(updated)
}

/// Active vendors customers can browse, alphabetically.
pub async fn public_catalog(db: &DatabaseConnection, service_type: Option<ServiceType>) -> Result<Vec<vendor::Model>, ServiceError> {
    let mut query = vendor::Entity::find().filter(vendor::Column::Status.eq(VendorStatus::Active.as_str()));
    if let Some(t) = service_type {
        query = query.filter(vendor::Column::ServiceType.eq(t.as_str()));
    }
    Ok(query.order_by_asc(vendor::Column::Name).all(db).await?)
}

/// A single catalog entry; suspended vendors are hidden.
pub async fn catalog_vendor(db: &DatabaseConnection, id: Uuid) -> Result<vendor::Model, ServiceError> {
    match get_vendor(db, id).await? {
        Some(v) if v.is_active() => Ok(v),
        _ => Err(ServiceError::not_found("vendor")),
    }
}
