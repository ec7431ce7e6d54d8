use models::{bus, inventory_item, room, staff, subscription, vendor, ServiceType};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use super::plans::{self, check_limit, Resource, Usage};
use crate::errors::ServiceError;

async fn capacity_sum<C: ConnectionTrait>(db: &C, service_type: ServiceType, vendor_id: Uuid) -> Result<u64, ServiceError> {
    let caps: Vec<i32> = match service_type {
        ServiceType::Hotel => room::Entity::find()
            .select_only()
            .column(room::Column::Capacity)
            .filter(room::Column::VendorId.eq(vendor_id))
            .into_tuple()
            .all(db)
            .await?,
        ServiceType::Bus => bus::Entity::find()
            .select_only()
            .column(bus::Column::Capacity)
            .filter(bus::Column::VendorId.eq(vendor_id))
            .into_tuple()
            .all(db)
            .await?,
        ServiceType::Store | ServiceType::Pharmacy => Vec::new(),
    };
    Ok(caps.into_iter().map(|c| c.max(0) as u64).sum())
}

/// Count listings, staff and seats for a vendor of the given type.
pub async fn load_usage<C: ConnectionTrait>(db: &C, vendor_id: Uuid, service_type: ServiceType) -> Result<Usage, ServiceError> {
    let listings = match service_type {
        ServiceType::Hotel => room::Entity::find().filter(room::Column::VendorId.eq(vendor_id)).count(db).await?,
        ServiceType::Bus => bus::Entity::find().filter(bus::Column::VendorId.eq(vendor_id)).count(db).await?,
        ServiceType::Store | ServiceType::Pharmacy => inventory_item::Entity::find()
            .filter(inventory_item::Column::VendorId.eq(vendor_id))
            .count(db)
            .await?,
    };
    let staff = staff::Entity::find().filter(staff::Column::VendorId.eq(vendor_id)).count(db).await?;
    let seats = capacity_sum(db, service_type, vendor_id).await?;
    Ok(Usage { listings, staff, seats })
}

/// Reject the mutation when adding `adding` units of `resource` would pass
/// the vendor's plan limit.
///
/// Locks the vendor's subscription row for the rest of `txn`, so concurrent
/// creates for one vendor are checked one after another. Callers insert the
/// new row in the same transaction.
pub async fn ensure_capacity(txn: &DatabaseTransaction, vendor: &vendor::Model, resource: Resource, adding: u64) -> Result<(), ServiceError> {
    if adding == 0 {
        return Ok(());
    }
    let sub = subscription::Entity::find()
        .filter(subscription::Column::VendorId.eq(vendor.id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("subscription"))?;
    let limits = plans::plan(sub.tier()?).limits;
    if limits.max(resource).is_none() {
        return Ok(());
    }
    let usage = load_usage(txn, vendor.id, vendor.service_type()?).await?;
    check_limit(&limits, resource, usage.get(resource), adding)
}
