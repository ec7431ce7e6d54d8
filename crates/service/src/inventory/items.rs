use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{inventory_item, sale, vendor, ItemKind};

use super::{apply_stock_delta, expires_within, is_low_stock};
use crate::billing::limits::ensure_capacity;
use crate::billing::Resource;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub reorder_level: i32,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub batch_no: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub unit_price_cents: Option<i64>,
    /// Relative stock change: positive for deliveries, negative for write-offs.
    pub stock_delta: Option<i32>,
    pub reorder_level: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub batch_no: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ItemFilter {
    #[serde(default)]
    pub low_stock: bool,
    /// Only medicines expiring within this many days.
    pub expiring_within_days: Option<i64>,
}

/// Item kind a vendor stocks; hotels and bus operators keep no inventory.
pub fn kind_for(vendor: &vendor::Model) -> Result<ItemKind, ServiceError> {
    vendor
        .service_type()?
        .item_kind()
        .ok_or_else(|| ServiceError::Forbidden("this vendor does not keep inventory".into()))
}

fn validate_item_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() || name.trim().chars().count() > 128 {
        return Err(ServiceError::Validation("name must be 1..=128 characters".into()));
    }
    Ok(())
}

#[instrument(skip(db, vendor, input), fields(vendor_id = %vendor.id, sku = %input.sku))]
pub async fn create_item(db: &DatabaseConnection, vendor: &vendor::Model, input: NewItem) -> Result<inventory_item::Model, ServiceError> {
    let kind = kind_for(vendor)?;
    inventory_item::validate_sku(&input.sku)?;
    validate_item_name(&input.name)?;
    models::room::validate_price(input.unit_price_cents)?;
    inventory_item::validate_stock(input.quantity, input.reorder_level)?;
    inventory_item::validate_expiry(kind, input.expiry_date)?;

    let txn = db.begin().await?;
    ensure_capacity(&txn, vendor, Resource::Listings, 1).await?;

    let now = Utc::now().into();
    let am = inventory_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        kind: Set(kind.as_str().to_string()),
        sku: Set(input.sku.trim().to_ascii_uppercase()),
        name: Set(input.name.trim().to_string()),
        unit_price_cents: Set(input.unit_price_cents),
        quantity: Set(input.quantity),
        reorder_level: Set(input.reorder_level),
        expiry_date: Set(input.expiry_date),
        batch_no: Set(input.batch_no.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(&txn).await.map_err(|e| ServiceError::from_db(e, "sku"))?;
    txn.commit().await?;
    info!(item_id = %created.id, kind = %kind, "item_created");
    Ok(created)
}

pub async fn get_item(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<inventory_item::Model, ServiceError> {
    inventory_item::Entity::find_by_id(id)
        .filter(inventory_item::Column::VendorId.eq(vendor_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("item"))
}

/// Items by name; filters are applied on the loaded rows.
pub async fn list_items(db: &DatabaseConnection, vendor_id: Uuid, filter: ItemFilter, today: NaiveDate) -> Result<Vec<inventory_item::Model>, ServiceError> {
    let items = inventory_item::Entity::find()
        .filter(inventory_item::Column::VendorId.eq(vendor_id))
        .order_by_asc(inventory_item::Column::Name)
        .all(db)
        .await?;
    Ok(items
        .into_iter()
        .filter(|i| !filter.low_stock || is_low_stock(i))
        .filter(|i| filter.expiring_within_days.map_or(true, |w| expires_within(i, today, w)))
        .collect())
}

#[instrument(skip(db, patch))]
pub async fn update_item(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid, patch: ItemPatch) -> Result<inventory_item::Model, ServiceError> {
    // row lock shared with `record_sale`
    let txn = db.begin().await?;
    let existing = inventory_item::Entity::find_by_id(id)
        .filter(inventory_item::Column::VendorId.eq(vendor_id))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("item"))?;
    let kind = existing.kind()?;
    let mut quantity = existing.quantity;
    let mut reorder_level = existing.reorder_level;
    let mut am: inventory_item::ActiveModel = existing.into();
    if let Some(n) = patch.name {
        validate_item_name(&n)?;
        am.name = Set(n.trim().to_string());
    }
    if let Some(p) = patch.unit_price_cents {
        models::room::validate_price(p)?;
        am.unit_price_cents = Set(p);
    }
    if let Some(delta) = patch.stock_delta {
        quantity = apply_stock_delta(quantity, delta)?;
        am.quantity = Set(quantity);
    }
    if let Some(r) = patch.reorder_level {
        reorder_level = r;
        am.reorder_level = Set(r);
    }
    inventory_item::validate_stock(quantity, reorder_level)?;
    if let Some(d) = patch.expiry_date {
        inventory_item::validate_expiry(kind, Some(d))?;
        am.expiry_date = Set(Some(d));
    }
    if let Some(b) = patch.batch_no {
        am.batch_no = Set(Some(b.trim().to_string()).filter(|b| !b.is_empty()));
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(item_id = %updated.id, quantity = updated.quantity, "item_updated");
    Ok(updated)
}

/// Delete an item that was never sold.
#[instrument(skip(db))]
pub async fn delete_item(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let item = get_item(db, vendor_id, id).await?;
    let sold = sale::Entity::find().filter(sale::Column::ItemId.eq(item.id)).count(db).await?;
    if sold > 0 {
        return Err(ServiceError::Conflict("item has sales history; set its stock to zero instead".into()));
    }
    inventory_item::Entity::delete_by_id(item.id).exec(db).await?;
    info!(item_id = %item.id, "item_deleted");
    Ok(())
}
