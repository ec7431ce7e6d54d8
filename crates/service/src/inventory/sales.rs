use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use common::metrics::SALES_RECORDED_TOTAL;
use common::pagination::Pagination;
use common::types::Page;
use models::{inventory_item, sale};

use super::line_total;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub item_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
}

/// Sell from stock. The item row is locked so concurrent sales cannot
/// oversell.
#[instrument(skip(db, input), fields(item_id = %input.item_id, quantity = input.quantity))]
pub async fn record_sale(db: &DatabaseConnection, vendor_id: Uuid, input: NewSale, today: NaiveDate) -> Result<sale::Model, ServiceError> {
    if input.quantity <= 0 {
        return Err(ServiceError::Validation("quantity must be positive".into()));
    }

    let txn = db.begin().await?;
    let item = inventory_item::Entity::find_by_id(input.item_id)
        .filter(inventory_item::Column::VendorId.eq(vendor_id))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("item"))?;
    if item.is_expired(today) {
        return Err(ServiceError::Conflict(format!("{} expired and cannot be sold", item.name)));
    }
    if item.quantity < input.quantity {
        return Err(ServiceError::Conflict(format!("only {} of {} in stock", item.quantity, item.name)));
    }
    let total = line_total(item.unit_price_cents, input.quantity)?;

    let remaining = item.quantity - input.quantity;
    let unit_price = item.unit_price_cents;
    let mut am: inventory_item::ActiveModel = item.into();
    am.quantity = Set(remaining);
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await?;

    let created = sale::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor_id),
        item_id: Set(input.item_id),
        customer_id: Set(input.customer_id),
        quantity: Set(input.quantity),
        unit_price_cents: Set(unit_price),
        total_cents: Set(total),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    SALES_RECORDED_TOTAL.inc();
    info!(sale_id = %created.id, vendor_id = %vendor_id, total_cents = total, remaining, "sale_recorded");
    Ok(created)
}

/// Newest sales first.
pub async fn list_sales(db: &DatabaseConnection, vendor_id: Uuid, opts: Pagination) -> Result<Page<sale::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let paginator = sale::Entity::find()
        .filter(sale::Column::VendorId.eq(vendor_id))
        .order_by_desc(sale::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page { items, page: page_idx as u32 + 1, per_page: per_page as u32, total })
}
