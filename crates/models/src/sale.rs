use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{inventory_item, vendor};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub item_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor, Item }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Vendor => Entity::belongs_to(vendor::Entity).from(Column::VendorId).to(vendor::Column::Id).into(),
            Relation::Item => Entity::belongs_to(inventory_item::Entity).from(Column::ItemId).to(inventory_item::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
