use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::kinds::ItemKind;
use crate::vendor;

/// Store product or pharmacy medicine, depending on `kind`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub kind: String,
    pub sku: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub reorder_level: i32,
    pub expiry_date: Option<Date>,
    pub batch_no: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Vendor => Entity::belongs_to(vendor::Entity).from(Column::VendorId).to(vendor::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn kind(&self) -> Result<ItemKind, errors::ModelError> { self.kind.parse() }

    pub fn is_expired(&self, today: Date) -> bool {
        self.expiry_date.is_some_and(|d| d < today)
    }
}

pub fn validate_sku(sku: &str) -> Result<(), errors::ModelError> {
    let s = sku.trim();
    if s.is_empty() || s.len() > 64 {
        return Err(errors::ModelError::Validation("sku must be 1..=64 characters".into()));
    }
    if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(errors::ModelError::Validation("sku may only contain letters, digits, '-' and '_'".into()));
    }
    Ok(())
}

pub fn validate_stock(quantity: i32, reorder_level: i32) -> Result<(), errors::ModelError> {
    if quantity < 0 { return Err(errors::ModelError::Validation("quantity must not be negative".into())); }
    if reorder_level < 0 { return Err(errors::ModelError::Validation("reorder_level must not be negative".into())); }
    Ok(())
}

/// Medicines carry an expiry date; products must not.
pub fn validate_expiry(kind: ItemKind, expiry: Option<Date>) -> Result<(), errors::ModelError> {
    match (kind, expiry) {
        (ItemKind::Medicine, None) => Err(errors::ModelError::Validation("medicine requires an expiry_date".into())),
        (ItemKind::Product, Some(_)) => Err(errors::ModelError::Validation("products do not take an expiry_date".into())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn sku_rules() {
        assert!(validate_sku("PARA-500_MG").is_ok());
        assert!(validate_sku("bad sku").is_err());
        assert!(validate_sku("").is_err());
    }

    #[test]
    fn expiry_depends_on_kind() {
        let d = NaiveDate::from_ymd_opt(2030, 1, 1);
        assert!(validate_expiry(ItemKind::Medicine, None).is_err());
        assert!(validate_expiry(ItemKind::Medicine, d).is_ok());
        assert!(validate_expiry(ItemKind::Product, d).is_err());
        assert!(validate_expiry(ItemKind::Product, None).is_ok());
    }

    #[test]
    fn negative_stock_rejected() {
        assert!(validate_stock(-1, 0).is_err());
        assert!(validate_stock(0, -1).is_err());
        assert!(validate_stock(0, 0).is_ok());
    }
}
