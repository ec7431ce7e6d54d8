use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::vendor;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bus")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub registration: String,
    pub name: String,
    pub capacity: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Vendor => Entity::belongs_to(vendor::Entity).from(Column::VendorId).to(vendor::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const MAX_CAPACITY: i32 = 120;

/// Registration plates are stored upper-case without inner whitespace.
pub fn normalize_registration(reg: &str) -> Result<String, errors::ModelError> {
    let normalized: String = reg.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_uppercase();
    if normalized.is_empty() || normalized.len() > 16 || !normalized.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(errors::ModelError::Validation("invalid registration".into()));
    }
    Ok(normalized)
}

pub fn validate_capacity(capacity: i32) -> Result<(), errors::ModelError> {
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(errors::ModelError::Validation(format!("capacity must be within 1..={MAX_CAPACITY}")));
    }
    Ok(())
}
