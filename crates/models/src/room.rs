use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::kinds::RoomStatus;
use crate::vendor;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub number: String,
    pub room_type: String,
    pub price_per_night_cents: i64,
    pub capacity: i32,
    pub status: String,
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
    pub fn status(&self) -> Result<RoomStatus, errors::ModelError> { self.status.parse() }
}

pub const MAX_CAPACITY: i32 = 20;

pub fn validate_number(number: &str) -> Result<(), errors::ModelError> {
    let n = number.trim();
    if n.is_empty() || n.len() > 16 {
        return Err(errors::ModelError::Validation("room number must be 1..=16 characters".into()));
    }
    Ok(())
}

pub fn validate_capacity(capacity: i32) -> Result<(), errors::ModelError> {
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(errors::ModelError::Validation(format!("capacity must be within 1..={MAX_CAPACITY}")));
    }
    Ok(())
}

pub fn validate_price(cents: i64) -> Result<(), errors::ModelError> {
    if cents < 0 { return Err(errors::ModelError::Validation("price must not be negative".into())); }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_rules() {
        assert!(validate_number("").is_err());
        assert!(validate_number("101").is_ok());
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(21).is_err());
        assert!(validate_capacity(2).is_ok());
        assert!(validate_price(-1).is_err());
        assert!(validate_price(0).is_ok());
    }
}
