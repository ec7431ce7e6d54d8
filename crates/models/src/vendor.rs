use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::kinds::{ServiceType, VendorStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    pub contact_email: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn service_type(&self) -> Result<ServiceType, errors::ModelError> {
        self.service_type.parse()
    }

    pub fn is_active(&self) -> bool {
        self.status == VendorStatus::Active.as_str()
    }
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    if trimmed.chars().count() > 128 { return Err(errors::ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    service_type: ServiceType,
    contact_email: &str,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    crate::user::validate_email(contact_email)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        service_type: Set(service_type.as_str().to_string()),
        contact_email: Set(contact_email.trim().to_lowercase()),
        status: Set(VendorStatus::Active.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn set_status<C: ConnectionTrait>(db: &C, id: Uuid, status: VendorStatus) -> Result<Model, errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::Validation("vendor not found".into()))?
        .into();
    found.status = Set(status.as_str().to_string());
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(129)).is_err());
        assert!(validate_name("Sunrise Lodge").is_ok());
    }
}
