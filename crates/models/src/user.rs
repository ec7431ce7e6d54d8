use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::kinds::Role;
use crate::vendor;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Vendor,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Vendor => Entity::belongs_to(vendor::Entity).from(Column::VendorId).to(vendor::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role(&self) -> Result<Role, errors::ModelError> { self.role.parse() }
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(errors::ModelError::Validation("invalid email".into()));
    };
    if local.is_empty() || domain.is_empty() || email.len() > 255 {
        return Err(errors::ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    if name.trim().chars().count() > 128 { return Err(errors::ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

/// Vendor users belong to exactly one vendor; admins and customers to none.
pub fn validate_role_scope(role: Role, vendor_id: Option<Uuid>) -> Result<(), errors::ModelError> {
    match (role, vendor_id) {
        (Role::Vendor, None) => Err(errors::ModelError::Validation("vendor users require a vendor".into())),
        (Role::Admin | Role::Customer, Some(_)) => Err(errors::ModelError::Validation(format!("{role} users cannot belong to a vendor"))),
        _ => Ok(()),
    }
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    email: &str,
    name: &str,
    role: Role,
    vendor_id: Option<Uuid>,
) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    validate_role_scope(role, vendor_id)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor_id),
        email: Set(email.trim().to_lowercase()),
        name: Set(name.trim().to_string()),
        role: Set(role.as_str().to_string()),
        status: Set("active".into()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::unique(e, "account with this email"))
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn soft_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?.ok_or_else(|| errors::ModelError::Validation("user not found".into()))?.into();
    found.deleted_at = Set(Some(Utc::now().into()));
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(validate_email("owner@lodge.co").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn role_scope_rules() {
        let vid = Some(Uuid::new_v4());
        assert!(validate_role_scope(Role::Vendor, vid).is_ok());
        assert!(validate_role_scope(Role::Vendor, None).is_err());
        assert!(validate_role_scope(Role::Customer, vid).is_err());
        assert!(validate_role_scope(Role::Admin, None).is_ok());
    }
}
