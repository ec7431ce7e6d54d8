use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::vendor;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub email: String,
    pub position: String,
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

pub async fn create<C: ConnectionTrait>(db: &C, vendor_id: Uuid, name: &str, email: &str, position: &str) -> Result<Model, errors::ModelError> {
    crate::user::validate_name(name)?;
    crate::user::validate_email(email)?;
    if position.trim().is_empty() { return Err(errors::ModelError::Validation("position required".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor_id),
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        position: Set(position.trim().to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
