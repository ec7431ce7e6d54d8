use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::kinds::{PlanTier, SubscriptionStatus};
use crate::vendor;

/// One row per vendor: the plan currently governing its limits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub vendor_id: Uuid,
    pub tier: String,
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub current_period_start: DateTimeWithTimeZone,
    pub current_period_end: DateTimeWithTimeZone,
    pub cancel_at_period_end: bool,
    /// Opaque gateway token reused for renewals.
    #[serde(skip_serializing)]
    pub payment_source: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Vendor => Entity::belongs_to(vendor::Entity)
                .from(Column::VendorId)
                .to(vendor::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn tier(&self) -> Result<PlanTier, errors::ModelError> { self.tier.parse() }
    pub fn status(&self) -> Result<SubscriptionStatus, errors::ModelError> { self.status.parse() }
}

pub async fn find_by_vendor<C: ConnectionTrait>(db: &C, vendor_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::VendorId.eq(vendor_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
