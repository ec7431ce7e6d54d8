use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::kinds::{PaymentStatus, PlanTier};
use crate::{subscription, vendor};

/// Billing record written around every gateway charge.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub subscription_id: Uuid,
    pub tier: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub gateway_ref: Option<String>,
    pub failure_reason: Option<String>,
    #[sea_orm(unique)]
    pub idempotency_key: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor, Subscription }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Vendor => Entity::belongs_to(vendor::Entity)
                .from(Column::VendorId)
                .to(vendor::Column::Id)
                .into(),
            Relation::Subscription => Entity::belongs_to(subscription::Entity)
                .from(Column::SubscriptionId)
                .to(subscription::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn tier(&self) -> Result<PlanTier, errors::ModelError> { self.tier.parse() }
    pub fn status(&self) -> Result<PaymentStatus, errors::ModelError> { self.status.parse() }
}
