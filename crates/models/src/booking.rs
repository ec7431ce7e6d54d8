use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::kinds::BookingStatus;
use crate::{room, vendor};

/// A stay covering the nights `[check_in, check_out)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub room_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub guest_name: String,
    pub check_in: Date,
    pub check_out: Date,
    pub nights: i32,
    pub total_cents: i64,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor, Room }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Vendor => Entity::belongs_to(vendor::Entity).from(Column::VendorId).to(vendor::Column::Id).into(),
            Relation::Room => Entity::belongs_to(room::Entity).from(Column::RoomId).to(room::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<BookingStatus, errors::ModelError> { self.status.parse() }
}
