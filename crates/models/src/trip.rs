use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{bus, vendor};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub bus_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departs_at: DateTimeWithTimeZone,
    pub arrives_at: DateTimeWithTimeZone,
    pub fare_cents: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor, Bus }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Vendor => Entity::belongs_to(vendor::Entity).from(Column::VendorId).to(vendor::Column::Id).into(),
            Relation::Bus => Entity::belongs_to(bus::Entity).from(Column::BusId).to(bus::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_route(origin: &str, destination: &str) -> Result<(), errors::ModelError> {
    let (o, d) = (origin.trim(), destination.trim());
    if o.is_empty() || d.is_empty() {
        return Err(errors::ModelError::Validation("origin and destination are required".into()));
    }
    if o.eq_ignore_ascii_case(d) {
        return Err(errors::ModelError::Validation("origin and destination must differ".into()));
    }
    Ok(())
}

pub fn validate_schedule(departs_at: DateTimeWithTimeZone, arrives_at: DateTimeWithTimeZone) -> Result<(), errors::ModelError> {
    if arrives_at <= departs_at {
        return Err(errors::ModelError::Validation("arrival must be after departure".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn route_rules() {
        assert!(validate_route("Nairobi", "nairobi").is_err());
        assert!(validate_route("", "Mombasa").is_err());
        assert!(validate_route("Nairobi", "Mombasa").is_ok());
    }

    #[test]
    fn schedule_rules() {
        let dep: DateTimeWithTimeZone = Utc::now().into();
        assert!(validate_schedule(dep, dep).is_err());
        assert!(validate_schedule(dep, dep + Duration::hours(8)).is_ok());
    }
}
