use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{staff, vendor};

use crate::billing::limits::ensure_capacity;
use crate::billing::Resource;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub position: String,
}

/// Add a staff member, limited by the plan's `max_staff`.
#[instrument(skip(db, vendor, input), fields(vendor_id = %vendor.id))]
pub async fn add_staff(db: &DatabaseConnection, vendor: &vendor::Model, input: NewStaff) -> Result<staff::Model, ServiceError> {
    let txn = db.begin().await?;
    ensure_capacity(&txn, vendor, Resource::Staff, 1).await?;
    let created = staff::create(&txn, vendor.id, &input.name, &input.email, &input.position).await?;
    txn.commit().await?;
    info!(staff_id = %created.id, "staff_added");
    Ok(created)
}

pub async fn list_staff(db: &DatabaseConnection, vendor_id: Uuid) -> Result<Vec<staff::Model>, ServiceError> {
    Ok(staff::Entity::find()
        .filter(staff::Column::VendorId.eq(vendor_id))
        .order_by_asc(staff::Column::Name)
        .all(db)
        .await?)
}

#[instrument(skip(db))]
pub async fn remove_staff(db: &DatabaseConnection, vendor_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let res = staff::Entity::delete_many()
        .filter(staff::Column::Id.eq(id))
        .filter(staff::Column::VendorId.eq(vendor_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("staff member"));
    }
    info!(staff_id = %id, "staff_removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, vendor_of};
    use models::ServiceType;

    fn member(n: u32) -> NewStaff {
        NewStaff { name: format!("Clerk {n}"), email: format!("clerk{n}@shop.co"), position: "cashier".into() }
    }

    #[tokio::test]
    async fn basic_plan_allows_two_staff() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let v = vendor_of(&db, ServiceType::Store).await;
        let first = add_staff(&db, &v, member(1)).await?;
        add_staff(&db, &v, member(2)).await?;
        assert!(matches!(add_staff(&db, &v, member(3)).await, Err(ServiceError::LimitExceeded(_))));

        remove_staff(&db, v.id, first.id).await?;
        assert!(matches!(remove_staff(&db, v.id, first.id).await, Err(ServiceError::NotFound(_))));
        add_staff(&db, &v, member(3)).await?;
        assert_eq!(list_staff(&db, v.id).await?.len(), 2);
        Ok(())
    }
}
