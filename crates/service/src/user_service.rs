use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use uuid::Uuid;

use models::{user, vendor};
use crate::errors::ServiceError;

/// What `/auth/me` returns: the account, its vendor and where to route it.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: user::Model,
    pub vendor: Option<vendor::Model>,
    pub dashboard_path: String,
}

/// Get a user by id, ignoring soft-deleted rows.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
    let found = user::Entity::find_by_id(id).one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found.filter(|u| u.deleted_at.is_none()))
}

pub async fn profile(db: &DatabaseConnection, id: Uuid) -> Result<Profile, ServiceError> {
    let user = get_user(db, id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
    let vendor = match user.vendor_id {
        Some(vid) => vendor::Entity::find_by_id(vid).one(db).await?,
        None => None,
    };
    let dashboard_path = match (&vendor, user.role()?) {
        (Some(v), _) => v.service_type()?.dashboard_path(),
        (None, models::Role::Admin) => "/dashboard/admin".to_string(),
        (None, _) => "/catalog".to_string(),
    };
    Ok(Profile { user, vendor, dashboard_path })
}

/// Soft-delete a user (marks deleted_at).
pub async fn soft_delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    user::soft_delete(db, id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, onboard_input};

    #[tokio::test]
    async fn profile_routes_owner_to_vendor_dashboard() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };

        let out = crate::vendor_service::onboard(&db, onboard_input(models::ServiceType::Bus), "USD").await?;
        let p = profile(&db, out.owner.id).await?;
        assert_eq!(p.dashboard_path, "/dashboard/bus");
        assert_eq!(p.vendor.map(|v| v.id), Some(out.vendor.id));

        soft_delete_user(&db, out.owner.id).await?;
        assert!(get_user(&db, out.owner.id).await?.is_none());
        assert!(matches!(profile(&db, out.owner.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
