use models::Role;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        res.map(AuthUser::try_from).transpose().map_err(AuthError::from)
    }

    async fn create_user(&self, email: &str, name: &str, role: Role, vendor_id: Option<Uuid>) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, email, name, role, vendor_id).await?;
        Ok(AuthUser::try_from(created)?)
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }

    async fn vendor_is_active(&self, vendor_id: Uuid) -> Result<bool, AuthError> {
        let vendor = models::vendor::Entity::find_by_id(vendor_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(vendor.is_some_and(|v| v.is_active()))
    }
}
