use async_trait::async_trait;
use models::Role;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str, role: Role, vendor_id: Option<Uuid>) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;

    /// `false` when the vendor is suspended or gone.
    async fn vendor_is_active(&self, vendor_id: Uuid) -> Result<bool, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,  // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
        suspended: Mutex<HashSet<Uuid>>,
    }

    impl MockAuthRepository {
        pub fn suspend_vendor(&self, vendor_id: Uuid) {
            self.suspended.lock().unwrap().insert(vendor_id);
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&email.trim().to_lowercase()).cloned())
        }

        async fn create_user(&self, email: &str, name: &str, role: Role, vendor_id: Option<Uuid>) -> Result<AuthUser, AuthError> {
            models::user::validate_email(email)?;
            models::user::validate_name(name)?;
            models::user::validate_role_scope(role, vendor_id)?;
            let key = email.trim().to_lowercase();
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&key) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), email: key.clone(), name: name.trim().to_string(), role, vendor_id };
            users.insert(key, user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }

        async fn vendor_is_active(&self, vendor_id: Uuid) -> Result<bool, AuthError> {
            Ok(!self.suspended.lock().unwrap().contains(&vendor_id))
        }
    }
}
