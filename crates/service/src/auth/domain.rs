use models::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer self-registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub vendor_id: Option<Uuid>,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
    pub expires_at: i64,
}

/// JWT payload carried by every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub uid: Uuid,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vid: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

impl TryFrom<models::user::Model> for AuthUser {
    type Error = models::errors::ModelError;

    fn try_from(u: models::user::Model) -> Result<Self, Self::Error> {
        let role = u.role()?;
        Ok(AuthUser { id: u.id, email: u.email, name: u.name, role, vendor_id: u.vendor_id })
    }
}
