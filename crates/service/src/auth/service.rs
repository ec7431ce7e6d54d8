use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::Role;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const PASSWORD_ALGORITHM: &str = "argon2";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            token_ttl_hours: cfg.token_ttl_hours,
            password_algorithm: PASSWORD_ALGORITHM.into(),
        }
    }
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

/// Argon2 hash in PHC string form.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a customer account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() });
    /// let input = RegisterInput { email: "guest@example.com".into(), name: "Guest".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.role, models::Role::Customer);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        self.create_account(&input.email, &input.name, &input.password, Role::Customer).await
    }

    async fn create_account(&self, email: &str, name: &str, password: &str, role: Role) -> Result<AuthUser, AuthError> {
        validate_password(password)?;
        if let Some(existing) = self.repo.find_user_by_email(email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(email, name, role, None).await?;
        let hash = hash_password(password)?;
        self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a signed token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            warn!(user_id = %user.id, "login_failed");
            return Err(AuthError::Unauthorized);
        }

        if let Some(vendor_id) = user.vendor_id {
            if !self.repo.vendor_is_active(vendor_id).await? {
                warn!(user_id = %user.id, vendor_id = %vendor_id, "login_blocked_suspended_vendor");
                return Err(AuthError::Suspended);
            }
        }

        let (token, expires_at) = self.issue_token(&user)?;
        info!(user_id = %user.id, role = %user.role, "user_logged_in");
        Ok(AuthSession { user, token, expires_at })
    }

    pub fn issue_token(&self, user: &AuthUser) -> Result<(String, i64), AuthError> {
        let now = chrono::Utc::now();
        let exp = (now + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id,
            role: user.role,
            vid: user.vendor_id,
            iat: now.timestamp(),
            exp,
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok((token, exp))
    }

    /// Decode and validate a bearer token (signature and expiry).
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::Unauthorized)?;
        Ok(data.claims)
    }

    /// Create the bootstrap admin if missing. Safe to call on every start.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        match self.repo.find_user_by_email(email).await? {
            Some(user) if user.role == Role::Admin => Ok(user),
            Some(_) => Err(AuthError::Conflict),
            None => {
                let user = self.create_account(email, "Administrator", password, Role::Admin).await?;
                info!(user_id = %user.id, "admin_bootstrapped");
                Ok(user)
            }
        }
    }

    /// Attach a password to a vendor-owned user created elsewhere.
    pub async fn set_password(&self, user_id: Uuid, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let hash = hash_password(password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc(repo: Arc<MockAuthRepository>) -> AuthService<MockAuthRepository> {
        AuthService::new(repo, AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1, password_algorithm: PASSWORD_ALGORITHM.into() })
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Amina".into(), password: "Sup3rSecret".into() }
    }

    #[tokio::test]
    async fn register_then_login_issues_verifiable_token() {
        let s = svc(Arc::new(MockAuthRepository::default()));
        let user = s.register(register_input("Amina@Example.com")).await.unwrap();
        assert_eq!(user.email, "amina@example.com");

        let session = s.login(LoginInput { email: "amina@example.com".into(), password: "Sup3rSecret".into() }).await.unwrap();
        let claims = s.verify_token(&session.token).unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.vid, None);
        assert_eq!(claims.exp, session.expires_at);
    }

    #[tokio::test]
    async fn short_password_and_duplicate_email_rejected() {
        let s = svc(Arc::new(MockAuthRepository::default()));
        let mut short = register_input("a@b.co");
        short.password = "short".into();
        assert!(matches!(s.register(short).await, Err(AuthError::Validation(_))));

        s.register(register_input("a@b.co")).await.unwrap();
        assert!(matches!(s.register(register_input("A@B.CO")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let s = svc(Arc::new(MockAuthRepository::default()));
        s.register(register_input("a@b.co")).await.unwrap();
        let res = s.login(LoginInput { email: "a@b.co".into(), password: "nope-nope".into() }).await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
        let res = s.login(LoginInput { email: "ghost@b.co".into(), password: "Sup3rSecret".into() }).await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn suspended_vendor_user_cannot_login() {
        let repo = Arc::new(MockAuthRepository::default());
        let s = svc(repo.clone());
        let vendor_id = Uuid::new_v4();
        let user = repo.create_user("owner@lodge.co", "Owner", Role::Vendor, Some(vendor_id)).await.unwrap();
        s.set_password(user.id, "Sup3rSecret").await.unwrap();

        let session = s.login(LoginInput { email: "owner@lodge.co".into(), password: "Sup3rSecret".into() }).await.unwrap();
        assert_eq!(s.verify_token(&session.token).unwrap().vid, Some(vendor_id));

        repo.suspend_vendor(vendor_id);
        let res = s.login(LoginInput { email: "owner@lodge.co".into(), password: "Sup3rSecret".into() }).await;
        assert!(matches!(res, Err(AuthError::Suspended)));
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_rejected() {
        let s = svc(Arc::new(MockAuthRepository::default()));
        s.register(register_input("a@b.co")).await.unwrap();
        let session = s.login(LoginInput { email: "a@b.co".into(), password: "Sup3rSecret".into() }).await.unwrap();

        let other = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig { jwt_secret: "other".into(), token_ttl_hours: 1, password_algorithm: PASSWORD_ALGORITHM.into() });
        assert!(matches!(other.verify_token(&session.token), Err(AuthError::Unauthorized)));
        assert!(matches!(s.verify_token("not.a.jwt"), Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let s = svc(Arc::new(MockAuthRepository::default()));
        let first = s.ensure_admin("root@shiteni.io", "Adm1nPassword").await.unwrap();
        let second = s.ensure_admin("root@shiteni.io", "Adm1nPassword").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.role, Role::Admin);

        s.register(register_input("guest@b.co")).await.unwrap();
        assert!(matches!(s.ensure_admin("guest@b.co", "Adm1nPassword").await, Err(AuthError::Conflict)));
    }
}
