use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};

use configs::AppConfig;
use models::Role;
use service::auth::domain::{AuthUser, Claims, LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::billing::gateway::{build_gateway, PaymentGateway};
use service::billing::repository::SeaOrmBillingRepository;
use service::billing::retry::RetryPolicy;
use service::billing::SubscriptionService;
use service::dashboard::DashboardService;
use service::user_service::{self, Profile};

use crate::errors::{JsonApiError, StartupError};

pub const AUTH_COOKIE: &str = "auth_token";

pub type Billing = SubscriptionService<SeaOrmBillingRepository, dyn PaymentGateway>;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub billing: Arc<Billing>,
    pub dashboard: Arc<DashboardService>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: &AppConfig) -> Result<Self, StartupError> {
        let auth = AuthService::new(Arc::new(SeaOrmAuthRepository { db: db.clone() }), AuthConfig::from_config(&cfg.auth));
        let gateway = build_gateway(&cfg.payment).map_err(|e| StartupError::InvalidConfig(format!("payment gateway: {e}")))?;
        let billing = SubscriptionService::new(
            Arc::new(SeaOrmBillingRepository { db: db.clone() }),
            gateway,
            RetryPolicy::from_config(&cfg.payment),
            cfg.payment.currency.clone(),
        );
        let dashboard = DashboardService::new(db.clone(), cfg.dashboard.clone());
        Ok(Self { db, auth: Arc::new(auth), billing: Arc::new(billing), dashboard: Arc::new(dashboard) })
    }
}

/// Token from `Authorization: Bearer`, falling back to the `auth_token` cookie.
/// `Err` carries the status to answer with.
fn token_from_request(req: &Request) -> Result<String, StatusCode> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
            _ => {
                warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
                Err(StatusCode::UNAUTHORIZED)
            }
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    match jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => {
            warn!(path = %req.uri().path(), "missing Authorization header and auth_token cookie");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Verify the JWT and expose its claims to handlers. Missing token → 400,
/// invalid or expired → 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = token_from_request(&req).map_err(|status| {
        let title = if status == StatusCode::BAD_REQUEST { "Missing Token" } else { "Unauthorized" };
        JsonApiError::new(status, title, None)
    })?;
    let claims = state.auth.verify_token(&token).map_err(|e| {
        warn!(path = %req.uri().path(), err = %e, "token validation failed");
        JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("invalid or expired token".into()))
    })?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn ensure_role(req: &Request, role: Option<Role>) -> Result<Claims, JsonApiError> {
    match req.extensions().get::<Claims>() {
        Some(c) if role.map_or(true, |r| c.role == r) => Ok(c.clone()),
        Some(c) => Err(JsonApiError::forbidden(format!("{} role required, token has {}", role.map(|r| r.to_string()).unwrap_or_default(), c.role))),
        None => Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", None)),
    }
}

/// Closed accounts keep a valid signature until expiry; reject them here.
async fn ensure_open_account(state: &ServerState, claims: &Claims) -> Result<(), JsonApiError> {
    if user_service::get_user(&state.db, claims.uid).await?.is_none() {
        warn!(user_id = %claims.uid, "token for closed account");
        return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("account closed".into())));
    }
    Ok(())
}

fn guard<'a>(state: &'a ServerState, req: &Request, role: Option<Role>) -> impl std::future::Future<Output = Result<(), JsonApiError>> + Send + 'a {
    let claims = ensure_role(req, role);
    async move { ensure_open_account(state, &claims?).await }
}

/// Any signed-in role whose account is still open.
pub async fn require_account(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    guard(&state, &req, None).await?;
    Ok(next.run(req).await)
}

pub async fn require_admin(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    guard(&state, &req, Some(Role::Admin)).await?;
    Ok(next.run(req).await)
}

pub async fn require_vendor(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    guard(&state, &req, Some(Role::Vendor)).await?;
    Ok(next.run(req).await)
}

pub async fn require_customer(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    guard(&state, &req, Some(Role::Customer)).await?;
    Ok(next.run(req).await)
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub user: AuthUser,
    pub token: String,
    pub expires_at: i64,
    pub dashboard_path: String,
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthUser>), JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized"), (status = 403, description = "Vendor suspended")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let profile = user_service::profile(&state.db, session.user.id).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    info!(user_id = %session.user.id, role = %session.user.role, "login_succeeded");
    Ok((
        jar,
        Json(LoginOutput {
            user: session.user,
            token: session.token,
            expires_at: session.expires_at,
            dashboard_path: profile.dashboard_path,
        }),
    ))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current profile"), (status = 400, description = "Missing token"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<Profile>, JsonApiError> {
    Ok(Json(user_service::profile(&state.db, claims.uid).await?))
}

/// Soft-delete the calling account and drop its cookie.
#[utoipa::path(delete, path = "/auth/me", tag = "auth", responses((status = 204, description = "Account closed")))]
pub async fn delete_me(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), JsonApiError> {
    if claims.role == Role::Admin {
        return Err(JsonApiError::forbidden("the admin account cannot be closed"));
    }
    user_service::soft_delete_user(&state.db, claims.uid).await?;
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}
