//! Router-level checks that never reach the database: public endpoints, the
//! bearer middleware and the role guards.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use configs::AppConfig;
use models::Role;
use server::routes::{self, auth::ServerState};
use service::auth::domain::AuthUser;

fn config(ttl_hours: i64) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "router-test-secret".into();
    cfg.auth.token_ttl_hours = ttl_hours;
    cfg
}

fn app_with(cfg: &AppConfig) -> anyhow::Result<(Router, ServerState)> {
    let state = ServerState::new(DatabaseConnection::Disconnected, cfg)?;
    let app = routes::build_router(state.clone(), tower_http::cors::CorsLayer::very_permissive());
    Ok((app, state))
}

fn token_for(state: &ServerState, role: Role) -> anyhow::Result<String> {
    let user = AuthUser {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", Uuid::new_v4()),
        name: "Router Test".into(),
        role,
        vendor_id: (role == Role::Vendor).then(Uuid::new_v4),
    };
    Ok(state.auth.issue_token(&user)?.0)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    b.body(Body::empty()).unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn health_and_plans_are_public() -> anyhow::Result<()> {
    let (app, _) = app_with(&config(1))?;

    let res = app.clone().oneshot(get("/health", None)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["status"], "ok");

    let res = app.oneshot(get("/plans", None)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let plans = json_body(res).await;
    let tiers: Vec<&str> = plans.as_array().unwrap().iter().filter_map(|p| p["tier"].as_str()).collect();
    assert_eq!(tiers, ["basic", "premium", "enterprise"]);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let (app, _) = app_with(&config(1))?;
    let res = app.oneshot(get("/api-docs/openapi.json", None)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let doc = json_body(res).await;
    assert!(doc["paths"]["/vendor/dashboard"].is_object());
    Ok(())
}

#[tokio::test]
async fn missing_token_is_bad_request() -> anyhow::Result<()> {
    let (app, _) = app_with(&config(1))?;
    let res = app.oneshot(get("/auth/me", None)).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "Missing Token");
    Ok(())
}

#[tokio::test]
async fn garbage_and_malformed_tokens_are_unauthorized() -> anyhow::Result<()> {
    let (app, _) = app_with(&config(1))?;
    let res = app.clone().oneshot(get("/vendor/dashboard", Some("not-a-jwt"))).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/vendor/dashboard")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())?;
    assert_eq!(app.oneshot(req).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> anyhow::Result<()> {
    let (app, state) = app_with(&config(-2))?;
    let token = token_for(&state, Role::Customer)?;
    let res = app.oneshot(get("/customer/bookings", Some(&token))).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() -> anyhow::Result<()> {
    let (app, _) = app_with(&config(1))?;
    let mut other = config(1);
    other.auth.jwt_secret = "someone-else".into();
    let (_, foreign) = app_with(&other)?;
    let token = token_for(&foreign, Role::Admin)?;
    let res = app.oneshot(get("/admin/dashboard", Some(&token))).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn role_guards_reject_other_roles() -> anyhow::Result<()> {
    let (app, state) = app_with(&config(1))?;
    let customer = token_for(&state, Role::Customer)?;
    let vendor = token_for(&state, Role::Vendor)?;
    let admin = token_for(&state, Role::Admin)?;

    let cases = [
        ("/vendor/dashboard", &customer),
        ("/vendor/rooms", &admin),
        ("/customer/tickets", &vendor),
        ("/admin/vendors", &vendor),
        ("/admin/dashboard", &customer),
    ];
    for (uri, token) in cases {
        let res = app.clone().oneshot(get(uri, Some(token))).await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(json_body(res).await["error"], "Forbidden");
    }
    Ok(())
}

#[tokio::test]
async fn token_is_read_from_cookie() -> anyhow::Result<()> {
    let (app, state) = app_with(&config(1))?;
    let customer = token_for(&state, Role::Customer)?;
    let req = Request::builder()
        .uri("/vendor/dashboard")
        .header(header::COOKIE, format!("auth_token={customer}"))
        .body(Body::empty())?;
    // Authenticated through the cookie, then stopped by the vendor guard.
    assert_eq!(app.oneshot(req).await?.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> anyhow::Result<()> {
    let (app, _) = app_with(&config(1))?;
    let req = Request::builder().method("POST").uri("/auth/logout").body(Body::empty())?;
    let res = app.oneshot(req).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cookie = res.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cookie.starts_with("auth_token="));
    Ok(())
}

#[tokio::test]
async fn half_open_stay_query_is_rejected_before_lookup() -> anyhow::Result<()> {
    let (app, _) = app_with(&config(1))?;
    let uri = format!("/catalog/vendors/{}/rooms?check_in=2026-05-10", Uuid::new_v4());
    let res = app.oneshot(get(&uri, None)).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
