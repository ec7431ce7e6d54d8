//! End-to-end flows over the full router against Postgres. Skipped when
//! `SKIP_DB_TESTS` is set or the database is unreachable.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use migration::MigratorTrait;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

use configs::AppConfig;
use server::routes::{self, auth::ServerState};

const PASSWORD: &str = "Sup3rSecret!";

static MIGRATED: OnceCell<bool> = OnceCell::const_new();

async fn build_app() -> Option<(Router, ServerState)> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    // One migration run per test binary, on a throwaway connection.
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = models::db::connect().await else {
                eprintln!("database unreachable; skipping e2e");
                return false;
            };
            migration::Migrator::up(&db, None).await.is_ok()
        })
        .await;
    if !migrated {
        return None;
    }
    let db = models::db::connect().await.ok()?;
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "e2e-secret".into();
    let state = ServerState::new(db, &cfg).ok()?;
    let app = routes::build_router(state.clone(), tower_http::cors::CorsLayer::very_permissive());
    Some((app, state))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => b.header(header::CONTENT_TYPE, "application/json").body(Body::from(v.to_string())),
        None => b.body(Body::empty()),
    }
    .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn email(prefix: &str) -> String {
    format!("{prefix}_{}@example.com", Uuid::new_v4().simple())
}

async fn login(app: &Router, email: &str) -> (StatusCode, Value) {
    send(app, Method::POST, "/auth/login", None, Some(json!({ "email": email, "password": PASSWORD }))).await
}

async fn onboard(app: &Router, service_type: &str) -> (Uuid, String) {
    let owner = email(service_type);
    let (status, body) = send(
        app,
        Method::POST,
        "/vendors/onboard",
        None,
        Some(json!({
            "business_name": format!("E2E {service_type}"),
            "service_type": service_type,
            "owner_email": owner,
            "owner_name": "Owner",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["subscription"]["tier"], "basic");
    let vendor_id = body["vendor"]["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = login(app, &owner).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["dashboard_path"], format!("/dashboard/{service_type}"));
    (vendor_id, body["token"].as_str().unwrap().to_string())
}

async fn customer(app: &Router) -> (Uuid, String) {
    let mail = email("guest");
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": mail, "name": "Guest", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_str().unwrap().parse().unwrap();
    let (_, body) = login(app, &mail).await;
    (id, body["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn hotel_rooms_bookings_and_dashboard() {
    let Some((app, _)) = build_app().await else { return };
    let (vendor_id, vendor) = onboard(&app, "hotel").await;

    let (status, room) = send(
        &app,
        Method::POST,
        "/vendor/rooms",
        Some(&vendor),
        Some(json!({ "number": "101", "room_type": "double", "price_per_night_cents": 8000, "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{room}");
    let room_id = room["id"].as_str().unwrap().to_string();

    let today = Utc::now().date_naive();
    let (status, booking) = send(
        &app,
        Method::POST,
        "/vendor/bookings",
        Some(&vendor),
        Some(json!({
            "room_id": room_id,
            "guest_name": "Walk In",
            "check_in": today + Duration::days(10),
            "check_out": today + Duration::days(12),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");
    assert_eq!(booking["total_cents"], 16000);

    // Same nights from a customer collide.
    let (_, guest) = customer(&app).await;
    let overlap = json!({
        "room_id": room_id,
        "guest_name": "Guest",
        "check_in": today + Duration::days(11),
        "check_out": today + Duration::days(13),
    });
    let (status, _) = send(&app, Method::POST, "/customer/bookings", Some(&guest), Some(overlap)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let back_to_back = json!({
        "room_id": room_id,
        "guest_name": "Guest",
        "check_in": today + Duration::days(12),
        "check_out": today + Duration::days(14),
    });
    let (status, mine) = send(&app, Method::POST, "/customer/bookings", Some(&guest), Some(back_to_back)).await;
    assert_eq!(status, StatusCode::CREATED, "{mine}");
    let (_, list) = send(&app, Method::GET, "/customer/bookings", Some(&guest), None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, dash) = send(&app, Method::GET, "/vendor/dashboard", Some(&vendor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["kind"], "hotel");
    assert_eq!(dash["total_rooms"], 1);
    assert_eq!(dash["bookings_by_status"]["confirmed"], 2);

    // Hotel owners cannot reach inventory endpoints.
    let (status, _) = send(&app, Method::GET, "/vendor/items", Some(&vendor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, rooms) = send(&app, Method::GET, &format!("/catalog/vendors/{vendor_id}/rooms"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn pharmacy_stock_and_sales() {
    let Some((app, _)) = build_app().await else { return };
    let (_, vendor) = onboard(&app, "pharmacy").await;

    let (status, item) = send(
        &app,
        Method::POST,
        "/vendor/items",
        Some(&vendor),
        Some(json!({
            "sku": "AMOX-500",
            "name": "Amoxicillin 500mg",
            "unit_price_cents": 450,
            "quantity": 3,
            "reorder_level": 5,
            "expiry_date": Utc::now().date_naive() + Duration::days(20),
            "batch_no": "B-17",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{item}");
    let item_id = item["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/vendor/sales", Some(&vendor), Some(json!({ "item_id": item_id, "quantity": 4 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, sale) = send(&app, Method::POST, "/vendor/sales", Some(&vendor), Some(json!({ "item_id": item_id, "quantity": 2 }))).await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["total_cents"], 900);

    let (_, low) = send(&app, Method::GET, "/vendor/items?low_stock=true", Some(&vendor), None).await;
    assert_eq!(low.as_array().map(Vec::len), Some(1));

    let (status, dash) = send(&app, Method::GET, "/vendor/dashboard", Some(&vendor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["kind"], "inventory");
    assert_eq!(dash["low_stock"], 1);
    assert_eq!(dash["expiring_soon"], 1);
}

#[tokio::test]
async fn bus_trip_seats_and_tickets() {
    let Some((app, _)) = build_app().await else { return };
    let (vendor_id, vendor) = onboard(&app, "bus").await;

    let reg = format!("KCX {}", &Uuid::new_v4().simple().to_string()[..4]);
    let (status, bus) = send(
        &app,
        Method::POST,
        "/vendor/buses",
        Some(&vendor),
        Some(json!({ "registration": reg, "name": "Coast Express", "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{bus}");

    let departs = Utc::now() + Duration::days(3);
    let (status, trip) = send(
        &app,
        Method::POST,
        "/vendor/trips",
        Some(&vendor),
        Some(json!({
            "bus_id": bus["id"],
            "origin": "Nairobi",
            "destination": "Mombasa",
            "departs_at": departs,
            "arrives_at": departs + Duration::hours(8),
            "fare_cents": 1500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{trip}");
    let trip_id = trip["id"].as_str().unwrap().to_string();

    let (_, guest) = customer(&app).await;
    let ticket = |seat: i32| json!({ "trip_id": trip_id, "passenger_name": "Rider", "seat_no": seat });
    let (status, t1) = send(&app, Method::POST, "/customer/tickets", Some(&guest), Some(ticket(1))).await;
    assert_eq!(status, StatusCode::CREATED, "{t1}");
    let (status, _) = send(&app, Method::POST, "/vendor/tickets", Some(&vendor), Some(ticket(1))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, Method::POST, "/vendor/tickets", Some(&vendor), Some(ticket(3))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, seats) = send(&app, Method::GET, &format!("/catalog/trips/{trip_id}/seats"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seats["taken"], json!([1]));

    let (status, trips) = send(&app, Method::GET, &format!("/catalog/vendors/{vendor_id}/trips"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trips.as_array().map(Vec::len), Some(1));

    let t1_id = t1["id"].as_str().unwrap();
    let (status, cancelled) = send(&app, Method::POST, &format!("/customer/tickets/{t1_id}/cancel"), Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
}

#[tokio::test]
async fn admin_suspends_vendor() {
    let Some((app, state)) = build_app().await else { return };
    let admin_email = email("admin");
    if state.auth.ensure_admin(&admin_email, PASSWORD).await.is_err() {
        return;
    }
    let (_, body) = login(&app, &admin_email).await;
    let admin = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["dashboard_path"], "/dashboard/admin");

    let (vendor_id, vendor) = onboard(&app, "store").await;
    let (status, v) = send(
        &app,
        Method::PUT,
        &format!("/admin/vendors/{vendor_id}/status"),
        Some(&admin),
        Some(json!({ "status": "suspended" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{v}");
    assert_eq!(v["status"], "suspended");

    // Existing tokens stop working for vendor endpoints.
    let (status, _) = send(&app, Method::GET, "/vendor/items", Some(&vendor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, platform) = send(&app, Method::GET, "/admin/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let before = platform["vendors_total"].as_u64().unwrap_or_default();
    assert!(before >= 1);

    // A new business shows up without waiting for the cache to expire.
    onboard(&app, "bus").await;
    let (_, platform) = send(&app, Method::GET, "/admin/dashboard", Some(&admin), None).await;
    assert!(platform["vendors_total"].as_u64().unwrap_or_default() > before);

    let (status, _) = send(&app, Method::DELETE, "/auth/me", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

async fn register(app: &Router, mail: &str) -> StatusCode {
    let body = json!({ "email": mail, "name": "Guest", "password": PASSWORD });
    send(app, Method::POST, "/auth/register", None, Some(body)).await.0
}

#[tokio::test]
async fn closed_account_is_locked_out_and_email_reusable() {
    let Some((app, _)) = build_app().await else { return };
    let mail = email("closer");
    assert_eq!(register(&app, &mail).await, StatusCode::CREATED);
    let (_, body) = login(&app, &mail).await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::DELETE, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/customer/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
    let (status, _) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, &mail).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The address is free again, once.
    assert_eq!(register(&app, &mail).await, StatusCode::CREATED);
    assert_eq!(register(&app, &mail).await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn racing_signups_get_one_account() {
    let Some((app, _)) = build_app().await else { return };
    let mail = email("race");
    let (a, b) = tokio::join!(register(&app, &mail), register(&app, &mail));
    let mut got = [a.as_u16(), b.as_u16()];
    got.sort_unstable();
    assert_eq!(got, [201, 409]);
}

#[tokio::test]
async fn closed_owner_email_can_onboard_again() {
    let Some((app, _)) = build_app().await else { return };
    let owner = email("owner");
    let form = |name: &str| {
        json!({
            "business_name": name,
            "service_type": "store",
            "owner_email": owner,
            "owner_name": "Owner",
            "password": PASSWORD,
        })
    };
    let (status, body) = send(&app, Method::POST, "/vendors/onboard", None, Some(form("First Shop"))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let (status, _) = send(&app, Method::POST, "/vendors/onboard", None, Some(form("Copy Shop"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = login(&app, &owner).await;
    let token = body["token"].as_str().unwrap().to_string();
    let (status, _) = send(&app, Method::DELETE, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::POST, "/vendors/onboard", None, Some(form("Second Shop"))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}
