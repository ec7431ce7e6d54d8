pub mod admin;
pub mod auth;
pub mod customer;
pub mod hotel;
pub mod inventory;
pub mod public;
pub mod transport;
pub mod vendor;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::metrics::{status_class, HTTP_REQUESTS_TOTAL};

use crate::openapi::ApiDoc;
use auth::ServerState;

async fn count_requests(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    HTTP_REQUESTS_TOTAL.with_label_values(&[status_class(res.status().as_u16())]).inc();
    res
}

fn vendor_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/vendor/subscription", get(vendor::get_subscription))
        .route("/vendor/subscription/upgrade", post(vendor::change_plan))
        .route("/vendor/subscription/cancel", post(vendor::cancel_subscription))
        .route("/vendor/payments", get(vendor::list_payments))
        .route("/vendor/staff", get(vendor::list_staff).post(vendor::add_staff))
        .route("/vendor/staff/:id", delete(vendor::remove_staff))
        .route("/vendor/dashboard", get(vendor::dashboard))
        // hotel
        .route("/vendor/rooms", get(hotel::list_rooms).post(hotel::create_room))
        .route("/vendor/rooms/available", get(hotel::available_rooms))
        .route("/vendor/rooms/:id", put(hotel::update_room).delete(hotel::delete_room))
        .route("/vendor/bookings", get(hotel::list_bookings).post(hotel::create_booking))
        .route("/vendor/bookings/:id", get(hotel::get_booking))
        .route("/vendor/bookings/:id/status", put(hotel::set_booking_status))
        // store and pharmacy
        .route("/vendor/items", get(inventory::list_items).post(inventory::create_item))
        .route(
            "/vendor/items/:id",
            get(inventory::get_item).put(inventory::update_item).delete(inventory::delete_item),
        )
        .route("/vendor/sales", get(inventory::list_sales).post(inventory::record_sale))
        // bus
        .route("/vendor/buses", get(transport::list_buses).post(transport::create_bus))
        .route("/vendor/buses/:id", delete(transport::delete_bus))
        .route("/vendor/trips", get(transport::list_trips).post(transport::create_trip))
        .route("/vendor/trips/:id", get(transport::get_trip))
        .route("/vendor/trips/:id/seats", get(transport::seat_map))
        .route("/vendor/tickets", get(transport::list_tickets).post(transport::issue_ticket))
        .route("/vendor/tickets/:id/cancel", post(transport::cancel_ticket))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_vendor))
}

fn customer_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/customer/bookings", get(customer::list_bookings).post(customer::create_booking))
        .route("/customer/bookings/:id/cancel", post(customer::cancel_booking))
        .route("/customer/tickets", get(customer::list_tickets).post(customer::buy_ticket))
        .route("/customer/tickets/:id/cancel", post(customer::cancel_ticket))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_customer))
}

fn admin_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/admin/vendors", get(admin::list_vendors))
        .route("/admin/vendors/:id", get(admin::get_vendor))
        .route("/admin/vendors/:id/status", put(admin::set_vendor_status))
        .route("/admin/payments", get(admin::list_payments))
        .route("/admin/payments/:id/settle", post(admin::settle_payment))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/billing/renew", post(admin::renew_due))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin))
}

/// Build the full application router: public catalog and auth, then the
/// token-guarded vendor, customer and admin areas.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(public::health))
        .route("/plans", get(public::list_plans))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/vendors/onboard", post(public::onboard))
        .route("/catalog/vendors", get(public::catalog_vendors))
        .route("/catalog/vendors/:id", get(public::catalog_vendor))
        .route("/catalog/vendors/:id/rooms", get(public::catalog_rooms))
        .route("/catalog/vendors/:id/items", get(public::catalog_items))
        .route("/catalog/vendors/:id/trips", get(public::catalog_trips))
        .route("/catalog/trips/:id/seats", get(public::catalog_seat_map));

    let protected = Router::new()
        .route("/auth/me", get(auth::me).delete(auth::delete_me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_account))
        .merge(vendor_routes(&state))
        .merge(customer_routes(&state))
        .merge(admin_routes(&state))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    let docs = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    public
        .merge(protected)
        .merge(docs)
        .with_state(state)
        .layer(middleware::from_fn(count_requests))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one span per request carrying method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
