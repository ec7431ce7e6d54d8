use chrono::{DateTime, NaiveDate, Utc};
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

/// `service_type` is one of `hotel`, `store`, `pharmacy`, `bus`.
#[derive(ToSchema)]
pub struct OnboardRequest {
    pub business_name: String,
    pub service_type: String,
    pub owner_email: String,
    pub owner_name: String,
    pub password: String,
}

/// `tier` is one of `basic`, `premium`, `enterprise`.
#[derive(ToSchema)]
pub struct ChangePlanRequest { pub tier: String, pub payment_token: Option<String> }

#[derive(ToSchema)]
pub struct NewStaffRequest { pub name: String, pub email: String, pub position: String }

#[derive(ToSchema)]
pub struct NewRoomRequest {
    pub number: String,
    pub room_type: String,
    pub price_per_night_cents: i64,
    pub capacity: i32,
}

#[derive(ToSchema)]
pub struct RoomPatchRequest {
    pub room_type: Option<String>,
    pub price_per_night_cents: Option<i64>,
    pub capacity: Option<i32>,
    /// `available` or `maintenance`
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct NewBookingRequest {
    pub room_id: Uuid,
    pub guest_name: String,
    pub customer_id: Option<Uuid>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(ToSchema)]
pub struct BookingStatusRequest { pub status: String }

#[derive(ToSchema)]
pub struct NewItemRequest {
    pub sku: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub batch_no: Option<String>,
}

#[derive(ToSchema)]
pub struct ItemPatchRequest {
    pub name: Option<String>,
    pub unit_price_cents: Option<i64>,
    pub stock_delta: Option<i32>,
    pub reorder_level: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub batch_no: Option<String>,
}

#[derive(ToSchema)]
pub struct NewSaleRequest { pub item_id: Uuid, pub quantity: i32, pub customer_id: Option<Uuid> }

#[derive(ToSchema)]
pub struct NewBusRequest { pub registration: String, pub name: String, pub capacity: i32 }

#[derive(ToSchema)]
pub struct NewTripRequest {
    pub bus_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departs_at: DateTime<Utc>,
    pub arrives_at: DateTime<Utc>,
    pub fare_cents: i64,
}

#[derive(ToSchema)]
pub struct NewTicketRequest { pub trip_id: Uuid, pub passenger_name: String, pub seat_no: i32, pub customer_id: Option<Uuid> }

/// `status` is one of `active`, `suspended`.
#[derive(ToSchema)]
pub struct VendorStatusRequest { pub status: String }

/// `status` is `succeeded` or `failed`.
#[derive(ToSchema)]
pub struct SettlementRequest { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::public::health,
        crate::routes::public::list_plans,
        crate::routes::public::onboard,
        crate::routes::public::catalog_vendors,
        crate::routes::public::catalog_vendor,
        crate::routes::public::catalog_rooms,
        crate::routes::public::catalog_items,
        crate::routes::public::catalog_trips,
        crate::routes::public::catalog_seat_map,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::delete_me,
        crate::routes::vendor::get_subscription,
        crate::routes::vendor::change_plan,
        crate::routes::vendor::cancel_subscription,
        crate::routes::vendor::list_payments,
        crate::routes::vendor::list_staff,
        crate::routes::vendor::add_staff,
        crate::routes::vendor::remove_staff,
        crate::routes::vendor::dashboard,
        crate::routes::hotel::list_rooms,
        crate::routes::hotel::available_rooms,
        crate::routes::hotel::create_room,
        crate::routes::hotel::update_room,
        crate::routes::hotel::delete_room,
        crate::routes::hotel::list_bookings,
        crate::routes::hotel::create_booking,
        crate::routes::hotel::get_booking,
        crate::routes::hotel::set_booking_status,
        crate::routes::inventory::list_items,
        crate::routes::inventory::create_item,
        crate::routes::inventory::get_item,
        crate::routes::inventory::update_item,
        crate::routes::inventory::delete_item,
        crate::routes::inventory::list_sales,
        crate::routes::inventory::record_sale,
        crate::routes::transport::list_buses,
        crate::routes::transport::create_bus,
        crate::routes::transport::delete_bus,
        crate::routes::transport::list_trips,
        crate::routes::transport::create_trip,
        crate::routes::transport::get_trip,
        crate::routes::transport::seat_map,
        crate::routes::transport::list_tickets,
        crate::routes::transport::issue_ticket,
        crate::routes::transport::cancel_ticket,
        crate::routes::customer::create_booking,
        crate::routes::customer::list_bookings,
        crate::routes::customer::cancel_booking,
        crate::routes::customer::buy_ticket,
        crate::routes::customer::list_tickets,
        crate::routes::customer::cancel_ticket,
        crate::routes::admin::list_vendors,
        crate::routes::admin::get_vendor,
        crate::routes::admin::set_vendor_status,
        crate::routes::admin::list_payments,
        crate::routes::admin::settle_payment,
        crate::routes::admin::dashboard,
        crate::routes::admin::renew_due,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            OnboardRequest,
            ChangePlanRequest,
            NewStaffRequest,
            NewRoomRequest,
            RoomPatchRequest,
            NewBookingRequest,
            BookingStatusRequest,
            NewItemRequest,
            ItemPatchRequest,
            NewSaleRequest,
            NewBusRequest,
            NewTripRequest,
            NewTicketRequest,
            VendorStatusRequest,
            SettlementRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "vendors", description = "Business onboarding"),
        (name = "catalog", description = "Public listings for customers"),
        (name = "billing"),
        (name = "vendor"),
        (name = "hotel"),
        (name = "inventory", description = "Store and pharmacy stock"),
        (name = "transport"),
        (name = "customer"),
        (name = "admin"),
        (name = "dashboard")
    )
)]
pub struct ApiDoc;
