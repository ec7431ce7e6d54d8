use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use models::{
    booking, bus, inventory_item, payment, room, sale, subscription, ticket, trip, vendor, BookingStatus, PaymentStatus,
    PlanTier, RoomStatus, ServiceType, SubscriptionStatus, TicketStatus, VendorStatus,
};

use crate::inventory::{expires_within, is_low_stock};

pub const TOP_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    pub amount_cents: i64,
}

/// Share of `part` in `whole` as a percentage rounded to 2 decimals; 0 when
/// `whole` is 0.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 10_000.0 / whole as f64).round() / 100.0
}

fn month_index(d: NaiveDate) -> i64 {
    d.year() as i64 * 12 + d.month0() as i64
}

/// Sum amounts per calendar month over the `months` months ending with the
/// month of `today`. Oldest first, zero-filled; older or future entries are
/// dropped.
pub fn monthly_series<I>(entries: I, today: NaiveDate, months: u32) -> Vec<MonthlyPoint>
where
    I: IntoIterator<Item = (NaiveDate, i64)>,
{
    let months = months.max(1) as i64;
    let last = month_index(today);
    let first = last - months + 1;
    let mut sums = vec![0i64; months as usize];
    for (date, amount) in entries {
        let idx = month_index(date);
        if (first..=last).contains(&idx) {
            sums[(idx - first) as usize] += amount;
        }
    }
    sums.into_iter()
        .enumerate()
        .map(|(i, amount_cents)| {
            let idx = first + i as i64;
            MonthlyPoint { month: format!("{:04}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1), amount_cents }
        })
        .collect()
}

fn zeroed<'a>(keys: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, u64> {
    keys.into_iter().map(|k| (k.to_string(), 0)).collect()
}

fn utc_date(ts: &sea_orm::prelude::DateTimeWithTimeZone) -> NaiveDate {
    ts.with_timezone(&Utc).date_naive()
}

#[derive(Debug, Clone, Serialize)]
pub struct HotelSummary {
    pub total_rooms: u64,
    pub available_rooms: u64,
    pub maintenance_rooms: u64,
    pub occupied_today: u64,
    pub occupancy_rate: f64,
    pub bookings_by_status: BTreeMap<String, u64>,
    pub check_ins_today: u64,
    pub revenue_cents: i64,
    pub monthly_revenue: Vec<MonthlyPoint>,
}

pub fn hotel_summary(rooms: &[room::Model], bookings: &[booking::Model], today: NaiveDate, months: u32) -> HotelSummary {
    let total_rooms = rooms.len() as u64;
    let available_rooms = rooms.iter().filter(|r| r.status == RoomStatus::Available.as_str()).count() as u64;

    let mut bookings_by_status = zeroed(BookingStatus::ALL.iter().map(|s| s.as_str()));
    let mut occupied: Vec<Uuid> = Vec::new();
    let mut revenue_cents = 0;
    let mut check_ins_today = 0;
    let mut billable = Vec::new();
    for b in bookings {
        *bookings_by_status.entry(b.status.clone()).or_insert(0) += 1;
        let Ok(status) = b.status() else { continue };
        if !status.is_billable() {
            continue;
        }
        revenue_cents += b.total_cents;
        billable.push((b.check_in, b.total_cents));
        if status == BookingStatus::Confirmed && b.check_in <= today && today < b.check_out && !occupied.contains(&b.room_id) {
            occupied.push(b.room_id);
        }
        if status == BookingStatus::Confirmed && b.check_in == today {
            check_ins_today += 1;
        }
    }
    let occupied_today = occupied.len() as u64;

    HotelSummary {
        total_rooms,
        available_rooms,
        maintenance_rooms: total_rooms - available_rooms,
        occupied_today,
        occupancy_rate: percent(occupied_today, total_rooms),
        bookings_by_status,
        check_ins_today,
        revenue_cents,
        monthly_revenue: monthly_series(billable, today, months),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopItem {
    pub item_id: Uuid,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub service_type: ServiceType,
    pub item_count: u64,
    pub units_in_stock: i64,
    pub stock_value_cents: i64,
    pub low_stock: u64,
    pub out_of_stock: u64,
    pub expiring_soon: u64,
    pub expired: u64,
    pub sales_count: u64,
    pub units_sold: i64,
    pub revenue_cents: i64,
    pub top_items: Vec<TopItem>,
    pub monthly_revenue: Vec<MonthlyPoint>,
}

pub fn inventory_summary(
    service_type: ServiceType,
    items: &[inventory_item::Model],
    sales: &[sale::Model],
    today: NaiveDate,
    months: u32,
    expiry_window_days: i64,
) -> InventorySummary {
    let mut per_item: HashMap<Uuid, (i64, i64)> = HashMap::new();
    for s in sales {
        let e = per_item.entry(s.item_id).or_insert((0, 0));
        e.0 += s.quantity as i64;
        e.1 += s.total_cents;
    }
    let names: HashMap<Uuid, &str> = items.iter().map(|i| (i.id, i.name.as_str())).collect();
    let mut top_items: Vec<TopItem> = per_item
        .into_iter()
        .map(|(item_id, (units_sold, revenue_cents))| TopItem {
            item_id,
            name: names.get(&item_id).map(|n| n.to_string()).unwrap_or_default(),
            units_sold,
            revenue_cents,
        })
        .collect();
    top_items.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents).then_with(|| a.name.cmp(&b.name)));
    top_items.truncate(TOP_ITEMS);

    InventorySummary {
        service_type,
        item_count: items.len() as u64,
        units_in_stock: items.iter().map(|i| i.quantity as i64).sum(),
        stock_value_cents: items.iter().map(|i| i.quantity as i64 * i.unit_price_cents).sum(),
        low_stock: items.iter().filter(|i| is_low_stock(i)).count() as u64,
        out_of_stock: items.iter().filter(|i| i.quantity == 0).count() as u64,
        expiring_soon: items.iter().filter(|i| expires_within(i, today, expiry_window_days)).count() as u64,
        expired: items.iter().filter(|i| i.is_expired(today)).count() as u64,
        sales_count: sales.len() as u64,
        units_sold: sales.iter().map(|s| s.quantity as i64).sum(),
        revenue_cents: sales.iter().map(|s| s.total_cents).sum(),
        top_items,
        monthly_revenue: monthly_series(sales.iter().map(|s| (utc_date(&s.created_at), s.total_cents)), today, months),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransportSummary {
    pub buses: u64,
    pub fleet_seats: u64,
    pub trips: u64,
    pub upcoming_trips: u64,
    pub tickets_issued: u64,
    pub tickets_cancelled: u64,
    /// Issued tickets over seats offered across all trips.
    pub seat_occupancy_rate: f64,
    pub revenue_cents: i64,
    pub monthly_revenue: Vec<MonthlyPoint>,
}

pub fn transport_summary(
    buses: &[bus::Model],
    trips: &[trip::Model],
    tickets: &[ticket::Model],
    now: DateTime<Utc>,
    months: u32,
) -> TransportSummary {
    let capacity: HashMap<Uuid, u64> = buses.iter().map(|b| (b.id, b.capacity.max(0) as u64)).collect();
    let seats_offered: u64 = trips.iter().map(|t| capacity.get(&t.bus_id).copied().unwrap_or(0)).sum();
    let issued: Vec<&ticket::Model> = tickets.iter().filter(|t| t.status == TicketStatus::Issued.as_str()).collect();
    let tickets_issued = issued.len() as u64;

    TransportSummary {
        buses: buses.len() as u64,
        fleet_seats: capacity.values().sum(),
        trips: trips.len() as u64,
        upcoming_trips: trips.iter().filter(|t| t.departs_at.with_timezone(&Utc) > now).count() as u64,
        tickets_issued,
        tickets_cancelled: tickets.len() as u64 - tickets_issued,
        seat_occupancy_rate: percent(tickets_issued, seats_offered),
        revenue_cents: issued.iter().map(|t| t.fare_cents).sum(),
        monthly_revenue: monthly_series(issued.iter().map(|t| (utc_date(&t.created_at), t.fare_cents)), now.date_naive(), months),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformSummary {
    pub vendors_total: u64,
    pub vendors_active: u64,
    pub vendors_by_type: BTreeMap<String, u64>,
    pub subscriptions_by_tier: BTreeMap<String, u64>,
    pub subscriptions_by_status: BTreeMap<String, u64>,
    /// Succeeded subscription payments.
    pub subscription_revenue_cents: i64,
    pub failed_payments: u64,
    pub monthly_revenue: Vec<MonthlyPoint>,
}

pub fn platform_summary(
    vendors: &[vendor::Model],
    subscriptions: &[subscription::Model],
    payments: &[payment::Model],
    now: DateTime<Utc>,
    months: u32,
) -> PlatformSummary {
    let mut vendors_by_type = zeroed(ServiceType::ALL.iter().map(|t| t.as_str()));
    for v in vendors {
        *vendors_by_type.entry(v.service_type.clone()).or_insert(0) += 1;
    }
    let mut subscriptions_by_tier = zeroed(PlanTier::ALL.iter().map(|t| t.as_str()));
    let mut subscriptions_by_status = zeroed(SubscriptionStatus::ALL.iter().map(|s| s.as_str()));
    for s in subscriptions {
        *subscriptions_by_tier.entry(s.tier.clone()).or_insert(0) += 1;
        *subscriptions_by_status.entry(s.status.clone()).or_insert(0) += 1;
    }
    let succeeded: Vec<&payment::Model> = payments.iter().filter(|p| p.status == PaymentStatus::Succeeded.as_str()).collect();

    PlatformSummary {
        vendors_total: vendors.len() as u64,
        vendors_active: vendors.iter().filter(|v| v.status == VendorStatus::Active.as_str()).count() as u64,
        vendors_by_type,
        subscriptions_by_tier,
        subscriptions_by_status,
        subscription_revenue_cents: succeeded.iter().map(|p| p.amount_cents).sum(),
        failed_payments: payments.iter().filter(|p| p.status == PaymentStatus::Failed.as_str()).count() as u64,
        monthly_revenue: monthly_series(succeeded.iter().map(|p| (utc_date(&p.created_at), p.amount_cents)), now.date_naive(), months),
    }
}

/// Vendor dashboard, shaped by service type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardView {
    Hotel(HotelSummary),
    Inventory(InventorySummary),
    Transport(TransportSummary),
}
