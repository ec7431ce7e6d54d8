use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, instrument};
use uuid::Uuid;

use common::metrics::DASHBOARD_CACHE_TOTAL;
use configs::DashboardConfig;
use models::{booking, bus, inventory_item, payment, room, sale, subscription, ticket, trip, vendor, ServiceType};

use super::aggregate::{
    hotel_summary, inventory_summary, platform_summary, transport_summary, DashboardView, PlatformSummary,
};
use crate::errors::ServiceError;

const MAX_CACHED_VENDORS: u64 = 10_000;

/// Loads rows for a dashboard and keeps the result for `cache_ttl_secs`.
#[derive(Clone)]
pub struct DashboardService {
    db: DatabaseConnection,
    cfg: DashboardConfig,
    vendors: Cache<Uuid, Arc<DashboardView>>,
    platform: Cache<(), Arc<PlatformSummary>>,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection, cfg: DashboardConfig) -> Self {
        let ttl = Duration::from_secs(cfg.cache_ttl_secs);
        let vendors = Cache::builder().max_capacity(MAX_CACHED_VENDORS).time_to_live(ttl).build();
        let platform = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { db, cfg, vendors, platform }
    }

    /// Dashboard for the vendor's service type, served from cache when fresh.
    #[instrument(skip(self, v), fields(vendor_id = %v.id))]
    pub async fn vendor_dashboard(&self, v: &vendor::Model, now: DateTime<Utc>) -> Result<Arc<DashboardView>, ServiceError> {
        if let Some(hit) = self.vendors.get(&v.id).await {
            DASHBOARD_CACHE_TOTAL.with_label_values(&["hit"]).inc();
            return Ok(hit);
        }
        DASHBOARD_CACHE_TOTAL.with_label_values(&["miss"]).inc();
        let view = Arc::new(self.compute_vendor(v, now).await?);
        self.vendors.insert(v.id, view.clone()).await;
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn platform_dashboard(&self, now: DateTime<Utc>) -> Result<Arc<PlatformSummary>, ServiceError> {
        if let Some(hit) = self.platform.get(&()).await {
            DASHBOARD_CACHE_TOTAL.with_label_values(&["hit"]).inc();
            return Ok(hit);
        }
        DASHBOARD_CACHE_TOTAL.with_label_values(&["miss"]).inc();
        let vendors = vendor::Entity::find().all(&self.db).await?;
        let subscriptions = subscription::Entity::find().all(&self.db).await?;
        let payments = payment::Entity::find().all(&self.db).await?;
        let summary = Arc::new(platform_summary(&vendors, &subscriptions, &payments, now, self.cfg.revenue_months));
        self.platform.insert((), summary.clone()).await;
        Ok(summary)
    }

    /// Drop cached results touched by a write on this vendor's data.
    pub async fn invalidate(&self, vendor_id: Uuid) {
        debug!(%vendor_id, "dashboard_invalidated");
        self.vendors.invalidate(&vendor_id).await;
        self.platform.invalidate(&()).await;
    }

    pub fn invalidate_all(&self) {
        debug!("dashboard_cache_cleared");
        self.vendors.invalidate_all();
        self.platform.invalidate_all();
    }

    async fn compute_vendor(&self, v: &vendor::Model, now: DateTime<Utc>) -> Result<DashboardView, ServiceError> {
        let db = &self.db;
        let months = self.cfg.revenue_months;
        let today = now.date_naive();
        let view = match v.service_type()? {
            ServiceType::Hotel => {
                let rooms = room::Entity::find().filter(room::Column::VendorId.eq(v.id)).all(db).await?;
                let bookings = booking::Entity::find().filter(booking::Column::VendorId.eq(v.id)).all(db).await?;
                DashboardView::Hotel(hotel_summary(&rooms, &bookings, today, months))
            }
            st @ (ServiceType::Store | ServiceType::Pharmacy) => {
                let items = inventory_item::Entity::find()
                    .filter(inventory_item::Column::VendorId.eq(v.id))
                    .all(db)
                    .await?;
                let sales = sale::Entity::find().filter(sale::Column::VendorId.eq(v.id)).all(db).await?;
                DashboardView::Inventory(inventory_summary(st, &items, &sales, today, months, self.cfg.expiry_window_days))
            }
            ServiceType::Bus => {
                let buses = bus::Entity::find().filter(bus::Column::VendorId.eq(v.id)).all(db).await?;
                let trips = trip::Entity::find().filter(trip::Column::VendorId.eq(v.id)).all(db).await?;
                let tickets = ticket::Entity::find().filter(ticket::Column::VendorId.eq(v.id)).all(db).await?;
                DashboardView::Transport(transport_summary(&buses, &trips, &tickets, now, months))
            }
        };
        Ok(view)
    }
}
