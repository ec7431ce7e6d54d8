use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::pagination::Pagination;
use models::{payment, subscription, vendor};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::limits;
use super::plans::Usage;
use crate::errors::ServiceError;

/// Persistence used by the subscription workflow.
#[async_trait]
pub trait BillingRepository: Send + Sync {
    async fn get_subscription(&self, vendor_id: Uuid) -> Result<Option<subscription::Model>, ServiceError>;
    async fn save_subscription(&self, sub: subscription::Model) -> Result<subscription::Model, ServiceError>;

    async fn get_payment(&self, id: Uuid) -> Result<Option<payment::Model>, ServiceError>;
    async fn insert_payment(&self, p: payment::Model) -> Result<payment::Model, ServiceError>;
    async fn update_payment(&self, p: payment::Model) -> Result<payment::Model, ServiceError>;
    /// Newest first; `vendor_id = None` lists every vendor's payments.
    async fn list_payments(&self, vendor_id: Option<Uuid>, p: Pagination) -> Result<(Vec<payment::Model>, u64), ServiceError>;

    async fn usage(&self, vendor_id: Uuid) -> Result<Usage, ServiceError>;
    /// Subscriptions whose current period ended at or before `now`.
    async fn due_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<subscription::Model>, ServiceError>;
}

pub struct SeaOrmBillingRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl BillingRepository for SeaOrmBillingRepository {
    async fn get_subscription(&self, vendor_id: Uuid) -> Result<Option<subscription::Model>, ServiceError> {
        Ok(subscription::find_by_vendor(&self.db, vendor_id).await?)
    }

    async fn save_subscription(&self, sub: subscription::Model) -> Result<subscription::Model, ServiceError> {
        let am = subscription::ActiveModel::from(sub).reset_all();
        Ok(am.update(&self.db).await?)
    }

    async fn get_payment(&self, id: Uuid) -> Result<Option<payment::Model>, ServiceError> {
        Ok(payment::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert_payment(&self, p: payment::Model) -> Result<payment::Model, ServiceError> {
        let am = payment::ActiveModel::from(p).reset_all();
        am.insert(&self.db).await.map_err(|e| ServiceError::from_db(e, "payment"))
    }

    async fn update_payment(&self, p: payment::Model) -> Result<payment::Model, ServiceError> {
        let am = payment::ActiveModel::from(p).reset_all();
        Ok(am.update(&self.db).await?)
    }

    async fn list_payments(&self, vendor_id: Option<Uuid>, p: Pagination) -> Result<(Vec<payment::Model>, u64), ServiceError> {
        let (page_idx, per_page) = p.normalize();
        let mut query = payment::Entity::find();
        if let Some(vid) = vendor_id {
            query = query.filter(payment::Column::VendorId.eq(vid));
        }
        let paginator = query
            .order_by_desc(payment::Column::CreatedAt)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_idx).await?;
        Ok((items, total))
    }

    async fn usage(&self, vendor_id: Uuid) -> Result<Usage, ServiceError> {
        let vendor = vendor::Entity::find_by_id(vendor_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("vendor"))?;
        limits::load_usage(&self.db, vendor.id, vendor.service_type()?).await
    }

    async fn due_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<subscription::Model>, ServiceError> {
        Ok(subscription::Entity::find()
            .filter(subscription::Column::CurrentPeriodEnd.lte(now))
            .order_by_asc(subscription::Column::CurrentPeriodEnd)
            .all(&self.db)
            .await?)
    }
}

/// In-memory repository for service-level tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockBillingRepository {
        subs: Mutex<HashMap<Uuid, subscription::Model>>, // key: vendor_id
        payments: Mutex<Vec<payment::Model>>,
        usage: Mutex<HashMap<Uuid, Usage>>,
    }

    impl MockBillingRepository {
        pub fn put_subscription(&self, sub: subscription::Model) {
            self.subs.lock().unwrap().insert(sub.vendor_id, sub);
        }

        pub fn set_usage(&self, vendor_id: Uuid, usage: Usage) {
            self.usage.lock().unwrap().insert(vendor_id, usage);
        }

        pub fn payments(&self) -> Vec<payment::Model> {
            self.payments.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BillingRepository for MockBillingRepository {
        async fn get_subscription(&self, vendor_id: Uuid) -> Result<Option<subscription::Model>, ServiceError> {
            Ok(self.subs.lock().unwrap().get(&vendor_id).cloned())
        }

        async fn save_subscription(&self, sub: subscription::Model) -> Result<subscription::Model, ServiceError> {
            let mut subs = self.subs.lock().unwrap();
            if !subs.contains_key(&sub.vendor_id) {
                return Err(ServiceError::not_found("subscription"));
            }
            subs.insert(sub.vendor_id, sub.clone());
            Ok(sub)
        }

        async fn get_payment(&self, id: Uuid) -> Result<Option<payment::Model>, ServiceError> {
            Ok(self.payments.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn insert_payment(&self, p: payment::Model) -> Result<payment::Model, ServiceError> {
            let mut payments = self.payments.lock().unwrap();
            if payments.iter().any(|x| x.idempotency_key == p.idempotency_key) {
                return Err(ServiceError::Conflict("payment already exists".into()));
            }
            payments.push(p.clone());
            Ok(p)
        }

        async fn update_payment(&self, p: payment::Model) -> Result<payment::Model, ServiceError> {
            let mut payments = self.payments.lock().unwrap();
            let slot = payments.iter_mut().find(|x| x.id == p.id).ok_or_else(|| ServiceError::not_found("payment"))?;
            *slot = p.clone();
            Ok(p)
        }

        async fn list_payments(&self, vendor_id: Option<Uuid>, p: Pagination) -> Result<(Vec<payment::Model>, u64), ServiceError> {
            let (page_idx, per_page) = p.normalize();
            let mut all: Vec<_> = self.payments
                .lock()
                .unwrap()
                .iter()
                .filter(|x| vendor_id.map_or(true, |v| x.vendor_id == v))
                .cloned()
                .collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = all.len() as u64;
            let items = all.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect();
            Ok((items, total))
        }

        async fn usage(&self, vendor_id: Uuid) -> Result<Usage, ServiceError> {
            Ok(self.usage.lock().unwrap().get(&vendor_id).copied().unwrap_or_default())
        }

        async fn due_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<subscription::Model>, ServiceError> {
            let mut due: Vec<_> = self.subs
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.current_period_end.with_timezone(&Utc) <= now)
                .cloned()
                .collect();
            due.sort_by_key(|s| s.current_period_end);
            Ok(due)
        }
    }
}
