//! Database-backed entity tests. Each test returns early when
//! `SKIP_DB_TESTS` is set or no database answers.

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::db::connect;
use crate::{vendor, ServiceType};

/// Connection and pool configuration tests
pub mod db_tests;



static MIGRATED: OnceCell<bool> = OnceCell::const_new();

pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = connect().await.ok()?;
    let ok = *MIGRATED.get_or_init(|| async { migration::Migrator::up(&db, None).await.is_ok() }).await;
    ok.then_some(db)
}

pub(crate) fn unique_email(prefix: &str) -> String {
    format!("{prefix}_{}@example.com", Uuid::new_v4().simple())
}

pub(crate) async fn new_vendor(db: &DatabaseConnection, service_type: ServiceType) -> anyhow::Result<vendor::Model> {
    let name = format!("Test {} {}", service_type, Uuid::new_v4().simple());
    Ok(vendor::create(db, &name, service_type, &unique_email("vendor")).await?)
}
