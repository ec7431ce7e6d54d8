#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url: std::env::var("DATABASE_URL").unwrap_or_default(),
        max_connections: 20,
        min_connections: 1,
        connect_timeout_secs: 3,
        idle_timeout_secs: 60,
        max_lifetime_secs: 600,
        acquire_timeout_secs: 10,
        sqlx_logging: false,
    }
}

/// Connection to a migrated test database, or `None` when `SKIP_DB_TESTS`
/// is set or no database is reachable.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&test_config()).await else {
                eprintln!("database unreachable; skipping db tests");
                return false;
            };
            let ok = migration::Migrator::up(&db, None).await.is_ok();
            drop(db);
            ok
        })
        .await;
    if !migrated {
        return None;
    }

    // Return a fresh connection for the current test's runtime
    connect_with_config(&test_config()).await.ok()
}

pub fn onboard_input(service_type: models::ServiceType) -> crate::vendor_service::OnboardInput {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    crate::vendor_service::OnboardInput {
        business_name: format!("Test {service_type} {}", &tag[..8]),
        service_type,
        owner_email: format!("owner_{tag}@example.com"),
        owner_name: "Test Owner".into(),
        password: "Sup3rSecret".into(),
    }
}

/// Onboard a throwaway vendor of the given type.
pub async fn vendor_of(db: &DatabaseConnection, service_type: models::ServiceType) -> models::vendor::Model {
    crate::vendor_service::onboard(db, onboard_input(service_type), "USD")
        .await
        .expect("onboard test vendor")
        .vendor
}
