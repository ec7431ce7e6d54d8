use crate::db::{connect_with_config, DatabaseConfig, DATABASE_URL};
use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use super::setup_test_db;

#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1 as test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);
    Ok(())
}

#[tokio::test]
async fn test_custom_config_connection() -> Result<()> {
    if setup_test_db().await.is_none() {
        return Ok(());
    }
    let config = DatabaseConfig {
        url: DATABASE_URL.clone(),
        max_connections: 5,
        min_connections: 1,
        connect_timeout_secs: 10,
        acquire_timeout_secs: 10,
        idle_timeout_secs: 60,
        max_lifetime_secs: 600,
        ..Default::default()
    };
    let db = connect_with_config(&config).await?;
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT current_database()".to_string());
    assert!(db.query_one(stmt).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_empty_url_falls_back_to_env() -> Result<()> {
    if setup_test_db().await.is_none() {
        return Ok(());
    }
    let db = connect_with_config(&DatabaseConfig::default()).await?;
    db.ping().await?;
    Ok(())
}
