//! Migrator registering table migrations in foreign-key dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_vendor;
mod m20240101_000002_create_user;
mod m20240101_000003_create_user_credentials;
mod m20240101_000004_create_subscription;
mod m20240101_000005_create_staff;
mod m20240101_000006_create_hotel;
mod m20240101_000007_create_inventory;
mod m20240101_000008_create_transport;
mod m20240101_000009_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_vendor::Migration),
            Box::new(m20240101_000002_create_user::Migration),
            Box::new(m20240101_000003_create_user_credentials::Migration),
            Box::new(m20240101_000004_create_subscription::Migration),
            Box::new(m20240101_000005_create_staff::Migration),
            Box::new(m20240101_000006_create_hotel::Migration),
            Box::new(m20240101_000007_create_inventory::Migration),
            Box::new(m20240101_000008_create_transport::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000009_add_indexes::Migration),
        ]
    }
}
