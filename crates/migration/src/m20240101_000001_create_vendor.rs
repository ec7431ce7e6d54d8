//! Create `vendor` table: one row per business tenant.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vendor::Table)
                    .if_not_exists()
                    .col(uuid(Vendor::Id).primary_key())
                    .col(string_len(Vendor::Name, 128).not_null())
                    .col(string_len(Vendor::ServiceType, 16).not_null())
                    .col(string_len(Vendor::ContactEmail, 255).not_null())
                    .col(string_len(Vendor::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Vendor::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Vendor::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vendor::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vendor { Table, Id, Name, ServiceType, ContactEmail, Status, CreatedAt, UpdatedAt }
