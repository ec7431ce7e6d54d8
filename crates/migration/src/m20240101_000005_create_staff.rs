//! Create `staff` table; rows count against the plan's staff limit.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(uuid(Staff::Id).primary_key())
                    .col(uuid(Staff::VendorId).not_null())
                    .col(string_len(Staff::Name, 128).not_null())
                    .col(string_len(Staff::Email, 255).not_null())
                    .col(string_len(Staff::Position, 64).not_null())
                    .col(timestamp_with_time_zone(Staff::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_vendor")
                            .from(Staff::Table, Staff::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Staff::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Staff { Table, Id, VendorId, Name, Email, Position, CreatedAt }

#[derive(DeriveIden)]
enum Vendor { Table, Id }
