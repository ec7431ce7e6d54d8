//! Create `user` table with optional FK to `vendor`.
//!
//! Admins and customers have no vendor; includes soft-delete timestamp.
//! Email is unique among open accounts only, so a closed address can sign up again.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(ColumnDef::new(User::VendorId).uuid().null())
                    .col(string_len(User::Email, 255).not_null())
                    .col(string_len(User::Name, 128).not_null())
                    .col(string_len(User::Role, 16).not_null())
                    .col(string_len(User::Status, 32).not_null())
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(User::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_vendor")
                            .from(User::Table, User::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // unique among open accounts only
        manager
            .get_connection()
            .execute_unprepared(r#"CREATE UNIQUE INDEX IF NOT EXISTS "uniq_user_open_email" ON "user" ("email") WHERE "deleted_at" IS NULL"#)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, VendorId, Email, Name, Role, Status, CreatedAt, UpdatedAt, DeletedAt }

#[derive(DeriveIden)]
enum Vendor { Table, Id }
