//! Create `subscription` (one per vendor) and `payment` tables.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(uuid(Subscription::Id).primary_key())
                    .col(uuid(Subscription::VendorId).unique_key().not_null())
                    .col(string_len(Subscription::Tier, 16).not_null())
                    .col(string_len(Subscription::Status, 16).not_null())
                    .col(big_integer(Subscription::AmountCents).not_null())
                    .col(string_len(Subscription::Currency, 3).not_null())
                    .col(timestamp_with_time_zone(Subscription::CurrentPeriodStart).not_null())
                    .col(timestamp_with_time_zone(Subscription::CurrentPeriodEnd).not_null())
                    .col(boolean(Subscription::CancelAtPeriodEnd).not_null().default(false))
                    .col(ColumnDef::new(Subscription::PaymentSource).string_len(255).null())
                    .col(timestamp_with_time_zone(Subscription::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Subscription::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_vendor")
                            .from(Subscription::Table, Subscription::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(uuid(Payment::Id).primary_key())
                    .col(uuid(Payment::VendorId).not_null())
                    .col(uuid(Payment::SubscriptionId).not_null())
                    .col(string_len(Payment::Tier, 16).not_null())
                    .col(big_integer(Payment::AmountCents).not_null())
                    .col(string_len(Payment::Currency, 3).not_null())
                    .col(string_len(Payment::Status, 16).not_null())
                    .col(ColumnDef::new(Payment::GatewayRef).string_len(128).null())
                    .col(ColumnDef::new(Payment::FailureReason).text().null())
                    .col(string_len(Payment::IdempotencyKey, 64).unique_key().not_null())
                    .col(timestamp_with_time_zone(Payment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Payment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_vendor")
                            .from(Payment::Table, Payment::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_subscription")
                            .from(Payment::Table, Payment::SubscriptionId)
                            .to(Subscription::Table, Subscription::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Subscription::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Subscription {
    Table,
    Id,
    VendorId,
    Tier,
    Status,
    AmountCents,
    Currency,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CancelAtPeriodEnd,
    PaymentSource,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payment {
    Table,
    Id,
    VendorId,
    SubscriptionId,
    Tier,
    AmountCents,
    Currency,
    Status,
    GatewayRef,
    FailureReason,
    IdempotencyKey,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Vendor { Table, Id }
