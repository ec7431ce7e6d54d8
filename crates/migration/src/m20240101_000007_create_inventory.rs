//! Create store/pharmacy tables: `inventory_item` and `sale`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryItem::Table)
                    .if_not_exists()
                    .col(uuid(InventoryItem::Id).primary_key())
                    .col(uuid(InventoryItem::VendorId).not_null())
                    .col(string_len(InventoryItem::Kind, 16).not_null())
                    .col(string_len(InventoryItem::Sku, 64).not_null())
                    .col(string_len(InventoryItem::Name, 128).not_null())
                    .col(big_integer(InventoryItem::UnitPriceCents).not_null())
                    .col(integer(InventoryItem::Quantity).not_null())
                    .col(integer(InventoryItem::ReorderLevel).not_null())
                    .col(ColumnDef::new(InventoryItem::ExpiryDate).date().null())
                    .col(ColumnDef::new(InventoryItem::BatchNo).string_len(64).null())
                    .col(timestamp_with_time_zone(InventoryItem::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(InventoryItem::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_item_vendor")
                            .from(InventoryItem::Table, InventoryItem::VendorId)
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
                    .table(Sale::Table)
                    .if_not_exists()
                    .col(uuid(Sale::Id).primary_key())
                    .col(uuid(Sale::VendorId).not_null())
                    .col(uuid(Sale::ItemId).not_null())
                    .col(ColumnDef::new(Sale::CustomerId).uuid().null())
                    .col(integer(Sale::Quantity).not_null())
                    .col(big_integer(Sale::UnitPriceCents).not_null())
                    .col(big_integer(Sale::TotalCents).not_null())
                    .col(timestamp_with_time_zone(Sale::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_vendor")
                            .from(Sale::Table, Sale::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_item")
                            .from(Sale::Table, Sale::ItemId)
                            .to(InventoryItem::Table, InventoryItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Sale::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(InventoryItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum InventoryItem {
    Table,
    Id,
    VendorId,
    Kind,
    Sku,
    Name,
    UnitPriceCents,
    Quantity,
    ReorderLevel,
    ExpiryDate,
    BatchNo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sale { Table, Id, VendorId, ItemId, CustomerId, Quantity, UnitPriceCents, TotalCents, CreatedAt }

#[derive(DeriveIden)]
enum Vendor { Table, Id }
