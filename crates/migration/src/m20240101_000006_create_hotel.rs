//! Create hotel tables: `room` and `booking`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Room::Table)
                    .if_not_exists()
                    .col(uuid(Room::Id).primary_key())
                    .col(uuid(Room::VendorId).not_null())
                    .col(string_len(Room::Number, 16).not_null())
                    .col(string_len(Room::RoomType, 64).not_null())
                    .col(big_integer(Room::PricePerNightCents).not_null())
                    .col(integer(Room::Capacity).not_null())
                    .col(string_len(Room::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Room::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Room::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_vendor")
                            .from(Room::Table, Room::VendorId)
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
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::VendorId).not_null())
                    .col(uuid(Booking::RoomId).not_null())
                    .col(ColumnDef::new(Booking::CustomerId).uuid().null())
                    .col(string_len(Booking::GuestName, 128).not_null())
                    .col(date(Booking::CheckIn).not_null())
                    .col(date(Booking::CheckOut).not_null())
                    .col(integer(Booking::Nights).not_null())
                    .col(big_integer(Booking::TotalCents).not_null())
                    .col(string_len(Booking::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_vendor")
                            .from(Booking::Table, Booking::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_room")
                            .from(Booking::Table, Booking::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Room::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Room { Table, Id, VendorId, Number, RoomType, PricePerNightCents, Capacity, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    VendorId,
    RoomId,
    CustomerId,
    GuestName,
    CheckIn,
    CheckOut,
    Nights,
    TotalCents,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Vendor { Table, Id }
