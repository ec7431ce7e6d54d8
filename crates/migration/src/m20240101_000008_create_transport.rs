//! Create bus operator tables: `bus`, `trip` and `ticket`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bus::Table)
                    .if_not_exists()
                    .col(uuid(Bus::Id).primary_key())
                    .col(uuid(Bus::VendorId).not_null())
                    .col(string_len(Bus::Registration, 16).not_null())
                    .col(string_len(Bus::Name, 128).not_null())
                    .col(integer(Bus::Capacity).not_null())
                    .col(timestamp_with_time_zone(Bus::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bus_vendor")
                            .from(Bus::Table, Bus::VendorId)
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
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(uuid(Trip::Id).primary_key())
                    .col(uuid(Trip::VendorId).not_null())
                    .col(uuid(Trip::BusId).not_null())
                    .col(string_len(Trip::Origin, 128).not_null())
                    .col(string_len(Trip::Destination, 128).not_null())
                    .col(timestamp_with_time_zone(Trip::DepartsAt).not_null())
                    .col(timestamp_with_time_zone(Trip::ArrivesAt).not_null())
                    .col(big_integer(Trip::FareCents).not_null())
                    .col(timestamp_with_time_zone(Trip::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_vendor")
                            .from(Trip::Table, Trip::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_bus")
                            .from(Trip::Table, Trip::BusId)
                            .to(Bus::Table, Bus::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(uuid(Ticket::Id).primary_key())
                    .col(uuid(Ticket::VendorId).not_null())
                    .col(uuid(Ticket::TripId).not_null())
                    .col(ColumnDef::new(Ticket::CustomerId).uuid().null())
                    .col(string_len(Ticket::PassengerName, 128).not_null())
                    .col(integer(Ticket::SeatNo).not_null())
                    .col(big_integer(Ticket::FareCents).not_null())
                    .col(string_len(Ticket::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Ticket::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Ticket::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_vendor")
                            .from(Ticket::Table, Ticket::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_trip")
                            .from(Ticket::Table, Ticket::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ticket::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Trip::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Bus::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Bus { Table, Id, VendorId, Registration, Name, Capacity, CreatedAt }

#[derive(DeriveIden)]
enum Trip { Table, Id, VendorId, BusId, Origin, Destination, DepartsAt, ArrivesAt, FareCents, CreatedAt }

#[derive(DeriveIden)]
enum Ticket {
    Table,
    Id,
    VendorId,
    TripId,
    CustomerId,
    PassengerName,
    SeatNo,
    FareCents,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Vendor { Table, Id }
