use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users: lookup by vendor
        manager
            .create_index(
                Index::create()
                    .name("idx_user_vendor")
                    .table(User::Table)
                    .col(User::VendorId)
                    .to_owned(),
            )
            .await?;

        // Vendors: public catalog filter
        manager
            .create_index(
                Index::create()
                    .name("idx_vendor_service_type")
                    .table(Vendor::Table)
                    .col(Vendor::ServiceType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_vendor")
                    .table(Payment::Table)
                    .col(Payment::VendorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_staff_vendor")
                    .table(Staff::Table)
                    .col(Staff::VendorId)
                    .to_owned(),
            )
            .await?;

        // Per-vendor natural keys
        manager
            .create_index(
                Index::create()
                    .name("uniq_room_vendor_number")
                    .table(Room::Table)
                    .col(Room::VendorId)
                    .col(Room::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_item_vendor_sku")
                    .table(InventoryItem::Table)
                    .col(InventoryItem::VendorId)
                    .col(InventoryItem::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_bus_vendor_registration")
                    .table(Bus::Table)
                    .col(Bus::VendorId)
                    .col(Bus::Registration)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Overlap checks scan the bookings of one room
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_room_dates")
                    .table(Booking::Table)
                    .col(Booking::RoomId)
                    .col(Booking::CheckIn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_customer")
                    .table(Booking::Table)
                    .col(Booking::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sale_vendor_created")
                    .table(Sale::Table)
                    .col(Sale::VendorId)
                    .col(Sale::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_vendor_departs")
                    .table(Trip::Table)
                    .col(Trip::VendorId)
                    .col(Trip::DepartsAt)
                    .to_owned(),
            )
            .await?;

        // Seat lookups; cancelled tickets free the seat, so not unique
        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_trip_seat")
                    .table(Ticket::Table)
                    .col(Ticket::TripId)
                    .col(Ticket::SeatNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_customer")
                    .table(Ticket::Table)
                    .col(Ticket::CustomerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_vendor").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_vendor_service_type").table(Vendor::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payment_vendor").table(Payment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_staff_vendor").table(Staff::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_room_vendor_number").table(Room::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_item_vendor_sku").table(InventoryItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_bus_vendor_registration").table(Bus::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_room_dates").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_customer").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sale_vendor_created").table(Sale::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_trip_vendor_departs").table(Trip::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ticket_trip_seat").table(Ticket::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ticket_customer").table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, VendorId }

#[derive(DeriveIden)]
enum Vendor { Table, ServiceType }

#[derive(DeriveIden)]
enum Payment { Table, VendorId }

#[derive(DeriveIden)]
enum Staff { Table, VendorId }

#[derive(DeriveIden)]
enum Room { Table, VendorId, Number }

#[derive(DeriveIden)]
enum InventoryItem { Table, VendorId, Sku }

#[derive(DeriveIden)]
enum Bus { Table, VendorId, Registration }

#[derive(DeriveIden)]
enum Booking { Table, RoomId, CheckIn, CustomerId }

#[derive(DeriveIden)]
enum Sale { Table, VendorId, CreatedAt }

#[derive(DeriveIden)]
enum Trip { Table, VendorId, DepartsAt }

#[derive(DeriveIden)]
enum Ticket { Table, TripId, SeatNo, CustomerId }
