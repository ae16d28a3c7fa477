use sea_orm_migration::prelude::*;

use crate::{
    m20261001_000001_users::Users,
    m20261001_000002_catalog::{Items, Modifiers, Restaurants},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    OrderId,
    ClientId,
    RestaurantId,
    Address,
    TotalAmountCents,
    PaymentMethod,
    IsPaid,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ItemId,
    Quantity,
    PriceCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum OrderItemModifiers {
    Table,
    OrderItemId,
    ModifierId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Orders::OrderId)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::ClientId).integer().not_null())
                    .col(ColumnDef::new(Orders::RestaurantId).integer().not_null())
                    .col(ColumnDef::new(Orders::Address).string_len(500).not_null())
                    .col(
                        ColumnDef::new(Orders::TotalAmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::PaymentMethod).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Orders::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-client_id")
                            .from(Orders::Table, Orders::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-restaurant_id")
                            .from(Orders::Table, Orders::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-restaurant_id")
                    .table(Orders::Table)
                    .col(Orders::RestaurantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::ItemId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(OrderItems::PriceCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(OrderItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-order_items-order_id")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-order_items-item_id")
                            .from(OrderItems::Table, OrderItems::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-order_items-order_id")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItemModifiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItemModifiers::OrderItemId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderItemModifiers::ModifierId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(OrderItemModifiers::OrderItemId)
                            .col(OrderItemModifiers::ModifierId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-order_item_modifiers-order_item_id")
                            .from(OrderItemModifiers::Table, OrderItemModifiers::OrderItemId)
                            .to(OrderItems::Table, OrderItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-order_item_modifiers-modifier_id")
                            .from(OrderItemModifiers::Table, OrderItemModifiers::ModifierId)
                            .to(Modifiers::Table, Modifiers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItemModifiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}
