//! Catalog schema: companies own restaurants, restaurants own menus and
//! categories, and items sit in one menu and one category of the same
//! restaurant. Modifiers are global and linked to items many-to-many.

use sea_orm_migration::prelude::*;

use crate::m20261001_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Companies {
    Table,
    Id,
    Name,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Restaurants {
    Table,
    Id,
    CompanyId,
    OwnerId,
    Name,
    Description,
    PhoneNumber,
    Email,
    Website,
    Address,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Menus {
    Table,
    Id,
    RestaurantId,
    Name,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    RestaurantId,
    Name,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Modifiers {
    Table,
    Id,
    Name,
    PriceCents,
    IsAvailable,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Items {
    Table,
    Id,
    MenuId,
    CategoryId,
    RestaurantId,
    Name,
    Description,
    PriceCents,
    IsAvailable,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ItemModifiers {
    Table,
    ItemId,
    ModifierId,
}

/// `created_by` keeps the row when its author is deleted.
fn created_by_fk(
    name: &str,
    table: impl IntoIden + 'static,
    column: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Companies::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Companies::Description).text())
                    .col(ColumnDef::new(Companies::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Companies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut created_by_fk(
                        "fk-companies-created_by",
                        Companies::Table,
                        Companies::CreatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Restaurants::CompanyId).integer().not_null())
                    .col(ColumnDef::new(Restaurants::OwnerId).integer().not_null())
                    .col(
                        ColumnDef::new(Restaurants::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Description).text())
                    .col(
                        ColumnDef::new(Restaurants::PhoneNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Restaurants::Email).string())
                    .col(ColumnDef::new(Restaurants::Website).string())
                    .col(ColumnDef::new(Restaurants::Address).string().not_null())
                    .col(ColumnDef::new(Restaurants::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Restaurants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-restaurants-company_id")
                            .from(Restaurants::Table, Restaurants::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-restaurants-owner_id")
                            .from(Restaurants::Table, Restaurants::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut created_by_fk(
                        "fk-restaurants-created_by",
                        Restaurants::Table,
                        Restaurants::CreatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-restaurants-company_id")
                    .table(Restaurants::Table)
                    .col(Restaurants::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-restaurants-owner_id")
                    .table(Restaurants::Table)
                    .col(Restaurants::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Menus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Menus::RestaurantId).integer().not_null())
                    .col(ColumnDef::new(Menus::Name).string().not_null())
                    .col(ColumnDef::new(Menus::Description).text())
                    .col(ColumnDef::new(Menus::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Menus::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Menus::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-menus-restaurant_id")
                            .from(Menus::Table, Menus::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut created_by_fk(
                        "fk-menus-created_by",
                        Menus::Table,
                        Menus::CreatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::RestaurantId).integer().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Description).text())
                    .col(ColumnDef::new(Categories::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-restaurant_id")
                            .from(Categories::Table, Categories::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut created_by_fk(
                        "fk-categories-created_by",
                        Categories::Table,
                        Categories::CreatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Modifiers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Modifiers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Modifiers::Name).string().not_null())
                    .col(ColumnDef::new(Modifiers::PriceCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Modifiers::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Modifiers::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Modifiers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Modifiers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut created_by_fk(
                        "fk-modifiers-created_by",
                        Modifiers::Table,
                        Modifiers::CreatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::MenuId).integer().not_null())
                    .col(ColumnDef::new(Items::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Items::RestaurantId).integer().not_null())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::Description).text())
                    .col(ColumnDef::new(Items::PriceCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Items::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Items::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-menu_id")
                            .from(Items::Table, Items::MenuId)
                            .to(Menus::Table, Menus::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-category_id")
                            .from(Items::Table, Items::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-restaurant_id")
                            .from(Items::Table, Items::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut created_by_fk(
                        "fk-items-created_by",
                        Items::Table,
                        Items::CreatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-restaurant_id")
                    .table(Items::Table)
                    .col(Items::RestaurantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ItemModifiers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ItemModifiers::ItemId).integer().not_null())
                    .col(ColumnDef::new(ItemModifiers::ModifierId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(ItemModifiers::ItemId)
                            .col(ItemModifiers::ModifierId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-item_modifiers-item_id")
                            .from(ItemModifiers::Table, ItemModifiers::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-item_modifiers-modifier_id")
                            .from(ItemModifiers::Table, ItemModifiers::ModifierId)
                            .to(Modifiers::Table, Modifiers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemModifiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Modifiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Menus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Restaurants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}
