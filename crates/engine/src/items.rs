//! The module contains `Item`, a sellable dish, and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// A dish of a menu.
///
/// `restaurant_id` is always the restaurant of `menu_id`; the category must
/// belong to the same restaurant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: i32,
    pub menu_id: i32,
    pub category_id: i32,
    pub restaurant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub is_available: bool,
    /// Modifiers that may be added to this item.
    pub modifiers: Vec<Uuid>,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub menu_id: i32,
    pub category_id: i32,
    pub restaurant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub is_available: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::menus::Entity",
        from = "Column::MenuId",
        to = "super::menus::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Menu,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::restaurants::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurants::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Restaurant,
}

impl Related<super::menus::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<(Model, Vec<Uuid>)> for Item {
    type Error = EngineError;

    fn try_from((model, modifiers): (Model, Vec<Uuid>)) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            menu_id: model.menu_id,
            category_id: model.category_id,
            restaurant_id: model.restaurant_id,
            name: model.name,
            description: model.description,
            price: Money::from_cents(model.price_cents)?,
            is_available: model.is_available,
            modifiers,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
