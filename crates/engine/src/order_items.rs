//! The module contains `OrderItem`, one line of an order, and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// A line of an order: `quantity` times `item` at `price`, plus modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub item_id: i32,
    pub quantity: u32,
    pub price: Money,
    pub modifiers: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    pub item_id: i32,
    pub quantity: i32,
    pub price_cents: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Item,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<(Model, Vec<Uuid>)> for OrderItem {
    type Error = EngineError;

    fn try_from((model, modifiers): (Model, Vec<Uuid>)) -> ResultEngine<Self> {
        let quantity = u32::try_from(model.quantity).map_err(|_| {
            EngineError::invalid("quantity", "Ensure this value is greater than or equal to 1.")
        })?;
        Ok(Self {
            id: model.id,
            order_id: model.order_id,
            item_id: model.item_id,
            quantity,
            price: Money::from_cents(model.price_cents)?,
            modifiers,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
