//! The module contains `Order` and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{EngineError, Money, PaymentMethod, ResultEngine};

/// An order placed by a client at one restaurant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub id: i32,
    /// Human readable reference, see [`generate_order_id`].
    ///
    /// [`generate_order_id`]: crate::generate_order_id
    pub order_id: String,
    pub client_id: i32,
    pub restaurant_id: i32,
    pub address: String,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_id: String,
    pub client_id: i32,
    pub restaurant_id: i32,
    pub address: String,
    pub total_amount_cents: i64,
    pub payment_method: String,
    pub is_paid: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ClientId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::restaurants::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurants::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Restaurant,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::restaurants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            order_id: model.order_id,
            client_id: model.client_id,
            restaurant_id: model.restaurant_id,
            address: model.address,
            total_amount: Money::from_cents(model.total_amount_cents)?,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            is_paid: model.is_paid,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
