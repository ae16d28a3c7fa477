//! The module contains `Modifier`, an optional add-on for items and order
//! lines, and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// An add-on (extra cheese, no onions, ...) with its own surcharge.
///
/// Modifiers are not bound to a restaurant, so the only ownership they carry
/// is `created_by`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modifier {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
    pub is_available: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "modifiers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub is_available: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item_modifiers::Entity")]
    ItemModifiers,
}

impl Related<super::item_modifiers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemModifiers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Modifier {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            name: model.name,
            price: Money::from_cents(model.price_cents)?,
            is_available: model.is_available,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
