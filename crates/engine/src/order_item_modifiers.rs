use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "order_item_modifiers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_item_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub modifier_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_items::Entity",
        from = "Column::OrderItemId",
        to = "super::order_items::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    OrderItem,
    #[sea_orm(
        belongs_to = "super::modifiers::Entity",
        from = "Column::ModifierId",
        to = "super::modifiers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Modifier,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl Related<super::modifiers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modifier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
