use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "item_modifiers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub modifier_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::modifiers::Entity",
        from = "Column::ModifierId",
        to = "super::modifiers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Modifier,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::modifiers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modifier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
