use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{
    EngineError, Requester, ResultEngine, RestaurantRef, Target, categories, companies, employees,
    items, menus, modifiers, order_items, orders, restaurants, users,
};

use super::{Engine, forbidden, not_found};

/// Generates, for one entity, a loader for ids coming from the path (missing
/// row is a 404) and, when a second name is given, one for ids referenced in a
/// request body (missing row is a validation error on that field).
macro_rules! impl_lookup {
    ($load_fn:ident, $entity:ident, $key:ty, $kind:literal $(, $related_fn:ident)?) => {
        pub(super) async fn $load_fn(
            &self,
            db: &DatabaseTransaction,
            id: $key,
        ) -> ResultEngine<$entity::Model> {
            $entity::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| not_found($kind, id))
        }

        $(
            pub(super) async fn $related_fn(
                &self,
                db: &DatabaseTransaction,
                id: $key,
                field: &str,
            ) -> ResultEngine<$entity::Model> {
                $entity::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        EngineError::invalid(
                            field,
                            format!("Invalid pk \"{id}\" - object does not exist."),
                        )
                    })
            }
        )?
    };
}

impl Engine {
    impl_lookup!(load_user, users, i32, "user", related_user);
    impl_lookup!(load_company, companies, i32, "company", related_company);
    impl_lookup!(load_restaurant, restaurants, i32, "restaurant", related_restaurant);
    impl_lookup!(load_menu, menus, i32, "menu", related_menu);
    impl_lookup!(load_category, categories, i32, "category", related_category);
    impl_lookup!(load_item, items, i32, "item", related_item);
    impl_lookup!(load_modifier, modifiers, Uuid, "modifier");
    impl_lookup!(load_order, orders, i32, "order", related_order);
    impl_lookup!(load_order_item, order_items, i32, "order item");

    /// Build the requester for an authenticated user, loading its employee
    /// assignment when relevant.
    pub(super) async fn requester_for(
        &self,
        db: &DatabaseTransaction,
        user: users::Model,
    ) -> ResultEngine<Requester> {
        let role = user.role()?;
        let employee_restaurant_id = employees::Entity::find_by_id(user.id)
            .one(db)
            .await?
            .and_then(|employee| employee.restaurant_id);
        Ok(Requester {
            user,
            role,
            employee_restaurant_id,
        })
    }

    /// Ownership facts of a row bound to `restaurant_id`.
    pub(super) async fn restaurant_target(
        &self,
        db: &DatabaseTransaction,
        restaurant_id: i32,
        created_by: Option<i32>,
    ) -> ResultEngine<Target> {
        let restaurant = self.load_restaurant(db, restaurant_id).await?;
        Ok(Target {
            created_by,
            restaurant: Some(RestaurantRef::from(&restaurant)),
        })
    }
}

/// Turn a predicate verdict into a `Forbidden` error.
pub(super) fn ensure(allowed: bool) -> ResultEngine<()> {
    if allowed { Ok(()) } else { Err(forbidden()) }
}
