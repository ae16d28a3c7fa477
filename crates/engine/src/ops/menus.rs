use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Access, FieldErrors, Menu, Requester, RestaurantRef, ResultEngine, menus,
    util::required_text,
};

use super::{
    Engine, NAME_MAX_LEN, Page, PageRequest, UpdateMode, absorb, access::ensure, fetch_page,
    merged, merged_text, with_tx,
};

#[derive(Clone, Debug, Default)]
pub struct MenuInput {
    pub restaurant: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Validated columns of a menu or a category: both hang off a restaurant and
/// carry a name and an optional description.
pub(super) struct SectionFields {
    pub(super) restaurant_id: i32,
    pub(super) name: String,
    pub(super) description: Option<String>,
}

/// Current values of the row being updated.
pub(super) struct SectionRow<'a> {
    pub(super) restaurant_id: i32,
    pub(super) name: &'a str,
    pub(super) description: Option<&'a str>,
}

impl Engine {
    /// Validate a menu/category body.
    ///
    /// On creation the requester must be allowed to manage the restaurant; on
    /// update the restaurant cannot change.
    pub(super) async fn section_fields(
        &self,
        db_tx: &DatabaseTransaction,
        requester: &Requester,
        restaurant: Option<i32>,
        name: Option<&str>,
        description: Option<&str>,
        current: Option<SectionRow<'_>>,
        mode: UpdateMode,
    ) -> ResultEngine<SectionFields> {
        let mut errors = FieldErrors::new();

        let restaurant_id = merged(
            restaurant,
            current.as_ref().map_or(0, |row| row.restaurant_id),
            mode,
            "restaurant",
            &mut errors,
        );
        match &current {
            Some(row) => {
                if restaurant_id != row.restaurant_id {
                    errors.push("restaurant", "The restaurant cannot be changed.");
                }
            }
            None => {
                if !errors.contains("restaurant") {
                    match self
                        .related_restaurant(db_tx, restaurant_id, "restaurant")
                        .await
                    {
                        Ok(restaurant) => {
                            ensure(requester.can_manage_restaurant(RestaurantRef::from(
                                &restaurant,
                            )))?;
                        }
                        Err(err) => absorb(err, &mut errors)?,
                    }
                }
            }
        }

        let name = name.map(|name| required_text(name, "name", NAME_MAX_LEN, &mut errors));
        let name = merged(
            name,
            current
                .as_ref()
                .map(|row| row.name.to_string())
                .unwrap_or_default(),
            mode,
            "name",
            &mut errors,
        );
        let description = merged_text(
            description,
            current
                .as_ref()
                .and_then(|row| row.description.map(ToString::to_string)),
        );

        errors.into_result()?;
        Ok(SectionFields {
            restaurant_id,
            name,
            description,
        })
    }

    /// Add a menu to a restaurant the requester owns, works at, or (as a
    /// superuser) any restaurant.
    pub async fn create_menu(
        &self,
        requester: &Requester,
        input: MenuInput,
    ) -> ResultEngine<Menu> {
        with_tx!(self, |db_tx| {
            let fields = self
                .section_fields(
                    &db_tx,
                    requester,
                    input.restaurant,
                    input.name.as_deref(),
                    input.description.as_deref(),
                    None,
                    UpdateMode::Replace,
                )
                .await?;
            let now = Utc::now();
            let menu = menus::ActiveModel {
                restaurant_id: ActiveValue::Set(fields.restaurant_id),
                name: ActiveValue::Set(fields.name),
                description: ActiveValue::Set(fields.description),
                created_by: ActiveValue::Set(Some(requester.id())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            Ok(menu.insert(&db_tx).await?)
        })
    }

    /// Menus visible to the requester, optionally of one restaurant.
    pub async fn menus(
        &self,
        requester: &Requester,
        restaurant: Option<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<Menu>> {
        let Some(scope) = requester.scope().condition(menus::Column::RestaurantId) else {
            return Ok(Page::empty());
        };
        with_tx!(self, |db_tx| {
            let mut select = menus::Entity::find()
                .filter(scope)
                .order_by_asc(menus::Column::Id);
            if let Some(restaurant_id) = restaurant {
                select = select.filter(menus::Column::RestaurantId.eq(restaurant_id));
            }
            fetch_page(&db_tx, select, page).await
        })
    }

    pub async fn menu(&self, requester: &Requester, menu_id: i32) -> ResultEngine<Menu> {
        with_tx!(self, |db_tx| {
            self.menu_with_access(&db_tx, requester, menu_id, Access::Read)
                .await
        })
    }

    pub async fn update_menu(
        &self,
        requester: &Requester,
        menu_id: i32,
        input: MenuInput,
        mode: UpdateMode,
    ) -> ResultEngine<Menu> {
        with_tx!(self, |db_tx| {
            let current = self
                .menu_with_access(&db_tx, requester, menu_id, Access::Write)
                .await?;
            let fields = self
                .section_fields(
                    &db_tx,
                    requester,
                    input.restaurant,
                    input.name.as_deref(),
                    input.description.as_deref(),
                    Some(SectionRow {
                        restaurant_id: current.restaurant_id,
                        name: &current.name,
                        description: current.description.as_deref(),
                    }),
                    mode,
                )
                .await?;

            let mut menu: menus::ActiveModel = current.into();
            menu.name = ActiveValue::Set(fields.name);
            menu.description = ActiveValue::Set(fields.description);
            menu.updated_at = ActiveValue::Set(Utc::now());
            Ok(menu.update(&db_tx).await?)
        })
    }

    /// Delete a menu together with its items.
    pub async fn delete_menu(&self, requester: &Requester, menu_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let menu = self
                .menu_with_access(&db_tx, requester, menu_id, Access::Write)
                .await?;
            menus::Entity::delete_by_id(menu.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn menu_with_access(
        &self,
        db_tx: &DatabaseTransaction,
        requester: &Requester,
        menu_id: i32,
        access: Access,
    ) -> ResultEngine<menus::Model> {
        let menu = self.load_menu(db_tx, menu_id).await?;
        let target = self
            .restaurant_target(db_tx, menu.restaurant_id, menu.created_by)
            .await?;
        ensure(requester.is_owner_or_employee_or_read_only(&target, access))?;
        Ok(menu)
    }
}
