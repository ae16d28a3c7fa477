use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Access, FieldErrors, Item, Money, Requester, RestaurantRef, ResultEngine, item_modifiers,
    items, modifiers,
    util::required_text,
};

use super::{
    Engine, NAME_MAX_LEN, Page, PageRequest, UpdateMode, access::ensure, collect, fetch_page,
    merged, merged_text, unique_ids, with_tx,
};

#[derive(Clone, Debug, Default)]
pub struct ItemInput {
    pub menu: Option<i32>,
    pub category: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    /// Defaults to `true` on creation.
    pub is_available: Option<bool>,
    /// Replaces the whole modifier set when given.
    pub modifiers: Option<Vec<Uuid>>,
}

/// Optional filters of the item list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub category: Option<i32>,
    pub menu: Option<i32>,
}

struct ItemFields {
    menu_id: i32,
    category_id: i32,
    restaurant_id: i32,
    name: String,
    description: Option<String>,
    price: Money,
    is_available: bool,
    modifiers: Option<Vec<Uuid>>,
}

impl Engine {
    /// Validate an item body.
    ///
    /// The item's restaurant is the one of its menu, and the category must
    /// belong to it too. On creation the requester must be allowed to manage
    /// that restaurant; on update menu and category may only move within the
    /// item's restaurant.
    async fn item_fields(
        &self,
        db_tx: &DatabaseTransaction,
        requester: &Requester,
        input: ItemInput,
        current: Option<&items::Model>,
        mode: UpdateMode,
    ) -> ResultEngine<ItemFields> {
        let mut errors = FieldErrors::new();

        let menu_id = merged(
            input.menu,
            current.map_or(0, |item| item.menu_id),
            mode,
            "menu",
            &mut errors,
        );
        let mut restaurant_id = current.map(|item| item.restaurant_id);
        if !errors.contains("menu")
            && let Some(menu) =
                collect(self.related_menu(db_tx, menu_id, "menu").await, &mut errors)?
        {
            match restaurant_id {
                Some(restaurant_id) if restaurant_id != menu.restaurant_id => {
                    errors.push("menu", "The menu must belong to the item's restaurant.");
                }
                Some(_) => {}
                None => {
                    let restaurant = self.load_restaurant(db_tx, menu.restaurant_id).await?;
                    ensure(requester.can_manage_restaurant(RestaurantRef::from(&restaurant)))?;
                    restaurant_id = Some(restaurant.id);
                }
            }
        }

        let category_id = merged(
            input.category,
            current.map_or(0, |item| item.category_id),
            mode,
            "category",
            &mut errors,
        );
        if !errors.contains("category")
            && let Some(category) = collect(
                self.related_category(db_tx, category_id, "category").await,
                &mut errors,
            )?
            && restaurant_id.is_some_and(|restaurant_id| restaurant_id != category.restaurant_id)
        {
            errors.push(
                "category",
                "The category must belong to the same restaurant as the menu.",
            );
        }

        let name = input
            .name
            .as_deref()
            .map(|name| required_text(name, "name", NAME_MAX_LEN, &mut errors));
        let name = merged(
            name,
            current.map(|item| item.name.clone()).unwrap_or_default(),
            mode,
            "name",
            &mut errors,
        );
        let price = merged(
            input.price,
            current.map_or(Money::ZERO, |item| {
                Money::from_cents(item.price_cents).unwrap_or_default()
            }),
            mode,
            "price",
            &mut errors,
        );
        let description = merged_text(
            input.description.as_deref(),
            current.and_then(|item| item.description.clone()),
        );
        let is_available = input
            .is_available
            .or(current.map(|item| item.is_available))
            .unwrap_or(true);

        if let Some(modifier_ids) = &input.modifiers {
            self.check_modifiers(db_tx, modifier_ids, "modifiers", &mut errors)
                .await?;
        }

        errors.into_result()?;
        Ok(ItemFields {
            menu_id,
            category_id,
            restaurant_id: restaurant_id.unwrap_or_default(),
            name,
            description,
            price,
            is_available,
            modifiers: input.modifiers,
        })
    }

    /// Push an error for every id in `modifier_ids` that does not exist.
    pub(super) async fn check_modifiers(
        &self,
        db_tx: &DatabaseTransaction,
        modifier_ids: &[Uuid],
        field: &str,
        errors: &mut FieldErrors,
    ) -> ResultEngine<()> {
        if modifier_ids.is_empty() {
            return Ok(());
        }
        let found: Vec<Uuid> = modifiers::Entity::find()
            .filter(modifiers::Column::Id.is_in(modifier_ids.iter().copied()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|modifier| modifier.id)
            .collect();
        for id in modifier_ids {
            if !found.contains(id) {
                errors.push(field, format!("Invalid pk \"{id}\" - object does not exist."));
            }
        }
        Ok(())
    }

    async fn set_item_modifiers(
        &self,
        db_tx: &DatabaseTransaction,
        item_id: i32,
        modifier_ids: &[Uuid],
    ) -> ResultEngine<()> {
        item_modifiers::Entity::delete_many()
            .filter(item_modifiers::Column::ItemId.eq(item_id))
            .exec(db_tx)
            .await?;
        let links: Vec<item_modifiers::ActiveModel> = unique_ids(modifier_ids)
            .into_iter()
            .map(|modifier_id| item_modifiers::ActiveModel {
                item_id: ActiveValue::Set(item_id),
                modifier_id: ActiveValue::Set(modifier_id),
            })
            .collect();
        if !links.is_empty() {
            item_modifiers::Entity::insert_many(links)
                .exec(db_tx)
                .await?;
        }
        Ok(())
    }

    /// Load the modifier ids of a page of items and build the domain values.
    async fn with_item_modifiers(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<items::Model>,
    ) -> ResultEngine<Vec<Item>> {
        let ids: Vec<i32> = models.iter().map(|item| item.id).collect();
        let mut links: HashMap<i32, Vec<Uuid>> = HashMap::new();
        if !ids.is_empty() {
            for link in item_modifiers::Entity::find()
                .filter(item_modifiers::Column::ItemId.is_in(ids))
                .order_by_asc(item_modifiers::Column::ModifierId)
                .all(db_tx)
                .await?
            {
                links.entry(link.item_id).or_default().push(link.modifier_id);
            }
        }
        models
            .into_iter()
            .map(|model| {
                let modifiers = links.remove(&model.id).unwrap_or_default();
                Item::try_from((model, modifiers))
            })
            .collect()
    }

    async fn item_with_modifiers(
        &self,
        db_tx: &DatabaseTransaction,
        model: items::Model,
    ) -> ResultEngine<Item> {
        let modifiers = item_modifiers::Entity::find()
            .filter(item_modifiers::Column::ItemId.eq(model.id))
            .order_by_asc(item_modifiers::Column::ModifierId)
            .all(db_tx)
            .await?
            .into_iter()
            .map(|link| link.modifier_id)
            .collect();
        Item::try_from((model, modifiers))
    }

    async fn item_with_access(
        &self,
        db_tx: &DatabaseTransaction,
        requester: &Requester,
        item_id: i32,
        access: Access,
    ) -> ResultEngine<items::Model> {
        let item = self.load_item(db_tx, item_id).await?;
        let target = self
            .restaurant_target(db_tx, item.restaurant_id, item.created_by)
            .await?;
        ensure(requester.is_owner_or_employee_or_read_only(&target, access))?;
        Ok(item)
    }

    /// Add an item to a menu and a category of the same restaurant.
    pub async fn create_item(
        &self,
        requester: &Requester,
        input: ItemInput,
    ) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            let fields = self
                .item_fields(&db_tx, requester, input, None, UpdateMode::Replace)
                .await?;
            let now = Utc::now();
            let item = items::ActiveModel {
                menu_id: ActiveValue::Set(fields.menu_id),
                category_id: ActiveValue::Set(fields.category_id),
                restaurant_id: ActiveValue::Set(fields.restaurant_id),
                name: ActiveValue::Set(fields.name),
                description: ActiveValue::Set(fields.description),
                price_cents: ActiveValue::Set(fields.price.cents()),
                is_available: ActiveValue::Set(fields.is_available),
                created_by: ActiveValue::Set(Some(requester.id())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            let modifier_ids = fields.modifiers.unwrap_or_default();
            self.set_item_modifiers(&db_tx, item.id, &modifier_ids)
                .await?;
            self.item_with_modifiers(&db_tx, item).await
        })
    }

    /// Items visible to the requester.
    pub async fn items(
        &self,
        requester: &Requester,
        filter: ItemFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<Item>> {
        let Some(scope) = requester.scope().condition(items::Column::RestaurantId) else {
            return Ok(Page::empty());
        };
        with_tx!(self, |db_tx| {
            let mut select = items::Entity::find()
                .filter(scope)
                .order_by_asc(items::Column::Id);
            if let Some(category_id) = filter.category {
                select = select.filter(items::Column::CategoryId.eq(category_id));
            }
            if let Some(menu_id) = filter.menu {
                select = select.filter(items::Column::MenuId.eq(menu_id));
            }
            let page = fetch_page(&db_tx, select, page).await?;
            let results = self.with_item_modifiers(&db_tx, page.results).await?;
            Ok(Page {
                count: page.count,
                results,
            })
        })
    }

    pub async fn item(&self, requester: &Requester, item_id: i32) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            let item = self
                .item_with_access(&db_tx, requester, item_id, Access::Read)
                .await?;
            self.item_with_modifiers(&db_tx, item).await
        })
    }

    pub async fn update_item(
        &self,
        requester: &Requester,
        item_id: i32,
        input: ItemInput,
        mode: UpdateMode,
    ) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            let current = self
                .item_with_access(&db_tx, requester, item_id, Access::Write)
                .await?;
            let fields = self
                .item_fields(&db_tx, requester, input, Some(&current), mode)
                .await?;

            let mut item: items::ActiveModel = current.into();
            item.menu_id = ActiveValue::Set(fields.menu_id);
            item.category_id = ActiveValue::Set(fields.category_id);
            item.name = ActiveValue::Set(fields.name);
            item.description = ActiveValue::Set(fields.description);
            item.price_cents = ActiveValue::Set(fields.price.cents());
            item.is_available = ActiveValue::Set(fields.is_available);
            item.updated_at = ActiveValue::Set(Utc::now());
            let item = item.update(&db_tx).await?;

            if let Some(modifier_ids) = &fields.modifiers {
                self.set_item_modifiers(&db_tx, item.id, modifier_ids)
                    .await?;
            }
            self.item_with_modifiers(&db_tx, item).await
        })
    }

    pub async fn delete_item(&self, requester: &Requester, item_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let item = self
                .item_with_access(&db_tx, requester, item_id, Access::Write)
                .await?;
            items::Entity::delete_by_id(item.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
