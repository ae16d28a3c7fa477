use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{FieldErrors, Money, OrderItem, ResultEngine, order_item_modifiers, order_items};

use super::{
    Engine, Page, PageRequest, UpdateMode, collect, fetch_page, merged, unique_ids, with_tx,
};

#[derive(Clone, Debug, Default)]
pub struct OrderItemInput {
    pub order: Option<i32>,
    pub item: Option<i32>,
    pub quantity: Option<i64>,
    pub price: Option<Money>,
    /// Replaces the whole modifier set when given.
    pub modifiers: Option<Vec<Uuid>>,
}

struct OrderItemFields {
    order_id: i32,
    item_id: i32,
    quantity: i32,
    price: Money,
    modifiers: Option<Vec<Uuid>>,
}

impl Engine {
    /// Validate an order line: the item must be sold by the order's
    /// restaurant, and the order of an existing line never changes.
    async fn order_item_fields(
        &self,
        db_tx: &DatabaseTransaction,
        input: OrderItemInput,
        current: Option<&order_items::Model>,
        mode: UpdateMode,
    ) -> ResultEngine<OrderItemFields> {
        let mut errors = FieldErrors::new();

        let order_id = merged(
            input.order,
            current.map_or(0, |line| line.order_id),
            mode,
            "order",
            &mut errors,
        );
        let mut restaurant_id = None;
        if current.is_some_and(|line| line.order_id != order_id) {
            errors.push("order", "The order of an order item cannot be changed.");
        } else if !errors.contains("order")
            && let Some(order) =
                collect(self.related_order(db_tx, order_id, "order").await, &mut errors)?
        {
            restaurant_id = Some(order.restaurant_id);
        }

        let item_id = merged(
            input.item,
            current.map_or(0, |line| line.item_id),
            mode,
            "item",
            &mut errors,
        );
        if !errors.contains("item")
            && let Some(item) = collect(self.related_item(db_tx, item_id, "item").await, &mut errors)?
            && restaurant_id.is_some_and(|restaurant_id| restaurant_id != item.restaurant_id)
        {
            errors.push("item", "The item must belong to the order's restaurant.");
        }

        let quantity = merged(
            input.quantity,
            current.map_or(0, |line| i64::from(line.quantity)),
            mode,
            "quantity",
            &mut errors,
        );
        if !errors.contains("quantity") && quantity < 1 {
            errors.push("quantity", "Ensure this value is greater than or equal to 1.");
        }
        let quantity = i32::try_from(quantity).unwrap_or_else(|_| {
            errors.push("quantity", "Ensure this value is less than or equal to 2147483647.");
            0
        });

        let price = merged(
            input.price,
            current.map_or(Money::ZERO, |line| {
                Money::from_cents(line.price_cents).unwrap_or_default()
            }),
            mode,
            "price",
            &mut errors,
        );

        if let Some(modifier_ids) = &input.modifiers {
            self.check_modifiers(db_tx, modifier_ids, "modifiers", &mut errors)
                .await?;
        }

        errors.into_result()?;
        Ok(OrderItemFields {
            order_id,
            item_id,
            quantity,
            price,
            modifiers: input.modifiers,
        })
    }

    async fn set_order_item_modifiers(
        &self,
        db_tx: &DatabaseTransaction,
        order_item_id: i32,
        modifier_ids: &[Uuid],
    ) -> ResultEngine<()> {
        order_item_modifiers::Entity::delete_many()
            .filter(order_item_modifiers::Column::OrderItemId.eq(order_item_id))
            .exec(db_tx)
            .await?;
        let links: Vec<order_item_modifiers::ActiveModel> = unique_ids(modifier_ids)
            .into_iter()
            .map(|modifier_id| order_item_modifiers::ActiveModel {
                order_item_id: ActiveValue::Set(order_item_id),
                modifier_id: ActiveValue::Set(modifier_id),
            })
            .collect();
        if !links.is_empty() {
            order_item_modifiers::Entity::insert_many(links)
                .exec(db_tx)
                .await?;
        }
        Ok(())
    }

    async fn with_order_item_modifiers(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<order_items::Model>,
    ) -> ResultEngine<Vec<OrderItem>> {
        let ids: Vec<i32> = models.iter().map(|line| line.id).collect();
        let mut links: HashMap<i32, Vec<Uuid>> = HashMap::new();
        if !ids.is_empty() {
            for link in order_item_modifiers::Entity::find()
                .filter(order_item_modifiers::Column::OrderItemId.is_in(ids))
                .order_by_asc(order_item_modifiers::Column::ModifierId)
                .all(db_tx)
                .await?
            {
                links
                    .entry(link.order_item_id)
                    .or_default()
                    .push(link.modifier_id);
            }
        }
        models
            .into_iter()
            .map(|model| {
                let modifiers = links.remove(&model.id).unwrap_or_default();
                OrderItem::try_from((model, modifiers))
            })
            .collect()
    }

    async fn order_item_snapshot(
        &self,
        db_tx: &DatabaseTransaction,
        model: order_items::Model,
    ) -> ResultEngine<OrderItem> {
        let order_item_id = model.id;
        self.with_order_item_modifiers(db_tx, vec![model])
            .await?
            .pop()
            .ok_or_else(|| super::not_found("order item", order_item_id))
    }

    /// Add a line to an order.
    pub async fn create_order_item(&self, input: OrderItemInput) -> ResultEngine<OrderItem> {
        with_tx!(self, |db_tx| {
            let fields = self
                .order_item_fields(&db_tx, input, None, UpdateMode::Replace)
                .await?;
            let now = Utc::now();
            let line = order_items::ActiveModel {
                order_id: ActiveValue::Set(fields.order_id),
                item_id: ActiveValue::Set(fields.item_id),
                quantity: ActiveValue::Set(fields.quantity),
                price_cents: ActiveValue::Set(fields.price.cents()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            let modifier_ids = fields.modifiers.unwrap_or_default();
            self.set_order_item_modifiers(&db_tx, line.id, &modifier_ids)
                .await?;
            self.order_item_snapshot(&db_tx, line).await
        })
    }

    /// List order lines, optionally those of one order.
    pub async fn order_items(
        &self,
        order: Option<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<OrderItem>> {
        with_tx!(self, |db_tx| {
            let mut select = order_items::Entity::find().order_by_asc(order_items::Column::Id);
            if let Some(order_id) = order {
                select = select.filter(order_items::Column::OrderId.eq(order_id));
            }
            let page = fetch_page(&db_tx, select, page).await?;
            let results = self.with_order_item_modifiers(&db_tx, page.results).await?;
            Ok(Page {
                count: page.count,
                results,
            })
        })
    }

    pub async fn order_item(&self, order_item_id: i32) -> ResultEngine<OrderItem> {
        with_tx!(self, |db_tx| {
            let line = self.load_order_item(&db_tx, order_item_id).await?;
            self.order_item_snapshot(&db_tx, line).await
        })
    }

    pub async fn update_order_item(
        &self,
        order_item_id: i32,
        input: OrderItemInput,
        mode: UpdateMode,
    ) -> ResultEngine<OrderItem> {
        with_tx!(self, |db_tx| {
            let current = self.load_order_item(&db_tx, order_item_id).await?;
            let fields = self
                .order_item_fields(&db_tx, input, Some(&current), mode)
                .await?;

            let mut line: order_items::ActiveModel = current.into();
            line.item_id = ActiveValue::Set(fields.item_id);
            line.quantity = ActiveValue::Set(fields.quantity);
            line.price_cents = ActiveValue::Set(fields.price.cents());
            line.updated_at = ActiveValue::Set(Utc::now());
            let line = line.update(&db_tx).await?;

            if let Some(modifier_ids) = &fields.modifiers {
                self.set_order_item_modifiers(&db_tx, line.id, modifier_ids)
                    .await?;
            }
            self.order_item_snapshot(&db_tx, line).await
        })
    }

    pub async fn delete_order_item(&self, order_item_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let line = self.load_order_item(&db_tx, order_item_id).await?;
            order_items::Entity::delete_by_id(line.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
