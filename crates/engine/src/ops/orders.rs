use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    FieldErrors, Money, Order, PaymentMethod, Requester, ResultEngine, generate_order_id, orders,
    util::required_text,
};

use super::{Engine, Page, PageRequest, UpdateMode, absorb, collect, fetch_page, merged, with_tx};

const ADDRESS_MAX_LEN: usize = 500;

#[derive(Clone, Debug, Default)]
pub struct OrderInput {
    /// Defaults to the requester on creation.
    pub client: Option<i32>,
    pub restaurant: Option<i32>,
    pub address: Option<String>,
    pub total_amount: Option<Money>,
    pub payment_method: Option<String>,
    /// Defaults to `false` on creation.
    pub is_paid: Option<bool>,
}

struct OrderFields {
    client_id: i32,
    restaurant_id: i32,
    restaurant_name: String,
    address: String,
    total_amount: Money,
    payment_method: PaymentMethod,
    is_paid: bool,
}

impl Engine {
    async fn order_fields(
        &self,
        db_tx: &DatabaseTransaction,
        input: OrderInput,
        current: Option<&orders::Model>,
        mode: UpdateMode,
    ) -> ResultEngine<OrderFields> {
        let mut errors = FieldErrors::new();

        let client_id = merged(
            input.client,
            current.map_or(0, |order| order.client_id),
            mode,
            "client",
            &mut errors,
        );
        if !errors.contains("client") {
            collect(self.related_user(db_tx, client_id, "client").await, &mut errors)?;
        }

        let restaurant_id = merged(
            input.restaurant,
            current.map_or(0, |order| order.restaurant_id),
            mode,
            "restaurant",
            &mut errors,
        );
        let mut restaurant_name = String::new();
        match current {
            Some(order) if order.restaurant_id != restaurant_id => {
                errors.push("restaurant", "The restaurant of an order cannot be changed.");
            }
            Some(_) => {}
            None if !errors.contains("restaurant") => {
                if let Some(restaurant) = collect(
                    self.related_restaurant(db_tx, restaurant_id, "restaurant")
                        .await,
                    &mut errors,
                )? {
                    restaurant_name = restaurant.name;
                }
            }
            None => {}
        }

        let address = input
            .address
            .as_deref()
            .map(|address| required_text(address, "address", ADDRESS_MAX_LEN, &mut errors));
        let address = merged(
            address,
            current
                .map(|order| order.address.clone())
                .unwrap_or_default(),
            mode,
            "address",
            &mut errors,
        );

        let total_amount = merged(
            input.total_amount,
            current.map_or(Money::ZERO, |order| {
                Money::from_cents(order.total_amount_cents).unwrap_or_default()
            }),
            mode,
            "total_amount",
            &mut errors,
        );

        let payment_method = match input.payment_method.as_deref() {
            Some(value) => match PaymentMethod::try_from(value) {
                Ok(method) => Some(method),
                Err(err) => {
                    absorb(err, &mut errors)?;
                    None
                }
            },
            None => merged(
                None,
                current
                    .and_then(|order| PaymentMethod::try_from(order.payment_method.as_str()).ok()),
                mode,
                "payment_method",
                &mut errors,
            ),
        };

        let is_paid = input
            .is_paid
            .or(current.map(|order| order.is_paid))
            .unwrap_or(false);

        errors.into_result()?;
        Ok(OrderFields {
            client_id,
            restaurant_id,
            restaurant_name,
            address,
            total_amount,
            payment_method: payment_method.unwrap_or(PaymentMethod::Cash),
            is_paid,
        })
    }

    /// Place an order. The client defaults to the requester and the order
    /// reference is generated from the restaurant's name.
    pub async fn create_order(
        &self,
        requester: &Requester,
        mut input: OrderInput,
    ) -> ResultEngine<Order> {
        input.client.get_or_insert(requester.id());
        with_tx!(self, |db_tx| {
            let fields = self
                .order_fields(&db_tx, input, None, UpdateMode::Replace)
                .await?;
            let now = Utc::now();
            let order = orders::ActiveModel {
                order_id: ActiveValue::Set(generate_order_id(&fields.restaurant_name)),
                client_id: ActiveValue::Set(fields.client_id),
                restaurant_id: ActiveValue::Set(fields.restaurant_id),
                address: ActiveValue::Set(fields.address),
                total_amount_cents: ActiveValue::Set(fields.total_amount.cents()),
                payment_method: ActiveValue::Set(fields.payment_method.as_str().to_string()),
                is_paid: ActiveValue::Set(fields.is_paid),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            Order::try_from(order)
        })
    }

    /// List orders, optionally those of one restaurant.
    pub async fn orders(
        &self,
        restaurant: Option<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<Order>> {
        with_tx!(self, |db_tx| {
            let mut select = orders::Entity::find().order_by_asc(orders::Column::Id);
            if let Some(restaurant_id) = restaurant {
                select = select.filter(orders::Column::RestaurantId.eq(restaurant_id));
            }
            fetch_page(&db_tx, select, page)
                .await?
                .try_map(Order::try_from)
        })
    }

    pub async fn order(&self, order_id: i32) -> ResultEngine<Order> {
        with_tx!(self, |db_tx| {
            let order = self.load_order(&db_tx, order_id).await?;
            Order::try_from(order)
        })
    }

    /// Update an order. Its reference and restaurant never change.
    pub async fn update_order(
        &self,
        order_id: i32,
        input: OrderInput,
        mode: UpdateMode,
    ) -> ResultEngine<Order> {
        with_tx!(self, |db_tx| {
            let current = self.load_order(&db_tx, order_id).await?;
            let fields = self
                .order_fields(&db_tx, input, Some(&current), mode)
                .await?;

            let mut order: orders::ActiveModel = current.into();
            order.client_id = ActiveValue::Set(fields.client_id);
            order.address = ActiveValue::Set(fields.address);
            order.total_amount_cents = ActiveValue::Set(fields.total_amount.cents());
            order.payment_method = ActiveValue::Set(fields.payment_method.as_str().to_string());
            order.is_paid = ActiveValue::Set(fields.is_paid);
            order.updated_at = ActiveValue::Set(Utc::now());
            Order::try_from(order.update(&db_tx).await?)
        })
    }

    /// Delete an order and its lines.
    pub async fn delete_order(&self, order_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let order = self.load_order(&db_tx, order_id).await?;
            orders::Entity::delete_by_id(order.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
