use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Access, FieldErrors, Modifier, Money, Requester, ResultEngine, Target, modifiers,
    util::required_text,
};

use super::{
    Engine, NAME_MAX_LEN, Page, PageRequest, UpdateMode, access::ensure, fetch_page, merged,
    with_tx,
};

#[derive(Clone, Debug, Default)]
pub struct ModifierInput {
    pub name: Option<String>,
    pub price: Option<Money>,
    /// Defaults to `true` on creation.
    pub is_available: Option<bool>,
}

impl Engine {
    /// Add a modifier. Owners, employees and superusers only.
    pub async fn create_modifier(
        &self,
        requester: &Requester,
        input: ModifierInput,
    ) -> ResultEngine<Modifier> {
        ensure(requester.can_create_modifier())?;

        let mut errors = FieldErrors::new();
        let name = input
            .name
            .as_deref()
            .map(|name| required_text(name, "name", NAME_MAX_LEN, &mut errors));
        let name = merged(name, String::new(), UpdateMode::Replace, "name", &mut errors);
        let price = merged(input.price, Money::ZERO, UpdateMode::Replace, "price", &mut errors);
        errors.into_result()?;

        with_tx!(self, |db_tx| {
            let now = Utc::now();
            let modifier = modifiers::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                price_cents: ActiveValue::Set(price.cents()),
                is_available: ActiveValue::Set(input.is_available.unwrap_or(true)),
                created_by: ActiveValue::Set(Some(requester.id())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Modifier::try_from(modifier)
        })
    }

    pub async fn modifiers(&self, page: PageRequest) -> ResultEngine<Page<Modifier>> {
        with_tx!(self, |db_tx| {
            let select = modifiers::Entity::find()
                .order_by_asc(modifiers::Column::CreatedAt)
                .order_by_asc(modifiers::Column::Id);
            fetch_page(&db_tx, select, page)
                .await?
                .try_map(Modifier::try_from)
        })
    }

    pub async fn modifier(&self, modifier_id: Uuid) -> ResultEngine<Modifier> {
        with_tx!(self, |db_tx| {
            let modifier = self.load_modifier(&db_tx, modifier_id).await?;
            Modifier::try_from(modifier)
        })
    }

    pub async fn update_modifier(
        &self,
        requester: &Requester,
        modifier_id: Uuid,
        input: ModifierInput,
        mode: UpdateMode,
    ) -> ResultEngine<Modifier> {
        with_tx!(self, |db_tx| {
            let current = self.writable_modifier(&db_tx, requester, modifier_id).await?;

            let mut errors = FieldErrors::new();
            let name = input
                .name
                .as_deref()
                .map(|name| required_text(name, "name", NAME_MAX_LEN, &mut errors));
            let name = merged(name, current.name.clone(), mode, "name", &mut errors);
            let price = merged(
                input.price.map(Money::cents),
                current.price_cents,
                mode,
                "price",
                &mut errors,
            );
            errors.into_result()?;

            let is_available = input.is_available.unwrap_or(current.is_available);
            let mut modifier: modifiers::ActiveModel = current.into();
            modifier.name = ActiveValue::Set(name);
            modifier.price_cents = ActiveValue::Set(price);
            modifier.is_available = ActiveValue::Set(is_available);
            modifier.updated_at = ActiveValue::Set(Utc::now());
            Modifier::try_from(modifier.update(&db_tx).await?)
        })
    }

    /// Delete a modifier; it disappears from every item and order line.
    pub async fn delete_modifier(
        &self,
        requester: &Requester,
        modifier_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let modifier = self.writable_modifier(&db_tx, requester, modifier_id).await?;
            modifiers::Entity::delete_by_id(modifier.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Modifiers belong to no restaurant, so only their creator and
    /// superusers pass the write check.
    async fn writable_modifier(
        &self,
        db_tx: &DatabaseTransaction,
        requester: &Requester,
        modifier_id: Uuid,
    ) -> ResultEngine<modifiers::Model> {
        let modifier = self.load_modifier(db_tx, modifier_id).await?;
        let target = Target {
            created_by: modifier.created_by,
            restaurant: None,
        };
        ensure(requester.is_owner_or_employee_or_read_only(&target, Access::Write))?;
        Ok(modifier)
    }
}
