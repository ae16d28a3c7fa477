use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{Access, Category, Requester, ResultEngine, categories};

use super::{
    Engine, Page, PageRequest, UpdateMode, access::ensure, fetch_page, menus::SectionRow, with_tx,
};

#[derive(Clone, Debug, Default)]
pub struct CategoryInput {
    pub restaurant: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Engine {
    pub async fn create_category(
        &self,
        requester: &Requester,
        input: CategoryInput,
    ) -> ResultEngine<Category> {
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
            let category = categories::ActiveModel {
                restaurant_id: ActiveValue::Set(fields.restaurant_id),
                name: ActiveValue::Set(fields.name),
                description: ActiveValue::Set(fields.description),
                created_by: ActiveValue::Set(Some(requester.id())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            Ok(category.insert(&db_tx).await?)
        })
    }

    pub async fn categories(
        &self,
        requester: &Requester,
        restaurant: Option<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<Category>> {
        let Some(scope) = requester
            .scope()
            .condition(categories::Column::RestaurantId)
        else {
            return Ok(Page::empty());
        };
        with_tx!(self, |db_tx| {
            let mut select = categories::Entity::find()
                .filter(scope)
                .order_by_asc(categories::Column::Id);
            if let Some(restaurant_id) = restaurant {
                select = select.filter(categories::Column::RestaurantId.eq(restaurant_id));
            }
            fetch_page(&db_tx, select, page).await
        })
    }

    pub async fn category(
        &self,
        requester: &Requester,
        category_id: i32,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            self.category_with_access(&db_tx, requester, category_id, Access::Read)
                .await
        })
    }

    pub async fn update_category(
        &self,
        requester: &Requester,
        category_id: i32,
        input: CategoryInput,
        mode: UpdateMode,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let current = self
                .category_with_access(&db_tx, requester, category_id, Access::Write)
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

            let mut category: categories::ActiveModel = current.into();
            category.name = ActiveValue::Set(fields.name);
            category.description = ActiveValue::Set(fields.description);
            category.updated_at = ActiveValue::Set(Utc::now());
            Ok(category.update(&db_tx).await?)
        })
    }

    /// Delete a category; its items go with it.
    pub async fn delete_category(
        &self,
        requester: &Requester,
        category_id: i32,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let category = self
                .category_with_access(&db_tx, requester, category_id, Access::Write)
                .await?;
            categories::Entity::delete_by_id(category.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn category_with_access(
        &self,
        db_tx: &DatabaseTransaction,
        requester: &Requester,
        category_id: i32,
        access: Access,
    ) -> ResultEngine<categories::Model> {
        let category = self.load_category(db_tx, category_id).await?;
        let target = self
            .restaurant_target(db_tx, category.restaurant_id, category.created_by)
            .await?;
        ensure(requester.is_owner_or_employee_or_read_only(&target, access))?;
        Ok(category)
    }
}
