use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Company, FieldErrors, Requester, ResultEngine, Target, companies, util::optional_text,
};

use super::{
    Engine, NAME_MAX_LEN, Page, PageRequest, UpdateMode, access::ensure, fetch_page, merged,
    merged_text, required, with_tx,
};

#[derive(Clone, Debug, Default)]
pub struct CompanyInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

fn company_target(company: &companies::Model) -> Target {
    Target {
        created_by: company.created_by,
        restaurant: None,
    }
}

impl Engine {
    /// Add a company. Only owners and superusers may create one.
    pub async fn create_company(
        &self,
        requester: &Requester,
        input: CompanyInput,
    ) -> ResultEngine<Company> {
        ensure(requester.can_create_company_or_restaurant())?;
        let mut errors = FieldErrors::new();
        let name = required(input.name.as_deref(), "name", &mut errors)
            .map(|name| crate::util::required_text(name, "name", NAME_MAX_LEN, &mut errors));

        with_tx!(self, |db_tx| {
            if let Some(name) = &name
                && self.company_name_taken(&db_tx, name, None).await?
            {
                errors.push("name", "company with this name already exists.");
            }
            errors.into_result()?;

            let now = Utc::now();
            let company = companies::ActiveModel {
                name: ActiveValue::Set(name.unwrap_or_default()),
                description: ActiveValue::Set(optional_text(input.description.as_deref())),
                created_by: ActiveValue::Set(Some(requester.id())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            Ok(company.insert(&db_tx).await?)
        })
    }

    /// List every company.
    pub async fn companies(&self, page: PageRequest) -> ResultEngine<Page<Company>> {
        with_tx!(self, |db_tx| {
            let select = companies::Entity::find().order_by_asc(companies::Column::Id);
            fetch_page(&db_tx, select, page).await
        })
    }

    pub async fn company(&self, requester: &Requester, company_id: i32) -> ResultEngine<Company> {
        with_tx!(self, |db_tx| {
            let company = self.load_company(&db_tx, company_id).await?;
            ensure(requester.is_owner(&company_target(&company)))?;
            Ok(company)
        })
    }

    pub async fn update_company(
        &self,
        requester: &Requester,
        company_id: i32,
        input: CompanyInput,
        mode: UpdateMode,
    ) -> ResultEngine<Company> {
        with_tx!(self, |db_tx| {
            let current = self.load_company(&db_tx, company_id).await?;
            ensure(requester.is_owner(&company_target(&current)))?;

            let mut errors = FieldErrors::new();
            let name = merged(
                input.name.as_deref().map(|name| {
                    crate::util::required_text(name, "name", NAME_MAX_LEN, &mut errors)
                }),
                current.name.clone(),
                mode,
                "name",
                &mut errors,
            );
            if name != current.name
                && self
                    .company_name_taken(&db_tx, &name, Some(current.id))
                    .await?
            {
                errors.push("name", "company with this name already exists.");
            }
            errors.into_result()?;

            let description =
                merged_text(input.description.as_deref(), current.description.clone());

            let mut company: companies::ActiveModel = current.into();
            company.name = ActiveValue::Set(name);
            company.description = ActiveValue::Set(description);
            company.updated_at = ActiveValue::Set(Utc::now());
            Ok(company.update(&db_tx).await?)
        })
    }

    /// Delete a company and, by cascade, its whole restaurant tree.
    pub async fn delete_company(
        &self,
        requester: &Requester,
        company_id: i32,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let company = self.load_company(&db_tx, company_id).await?;
            ensure(requester.is_owner(&company_target(&company)))?;
            companies::Entity::delete_by_id(company.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn company_name_taken(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        name: &str,
        exclude: Option<i32>,
    ) -> ResultEngine<bool> {
        let mut query = companies::Entity::find().filter(companies::Column::Name.eq(name));
        if let Some(id) = exclude {
            query = query.filter(companies::Column::Id.ne(id));
        }
        Ok(query.one(db_tx).await?.is_some())
    }
}
