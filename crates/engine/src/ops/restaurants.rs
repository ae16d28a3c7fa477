use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Employee, EngineError, FieldErrors, Requester, Restaurant, RestaurantRef, ResultEngine, Role,
    Target, User, employees, restaurants, users,
    util::{required_text, validate_email, validate_url},
};

use super::{
    Engine, NAME_MAX_LEN, Page, PageRequest, UpdateMode, access::ensure, absorb,
    fetch_page, merged, merged_text, not_found, with_tx,
};

const PHONE_MAX_LEN: usize = 20;
const DESIGNATION_MAX_LEN: usize = 255;

#[derive(Clone, Debug, Default)]
pub struct RestaurantInput {
    pub company: Option<i32>,
    /// Defaults to the requester on creation.
    pub owner: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
}

fn restaurant_target(restaurant: &restaurants::Model) -> Target {
    Target {
        created_by: restaurant.created_by,
        restaurant: Some(RestaurantRef::from(restaurant)),
    }
}

/// Validated column values shared by create and update.
struct RestaurantFields {
    company_id: i32,
    owner_id: i32,
    name: String,
    description: Option<String>,
    phone_number: String,
    email: Option<String>,
    website: Option<String>,
    address: String,
}

impl Engine {
    /// Check the referenced company and owner and the text fields. `current`
    /// is `None` on creation, which always runs in [`UpdateMode::Replace`].
    async fn restaurant_fields(
        &self,
        db_tx: &DatabaseTransaction,
        input: RestaurantInput,
        current: Option<&restaurants::Model>,
        mode: UpdateMode,
    ) -> ResultEngine<RestaurantFields> {
        let mut errors = FieldErrors::new();

        let company_id = merged(
            input.company,
            current.map_or(0, |current| current.company_id),
            mode,
            "company",
            &mut errors,
        );
        if !errors.contains("company")
            && let Err(err) = self.related_company(db_tx, company_id, "company").await
        {
            absorb(err, &mut errors)?;
        }

        let owner_id = merged(
            input.owner,
            current.map_or(0, |current| current.owner_id),
            mode,
            "owner",
            &mut errors,
        );
        if !errors.contains("owner") {
            match self.related_user(db_tx, owner_id, "owner").await {
                Ok(owner) if owner.user_type == Role::Owner.as_str() => {}
                Ok(_) => errors.push("owner", "The selected user is not an owner."),
                Err(err) => absorb(err, &mut errors)?,
            }
        }

        let name = input
            .name
            .as_deref()
            .map(|name| required_text(name, "name", NAME_MAX_LEN, &mut errors));
        let name = merged(
            name,
            current.map(|current| current.name.clone()).unwrap_or_default(),
            mode,
            "name",
            &mut errors,
        );
        if !errors.contains("name") {
            let mut taken =
                restaurants::Entity::find().filter(restaurants::Column::Name.eq(name.as_str()));
            if let Some(current) = current {
                taken = taken.filter(restaurants::Column::Id.ne(current.id));
            }
            if taken.one(db_tx).await?.is_some() {
                errors.push("name", "restaurant with this name already exists.");
            }
        }

        let phone_number = input
            .phone_number
            .as_deref()
            .map(|phone| required_text(phone, "phone_number", PHONE_MAX_LEN, &mut errors));
        let phone_number = merged(
            phone_number,
            current
                .map(|current| current.phone_number.clone())
                .unwrap_or_default(),
            mode,
            "phone_number",
            &mut errors,
        );

        let address = input
            .address
            .as_deref()
            .map(|address| required_text(address, "address", NAME_MAX_LEN, &mut errors));
        let address = merged(
            address,
            current
                .map(|current| current.address.clone())
                .unwrap_or_default(),
            mode,
            "address",
            &mut errors,
        );

        let description = merged_text(
            input.description.as_deref(),
            current.and_then(|current| current.description.clone()),
        );
        let email = merged_text(
            input.email.as_deref(),
            current.and_then(|current| current.email.clone()),
        );
        let website = merged_text(
            input.website.as_deref(),
            current.and_then(|current| current.website.clone()),
        );
        if let Some(email) = &email {
            validate_email(email, "email", &mut errors);
        }
        if let Some(website) = &website {
            validate_url(website, "website", &mut errors);
        }

        errors.into_result()?;
        Ok(RestaurantFields {
            company_id,
            owner_id,
            name,
            description,
            phone_number,
            email,
            website,
            address,
        })
    }

    /// Add a restaurant. Only owners and superusers may create one; the owner
    /// defaults to the requester.
    pub async fn create_restaurant(
        &self,
        requester: &Requester,
        mut input: RestaurantInput,
    ) -> ResultEngine<Restaurant> {
        ensure(requester.can_create_company_or_restaurant())?;
        if input.owner.is_none() && requester.role == Role::Owner {
            input.owner = Some(requester.id());
        }
        with_tx!(self, |db_tx| {
            let fields = self
                .restaurant_fields(&db_tx, input, None, UpdateMode::Replace)
                .await?;
            let now = Utc::now();
            let restaurant = restaurants::ActiveModel {
                company_id: ActiveValue::Set(fields.company_id),
                owner_id: ActiveValue::Set(fields.owner_id),
                name: ActiveValue::Set(fields.name),
                description: ActiveValue::Set(fields.description),
                phone_number: ActiveValue::Set(fields.phone_number),
                email: ActiveValue::Set(fields.email),
                website: ActiveValue::Set(fields.website),
                address: ActiveValue::Set(fields.address),
                created_by: ActiveValue::Set(Some(requester.id())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            Ok(restaurant.insert(&db_tx).await?)
        })
    }

    /// List restaurants, optionally those of one company.
    pub async fn restaurants(
        &self,
        company: Option<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<Restaurant>> {
        with_tx!(self, |db_tx| {
            let mut select = restaurants::Entity::find().order_by_asc(restaurants::Column::Id);
            if let Some(company_id) = company {
                select = select.filter(restaurants::Column::CompanyId.eq(company_id));
            }
            fetch_page(&db_tx, select, page).await
        })
    }

    pub async fn restaurant(
        &self,
        requester: &Requester,
        restaurant_id: i32,
    ) -> ResultEngine<Restaurant> {
        with_tx!(self, |db_tx| {
            let restaurant = self.load_restaurant(&db_tx, restaurant_id).await?;
            ensure(requester.is_owner(&restaurant_target(&restaurant)))?;
            Ok(restaurant)
        })
    }

    pub async fn update_restaurant(
        &self,
        requester: &Requester,
        restaurant_id: i32,
        input: RestaurantInput,
        mode: UpdateMode,
    ) -> ResultEngine<Restaurant> {
        with_tx!(self, |db_tx| {
            let current = self.load_restaurant(&db_tx, restaurant_id).await?;
            ensure(requester.is_owner(&restaurant_target(&current)))?;
            let fields = self
                .restaurant_fields(&db_tx, input, Some(&current), mode)
                .await?;

            let mut restaurant: restaurants::ActiveModel = current.into();
            restaurant.company_id = ActiveValue::Set(fields.company_id);
            restaurant.owner_id = ActiveValue::Set(fields.owner_id);
            restaurant.name = ActiveValue::Set(fields.name);
            restaurant.description = ActiveValue::Set(fields.description);
            restaurant.phone_number = ActiveValue::Set(fields.phone_number);
            restaurant.email = ActiveValue::Set(fields.email);
            restaurant.website = ActiveValue::Set(fields.website);
            restaurant.address = ActiveValue::Set(fields.address);
            restaurant.updated_at = ActiveValue::Set(Utc::now());
            Ok(restaurant.update(&db_tx).await?)
        })
    }

    pub async fn delete_restaurant(
        &self,
        requester: &Requester,
        restaurant_id: i32,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let restaurant = self.load_restaurant(&db_tx, restaurant_id).await?;
            ensure(requester.is_owner(&restaurant_target(&restaurant)))?;
            restaurants::Entity::delete_by_id(restaurant.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Employees assigned to a restaurant. Restaurant owner or superuser only.
    pub async fn restaurant_employees(
        &self,
        requester: &Requester,
        restaurant_id: i32,
    ) -> ResultEngine<Vec<(User, Employee)>> {
        with_tx!(self, |db_tx| {
            let restaurant = self.load_restaurant(&db_tx, restaurant_id).await?;
            ensure(requester.can_staff_restaurant(RestaurantRef::from(&restaurant)))?;

            let rows = employees::Entity::find()
                .filter(employees::Column::RestaurantId.eq(restaurant.id))
                .find_also_related(users::Entity)
                .order_by_asc(employees::Column::UserId)
                .all(&db_tx)
                .await?;
            Ok(rows
                .into_iter()
                .filter_map(|(employee, user)| user.map(|user| (user, employee)))
                .collect())
        })
    }

    /// Assign an employee-role user to a restaurant, moving it away from any
    /// previous one.
    pub async fn assign_employee(
        &self,
        requester: &Requester,
        restaurant_id: i32,
        user_id: i32,
        designation: Option<&str>,
    ) -> ResultEngine<(User, Employee)> {
        with_tx!(self, |db_tx| {
            let restaurant = self.load_restaurant(&db_tx, restaurant_id).await?;
            ensure(requester.can_staff_restaurant(RestaurantRef::from(&restaurant)))?;
            self.place_employee(&db_tx, user_id, Some(restaurant.id), designation)
                .await
        })
    }

    /// Remove an employee from a restaurant it is assigned to.
    pub async fn unassign_employee(
        &self,
        requester: &Requester,
        restaurant_id: i32,
        user_id: i32,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let restaurant = self.load_restaurant(&db_tx, restaurant_id).await?;
            ensure(requester.can_staff_restaurant(RestaurantRef::from(&restaurant)))?;

            let employee = employees::Entity::find_by_id(user_id)
                .filter(employees::Column::RestaurantId.eq(restaurant.id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| not_found("employee", user_id))?;
            self.place_employee(&db_tx, employee.user_id, None, None)
                .await?;
            Ok(())
        })
    }

    /// Administrative assignment, without a requester.
    pub async fn set_employee_restaurant(
        &self,
        user_id: i32,
        restaurant_id: Option<i32>,
        designation: Option<&str>,
    ) -> ResultEngine<(User, Employee)> {
        with_tx!(self, |db_tx| {
            if let Some(restaurant_id) = restaurant_id {
                self.load_restaurant(&db_tx, restaurant_id).await?;
            }
            self.place_employee(&db_tx, user_id, restaurant_id, designation)
                .await
        })
    }

    async fn place_employee(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
        restaurant_id: Option<i32>,
        designation: Option<&str>,
    ) -> ResultEngine<(User, Employee)> {
        let user = self.related_user(db_tx, user_id, "user").await?;
        if user.user_type != Role::Employee.as_str() {
            return Err(EngineError::invalid(
                "user",
                "The selected user is not an employee.",
            ));
        }

        let mut errors = FieldErrors::new();
        let designation = designation.map(|designation| {
            required_text(designation, "designation", DESIGNATION_MAX_LEN, &mut errors)
        });
        errors.into_result()?;

        let employee = employees::Entity::find_by_id(user.id)
            .one(db_tx)
            .await?
            .ok_or_else(|| not_found("employee", user.id))?;
        let mut employee: employees::ActiveModel = employee.into();
        employee.restaurant_id = ActiveValue::Set(restaurant_id);
        if let Some(designation) = designation {
            employee.designation = ActiveValue::Set(designation);
        }
        let employee = employee.update(db_tx).await?;
        Ok((user, employee))
    }
}
