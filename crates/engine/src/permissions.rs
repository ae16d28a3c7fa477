//! Authorization predicates and list scoping.
//!
//! Everything here is pure: callers load the requester and the target's
//! ownership chain from the database, then ask these functions for a verdict.

use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Query, SimpleExpr},
};

use crate::{Role, User, restaurants};

/// Whether an operation only reads or also mutates the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// The restaurant an object resolves to, with the user owning it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestaurantRef {
    pub id: i32,
    pub owner_id: i32,
}

impl From<&restaurants::Model> for RestaurantRef {
    fn from(value: &restaurants::Model) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
        }
    }
}

/// Ownership facts about the object an operation touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Target {
    pub created_by: Option<i32>,
    pub restaurant: Option<RestaurantRef>,
}

/// The authenticated user behind a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester {
    pub user: User,
    pub role: Role,
    /// Restaurant assigned to the requester when it is an employee.
    pub employee_restaurant_id: Option<i32>,
}

impl Requester {
    pub fn id(&self) -> i32 {
        self.user.id
    }

    pub fn is_superuser(&self) -> bool {
        self.user.is_superuser
    }

    fn is_creator(&self, target: &Target) -> bool {
        target.created_by == Some(self.user.id)
    }

    fn owns(&self, restaurant: RestaurantRef) -> bool {
        self.role == Role::Owner && restaurant.owner_id == self.user.id
    }

    fn works_at(&self, restaurant: RestaurantRef) -> bool {
        self.role == Role::Employee && self.employee_restaurant_id == Some(restaurant.id)
    }

    /// Object check for menus, categories, items and modifiers.
    ///
    /// Reads are always allowed; writes need one of: superuser, creator,
    /// owner of the target's restaurant, employee of the target's restaurant.
    pub fn is_owner_or_employee_or_read_only(&self, target: &Target, access: Access) -> bool {
        if access == Access::Read || self.is_superuser() || self.is_creator(target) {
            return true;
        }
        target
            .restaurant
            .is_some_and(|restaurant| self.owns(restaurant) || self.works_at(restaurant))
    }

    /// Object check for companies and restaurants, applied to every verb.
    pub fn is_owner(&self, target: &Target) -> bool {
        self.role == Role::Owner || self.is_creator(target)
    }

    /// May the requester add rows under `restaurant`?
    pub fn can_manage_restaurant(&self, restaurant: RestaurantRef) -> bool {
        self.is_superuser() || self.owns(restaurant) || self.works_at(restaurant)
    }

    /// May the requester manage the staff of `restaurant`?
    pub fn can_staff_restaurant(&self, restaurant: RestaurantRef) -> bool {
        self.is_superuser() || self.owns(restaurant)
    }

    pub fn can_create_company_or_restaurant(&self) -> bool {
        self.is_superuser() || self.role == Role::Owner
    }

    pub fn can_create_modifier(&self) -> bool {
        self.is_superuser() || matches!(self.role, Role::Owner | Role::Employee)
    }

    /// Rows of restaurant-bound resources this requester may list.
    pub fn scope(&self) -> Scope {
        if self.is_superuser() {
            return Scope::Unrestricted;
        }
        match (self.role, self.employee_restaurant_id) {
            (Role::Owner, _) => Scope::OwnedBy(self.user.id),
            (Role::Employee, Some(restaurant_id)) => Scope::Restaurant(restaurant_id),
            _ => Scope::Empty,
        }
    }
}

/// Row filter for listing menus, categories and items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Unrestricted,
    /// Rows whose restaurant is owned by this user.
    OwnedBy(i32),
    /// Rows of exactly this restaurant.
    Restaurant(i32),
    Empty,
}

impl Scope {
    /// Build the filter over the column holding the row's restaurant id.
    ///
    /// `None` means the scope admits no row at all.
    pub fn condition<C: ColumnTrait>(self, restaurant_col: C) -> Option<Condition> {
        match self {
            Self::Unrestricted => Some(Condition::all()),
            Self::OwnedBy(owner_id) => {
                let owned = Query::select()
                    .column(restaurants::Column::Id)
                    .from(restaurants::Entity)
                    .and_where(restaurants::Column::OwnerId.eq(owner_id))
                    .to_owned();
                let expr: SimpleExpr = restaurant_col.in_subquery(owned);
                Some(Condition::all().add(expr))
            }
            Self::Restaurant(restaurant_id) => {
                Some(Condition::all().add(restaurant_col.eq(restaurant_id)))
            }
            Self::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn requester(id: i32, role: Role, employee_restaurant_id: Option<i32>) -> Requester {
        Requester {
            user: User {
                id,
                username: format!("user{id}"),
                password: String::new(),
                user_type: role.as_str().to_string(),
                email: None,
                first_name: String::new(),
                last_name: String::new(),
                phone_number: "01700000000".to_string(),
                address: "Somewhere".to_string(),
                is_active: true,
                is_staff: false,
                is_superuser: false,
                date_joined: Utc::now(),
                last_login: None,
            },
            role,
            employee_restaurant_id,
        }
    }

    fn menu_of(restaurant_id: i32, owner_id: i32, created_by: Option<i32>) -> Target {
        Target {
            created_by,
            restaurant: Some(RestaurantRef {
                id: restaurant_id,
                owner_id,
            }),
        }
    }

    #[test]
    fn reads_are_always_allowed() {
        let customer = requester(9, Role::Customer, None);
        assert!(customer.is_owner_or_employee_or_read_only(&menu_of(1, 1, None), Access::Read));
        assert!(!customer.is_owner_or_employee_or_read_only(&menu_of(1, 1, None), Access::Write));
    }

    #[test]
    fn owner_writes_only_own_restaurant() {
        let owner = requester(1, Role::Owner, None);
        assert!(owner.is_owner_or_employee_or_read_only(&menu_of(10, 1, None), Access::Write));
        assert!(!owner.is_owner_or_employee_or_read_only(&menu_of(11, 2, None), Access::Write));
    }

    #[test]
    fn employee_writes_only_assigned_restaurant() {
        let employee = requester(5, Role::Employee, Some(10));
        assert!(employee.is_owner_or_employee_or_read_only(&menu_of(10, 1, None), Access::Write));
        assert!(!employee.is_owner_or_employee_or_read_only(&menu_of(11, 1, None), Access::Write));

        let unassigned = requester(6, Role::Employee, None);
        assert!(!unassigned.is_owner_or_employee_or_read_only(&menu_of(10, 1, None), Access::Write));
    }

    #[test]
    fn creator_and_superuser_always_write() {
        let customer = requester(9, Role::Customer, None);
        assert!(customer.is_owner_or_employee_or_read_only(&menu_of(10, 1, Some(9)), Access::Write));

        let mut admin = requester(7, Role::Customer, None);
        admin.user.is_superuser = true;
        assert!(admin.is_owner_or_employee_or_read_only(&menu_of(10, 1, None), Access::Write));
        assert!(admin.can_manage_restaurant(RestaurantRef { id: 10, owner_id: 1 }));
    }

    #[test]
    fn owner_role_is_recognised_by_is_owner() {
        let company = Target {
            created_by: Some(1),
            restaurant: None,
        };
        // Owners who did not create the company pass as well.
        assert!(requester(2, Role::Owner, None).is_owner(&company));
        assert!(requester(1, Role::Customer, None).is_owner(&company));
        assert!(!requester(3, Role::Employee, None).is_owner(&company));
    }

    #[test]
    fn scope_follows_role() {
        assert_eq!(requester(1, Role::Owner, None).scope(), Scope::OwnedBy(1));
        assert_eq!(
            requester(2, Role::Employee, Some(4)).scope(),
            Scope::Restaurant(4)
        );
        assert_eq!(requester(3, Role::Employee, None).scope(), Scope::Empty);
        assert_eq!(requester(4, Role::Customer, None).scope(), Scope::Empty);

        let mut admin = requester(5, Role::Customer, None);
        admin.user.is_superuser = true;
        assert_eq!(admin.scope(), Scope::Unrestricted);
        assert!(Scope::Empty.condition(crate::menus::Column::RestaurantId).is_none());
    }
}
