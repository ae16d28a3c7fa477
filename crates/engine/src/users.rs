//! Accounts. Every user carries one role and exactly one matching profile row
//! (see [`owners`], [`employees`], [`customers`]).
//!
//! [`owners`]: super::owners
//! [`employees`]: super::employees
//! [`customers`]: super::customers

use sea_orm::entity::prelude::*;

use crate::{ResultEngine, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub user_type: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

impl Model {
    pub fn role(&self) -> ResultEngine<Role> {
        Role::try_from(self.user_type.as_str())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_tokens::Entity")]
    AuthTokens,
    #[sea_orm(has_one = "super::employees::Entity")]
    Employee,
}

impl Related<super::auth_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
