use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Money amount in a request body.
///
/// Clients may send either a decimal string (`"12.50"`) or a JSON number
/// (`12.5`). Responses always carry amounts as decimal strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Paginated list body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub count: u64,
    pub results: Vec<T>,
}

/// Plain informational body, e.g. after logout.
#[derive(Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

/// `?page=&page_size=` of lists without filters.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Login {
        pub username: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Token {
        pub token: String,
    }
}

pub mod user {
    use super::*;

    /// Body of `/registration` and of `/user-detail` updates.
    ///
    /// `password` is ignored by updates.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserWrite {
        pub username: Option<String>,
        pub password: Option<String>,
        pub user_type: Option<String>,
        pub email: Option<String>,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub phone_number: Option<String>,
        pub address: Option<String>,
    }

    /// An account as returned by the API; the password never leaves the
    /// server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub username: String,
        pub user_type: String,
        pub email: Option<String>,
        pub first_name: String,
        pub last_name: String,
        pub phone_number: String,
        pub address: String,
        pub is_active: bool,
        pub is_staff: bool,
        pub is_superuser: bool,
        pub date_joined: DateTime<Utc>,
        pub last_login: Option<DateTime<Utc>>,
    }
}

pub mod company {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CompanyWrite {
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CompanyView {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub created_by: Option<i32>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod restaurant {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RestaurantQuery {
        pub company: Option<i32>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RestaurantWrite {
        pub company: Option<i32>,
        /// Defaults to the requester when it is an owner.
        pub owner: Option<i32>,
        pub name: Option<String>,
        pub description: Option<String>,
        pub phone_number: Option<String>,
        pub email: Option<String>,
        pub website: Option<String>,
        pub address: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RestaurantView {
        pub id: i32,
        pub company: i32,
        pub owner: i32,
        pub name: String,
        pub description: Option<String>,
        pub phone_number: String,
        pub email: Option<String>,
        pub website: Option<String>,
        pub address: String,
        pub created_by: Option<i32>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EmployeeAssign {
        pub user: Option<i32>,
        pub designation: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmployeeView {
        pub user: i32,
        pub username: String,
        pub first_name: String,
        pub last_name: String,
        pub designation: String,
        pub restaurant: Option<i32>,
    }
}

/// Menus and categories share their shape.
pub mod section {
    use super::*;

    /// `?restaurant=` filter, also used by the order list.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RestaurantFilter {
        pub restaurant: Option<i32>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SectionWrite {
        pub restaurant: Option<i32>,
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectionView {
        pub id: i32,
        pub restaurant: i32,
        pub name: String,
        pub description: Option<String>,
        pub created_by: Option<i32>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemQuery {
        pub category: Option<i32>,
        pub menu: Option<i32>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemWrite {
        pub menu: Option<i32>,
        pub category: Option<i32>,
        pub name: Option<String>,
        pub description: Option<String>,
        pub price: Option<Amount>,
        pub is_available: Option<bool>,
        pub modifiers: Option<Vec<Uuid>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: i32,
        pub menu: i32,
        pub category: i32,
        pub restaurant: i32,
        pub name: String,
        pub description: Option<String>,
        pub price: String,
        pub is_available: bool,
        pub modifiers: Vec<Uuid>,
        pub created_by: Option<i32>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod modifier {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ModifierWrite {
        pub name: Option<String>,
        pub price: Option<Amount>,
        pub is_available: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ModifierView {
        pub id: Uuid,
        pub name: String,
        pub price: String,
        pub is_available: bool,
        pub created_by: Option<i32>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod order {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderWrite {
        /// Defaults to the requester on creation.
        pub client: Option<i32>,
        pub restaurant: Option<i32>,
        pub address: Option<String>,
        pub total_amount: Option<Amount>,
        /// `card` or `cash`.
        pub payment_method: Option<String>,
        pub is_paid: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderView {
        pub id: i32,
        /// Human readable reference, `ORD-<INITIALS>-<HEX>`.
        pub order_id: String,
        pub client: i32,
        pub restaurant: i32,
        pub address: String,
        pub total_amount: String,
        pub payment_method: String,
        pub is_paid: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderItemQuery {
        pub order: Option<i32>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderItemWrite {
        pub order: Option<i32>,
        pub item: Option<i32>,
        pub quantity: Option<i64>,
        pub price: Option<Amount>,
        pub modifiers: Option<Vec<Uuid>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderItemView {
        pub id: i32,
        pub order: i32,
        pub item: i32,
        pub quantity: u32,
        pub price: String,
        pub modifiers: Vec<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}
