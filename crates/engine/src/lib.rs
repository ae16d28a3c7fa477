//! Core of the restaurant ordering backend.
//!
//! [`Engine`] owns the database connection and exposes every operation:
//! accounts and tokens, the company → restaurant → menu/category → item
//! catalog, modifiers, and orders with their lines. Every operation receives
//! the [`Requester`] and enforces the authorization rules in
//! [`permissions`] before touching a row.

pub use error::{EngineError, FieldErrors};
pub use items::Item;
pub use modifiers::Modifier;
pub use money::Money;
pub use ops::{
    CategoryInput, CompanyInput, Engine, EngineBuilder, ItemFilter, ItemInput, MenuInput,
    ModifierInput, OrderInput, OrderItemInput, Page, PageRequest, RestaurantInput, UpdateMode,
    UserInput,
};
pub use order_items::OrderItem;
pub use orders::Order;
pub use permissions::{Access, Requester, RestaurantRef, Scope, Target};
pub use roles::{PaymentMethod, Role};
pub use util::{PASSWORD_SPECIAL_CHARS, generate_order_id, validate_password};

pub type User = users::Model;
pub type Company = companies::Model;
pub type Restaurant = restaurants::Model;
pub type Menu = menus::Model;
pub type Category = categories::Model;
pub type Employee = employees::Model;

mod auth_tokens;
mod categories;
mod companies;
mod customers;
mod employees;
mod error;
mod item_modifiers;
mod items;
mod menus;
mod modifiers;
mod money;
mod ops;
mod order_item_modifiers;
mod order_items;
mod orders;
mod owners;
pub mod permissions;
mod restaurants;
mod roles;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
