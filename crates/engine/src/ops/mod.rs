use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Select};
use uuid::Uuid;

use crate::{EngineError, FieldErrors, ResultEngine, util::optional_text};

mod access;
mod categories;
mod companies;
mod items;
mod menus;
mod modifiers;
mod order_items;
mod orders;
mod restaurants;
mod users;

pub use categories::CategoryInput;
pub use companies::CompanyInput;
pub use items::{ItemFilter, ItemInput};
pub use menus::MenuInput;
pub use modifiers::ModifierInput;
pub use order_items::OrderItemInput;
pub use orders::OrderInput;
pub use restaurants::RestaurantInput;
pub use users::UserInput;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const REQUIRED: &str = "This field is required.";
const NAME_MAX_LEN: usize = 255;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 500;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// How an update treats fields the caller left out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Every writable field must be present (`PUT`).
    Replace,
    /// Only the given fields change (`PATCH`).
    Partial,
}

impl UpdateMode {
    fn is_partial(self) -> bool {
        self == Self::Partial
    }
}

/// 1-based page selection for list operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request from optional query values.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> ResultEngine<Self> {
        let mut errors = FieldErrors::new();
        let page = page.unwrap_or(1);
        if page == 0 {
            errors.push("page", "Invalid page.");
        }
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            errors.push(
                "page_size",
                format!("Ensure this value is between 1 and {MAX_PAGE_SIZE}."),
            );
        }
        errors.into_result()?;
        Ok(Self { page, page_size })
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
        }
    }

    fn try_map<U>(self, f: impl FnMut(T) -> ResultEngine<U>) -> ResultEngine<Page<U>> {
        Ok(Page {
            count: self.count,
            results: self
                .results
                .into_iter()
                .map(f)
                .collect::<ResultEngine<Vec<_>>>()?,
        })
    }
}

async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    page: PageRequest,
) -> ResultEngine<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(db, page.page_size);
    let count = paginator.num_items().await?;
    let results = paginator.fetch_page(page.page - 1).await?;
    Ok(Page { count, results })
}

fn required<T>(value: Option<T>, field: &str, errors: &mut FieldErrors) -> Option<T> {
    if value.is_none() {
        errors.push(field, REQUIRED);
    }
    value
}

/// Resolve a field for an update: the new value when given, the current one
/// for a partial update, otherwise a "required" error.
fn merged<T>(
    value: Option<T>,
    current: T,
    mode: UpdateMode,
    field: &str,
    errors: &mut FieldErrors,
) -> T {
    match value {
        Some(value) => value,
        None => {
            if !mode.is_partial() {
                errors.push(field, REQUIRED);
            }
            current
        }
    }
}

/// Resolve a nullable text field: blank input clears it, a missing value
/// keeps it whatever the update mode.
fn merged_text(value: Option<&str>, current: Option<String>) -> Option<String> {
    match value {
        Some(value) => optional_text(Some(value)),
        None => current,
    }
}

/// Fold a validation error into `errors`, propagating anything else.
fn absorb(err: EngineError, errors: &mut FieldErrors) -> ResultEngine<()> {
    match err {
        EngineError::Validation(field_errors) => {
            for (field, messages) in field_errors.into_inner() {
                for message in messages {
                    errors.push(&field, message);
                }
            }
            Ok(())
        }
        other => Err(other),
    }
}

/// Keep the value of a lookup, or fold its validation error into `errors`.
fn collect<T>(result: ResultEngine<T>, errors: &mut FieldErrors) -> ResultEngine<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => absorb(err, errors).map(|()| None),
    }
}

/// Drop repeated ids, keeping the first occurrence order.
fn unique_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> EngineError {
    EngineError::KeyNotFound(format!("{kind} {id}"))
}

fn forbidden() -> EngineError {
    EngineError::Forbidden("You do not have permission to perform this action.".to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_rejects_zero() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(MAX_PAGE_SIZE + 1)).is_err());
        assert_eq!(PageRequest::new(None, None).unwrap(), PageRequest::default());
    }

    #[test]
    fn merged_respects_mode() {
        let mut errors = FieldErrors::new();
        assert_eq!(merged(None, 3, UpdateMode::Partial, "n", &mut errors), 3);
        assert!(errors.is_empty());
        assert_eq!(merged(None, 3, UpdateMode::Replace, "n", &mut errors), 3);
        assert!(errors.contains("n"));
        let current = Some("old".to_string());
        assert_eq!(merged_text(None, current.clone()), current);
        assert_eq!(merged_text(Some(" new "), current.clone()).as_deref(), Some("new"));
        assert_eq!(merged_text(Some("  "), current), None);
    }
}
