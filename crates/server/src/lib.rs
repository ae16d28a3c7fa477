use std::collections::BTreeMap;

use api_types::Amount;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Money, PageRequest};

use serde::Serialize;
pub use server::{app, run_with_listener};

mod auth;
mod categories;
mod companies;
mod items;
mod menus;
mod modifiers;
mod order_items;
mod orders;
mod restaurants;
mod server;

pub enum ServerError {
    Engine(EngineError),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_)
        | EngineError::InvalidCredentials
        | EngineError::InactiveUser
        | EngineError::ExistingKey(_) => StatusCode::BAD_REQUEST,
        EngineError::Unauthenticated => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Hashing(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        EngineError::Hashing(reason) => {
            tracing::error!("password hashing failed: {reason}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        EngineError::Validation(fields) => Error {
            error: "Invalid input.".to_string(),
            fields: Some(fields.into_inner()),
        },
        EngineError::Forbidden(message) => Error {
            error: message,
            fields: None,
        },
        other => Error {
            error: other.to_string(),
            fields: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let ServerError::Engine(err) = self;
        let status = status_for_engine_error(&err);
        (status, Json(body_for_engine_error(err))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parse an optional wire amount, reporting failures on `field`.
fn money(amount: Option<Amount>, field: &str) -> Result<Option<Money>, EngineError> {
    amount
        .map(|amount| Money::parse_field(&amount.to_string(), field))
        .transpose()
}

fn page_request(page: Option<u64>, page_size: Option<u64>) -> Result<PageRequest, ServerError> {
    Ok(PageRequest::new(page, page_size)?)
}
