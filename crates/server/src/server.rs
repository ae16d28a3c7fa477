use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};

use std::sync::Arc;

use crate::{
    ServerError, auth, categories, companies, items, menus, modifiers, order_items, orders,
    restaurants,
};
use engine::{Engine, EngineError};

static AUTHORIZATION_HEADER: HeaderName = header::AUTHORIZATION;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for token authentication.
///
/// Requests must carry `Authorization: Token <key>` (or `Bearer <key>`).
#[derive(Debug)]
struct TokenHeader(String);

impl Header for TokenHeader {
    fn name() -> &'static HeaderName {
        &AUTHORIZATION_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Some((scheme, key)) = value.trim().split_once(' ') else {
            return Err(AxumError::invalid());
        };
        if !matches!(scheme, "Token" | "Bearer") {
            return Err(AxumError::invalid());
        }
        let key = key.trim();
        if key.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(TokenHeader(key.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&format!("Token {}", self.0)) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode authorization header"),
        }
    }
}

/// Resolve the token to a `Requester` and hand it to the handler.
async fn auth(
    token: Result<TypedHeader<TokenHeader>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(TokenHeader(key))) = token else {
        tracing::warn!("rejected request to {}: missing token", request.uri().path());
        return Err(EngineError::Unauthenticated.into());
    };

    let requester = match state.engine.authenticate(&key).await {
        Ok(requester) => requester,
        Err(err) => {
            tracing::warn!("rejected request to {}: {err}", request.uri().path());
            return Err(err.into());
        }
    };

    tracing::debug!(
        user = requester.user.username.as_str(),
        "{} {}",
        request.method(),
        request.uri().path()
    );
    request.extensions_mut().insert(requester);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/registration", post(auth::registration))
        .route("/login", post(auth::login));

    Router::new()
        .route("/logout", post(auth::logout))
        .route(
            "/user-detail",
            get(auth::user_detail)
                .put(auth::replace_user)
                .patch(auth::patch_user),
        )
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/{id}",
            get(companies::get)
                .put(companies::replace)
                .patch(companies::patch)
                .delete(companies::remove),
        )
        .route(
            "/restaurants",
            get(restaurants::list).post(restaurants::create),
        )
        .route(
            "/restaurants/{id}",
            get(restaurants::get)
                .put(restaurants::replace)
                .patch(restaurants::patch)
                .delete(restaurants::remove),
        )
        .route(
            "/restaurants/{id}/employees",
            get(restaurants::employees).post(restaurants::assign_employee),
        )
        .route(
            "/restaurants/{id}/employees/{user_id}",
            delete(restaurants::unassign_employee),
        )
        .route("/menus", get(menus::list).post(menus::create))
        .route(
            "/menus/{id}",
            get(menus::get)
                .put(menus::replace)
                .patch(menus::patch)
                .delete(menus::remove),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::replace)
                .patch(categories::patch)
                .delete(categories::remove),
        )
        .route("/items", get(items::list).post(items::create))
        .route(
            "/items/{id}",
            get(items::get)
                .put(items::replace)
                .patch(items::patch)
                .delete(items::remove),
        )
        .route("/modifiers", get(modifiers::list).post(modifiers::create))
        .route(
            "/modifiers/{id}",
            get(modifiers::get)
                .put(modifiers::replace)
                .patch(modifiers::patch)
                .delete(modifiers::remove),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/{id}",
            get(orders::get)
                .put(orders::replace)
                .patch(orders::patch)
                .delete(orders::remove),
        )
        .route(
            "/order-items",
            get(order_items::list).post(order_items::create),
        )
        .route(
            "/order-items/{id}",
            get(order_items::get)
                .put(order_items::replace)
                .patch(order_items::patch)
                .delete(order_items::remove),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .merge(public)
        .with_state(state)
}

/// Build the application router around `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}
