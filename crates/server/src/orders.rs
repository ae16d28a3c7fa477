//! Order API endpoints.

use api_types::{
    ListResponse,
    order::{OrderView, OrderWrite},
    section::RestaurantFilter,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Order, OrderInput, Requester, UpdateMode};

use crate::{ServerError, money, page_request, server::ServerState};

fn map_order(order: Order) -> OrderView {
    OrderView {
        id: order.id,
        order_id: order.order_id,
        client: order.client_id,
        restaurant: order.restaurant_id,
        address: order.address,
        total_amount: order.total_amount.to_string(),
        payment_method: order.payment_method.as_str().to_string(),
        is_paid: order.is_paid,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

fn order_input(payload: OrderWrite) -> Result<OrderInput, ServerError> {
    Ok(OrderInput {
        client: payload.client,
        restaurant: payload.restaurant,
        address: payload.address,
        total_amount: money(payload.total_amount, "total_amount")?,
        payment_method: payload.payment_method,
        is_paid: payload.is_paid,
    })
}

pub async fn list(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Query(query): Query<RestaurantFilter>,
) -> Result<Json<ListResponse<OrderView>>, ServerError> {
    let page = state
        .engine
        .orders(query.restaurant, page_request(query.page, query.page_size)?)
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_order).collect(),
    }))
}

pub async fn create(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<OrderWrite>,
) -> Result<(StatusCode, Json<OrderView>), ServerError> {
    let order = state
        .engine
        .create_order(&requester, order_input(payload)?)
        .await?;
    tracing::info!(
        "order {} placed at restaurant {}",
        order.order_id,
        order.restaurant_id
    );
    Ok((StatusCode::CREATED, Json(map_order(order))))
}

pub async fn get(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderView>, ServerError> {
    let order = state.engine.order(id).await?;
    Ok(Json(map_order(order)))
}

async fn update(
    state: ServerState,
    id: i32,
    payload: OrderWrite,
    mode: UpdateMode,
) -> Result<Json<OrderView>, ServerError> {
    let order = state
        .engine
        .update_order(id, order_input(payload)?, mode)
        .await?;
    Ok(Json(map_order(order)))
}

pub async fn replace(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrderWrite>,
) -> Result<Json<OrderView>, ServerError> {
    update(state, id, payload, UpdateMode::Replace).await
}

pub async fn patch(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrderWrite>,
) -> Result<Json<OrderView>, ServerError> {
    update(state, id, payload, UpdateMode::Partial).await
}

pub async fn remove(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
