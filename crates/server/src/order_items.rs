use api_types::{
    ListResponse,
    order::{OrderItemQuery, OrderItemView, OrderItemWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{OrderItem, OrderItemInput, Requester, UpdateMode};

use crate::{ServerError, money, page_request, server::ServerState};

fn map_order_item(line: OrderItem) -> OrderItemView {
    OrderItemView {
        id: line.id,
        order: line.order_id,
        item: line.item_id,
        quantity: line.quantity,
        price: line.price.to_string(),
        modifiers: line.modifiers,
        created_at: line.created_at,
        updated_at: line.updated_at,
    }
}

fn order_item_input(payload: OrderItemWrite) -> Result<OrderItemInput, ServerError> {
    Ok(OrderItemInput {
        order: payload.order,
        item: payload.item,
        quantity: payload.quantity,
        price: money(payload.price, "price")?,
        modifiers: payload.modifiers,
    })
}

pub async fn list(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Query(query): Query<OrderItemQuery>,
) -> Result<Json<ListResponse<OrderItemView>>, ServerError> {
    let page = state
        .engine
        .order_items(query.order, page_request(query.page, query.page_size)?)
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_order_item).collect(),
    }))
}

pub async fn create(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<OrderItemWrite>,
) -> Result<(StatusCode, Json<OrderItemView>), ServerError> {
    let line = state
        .engine
        .create_order_item(order_item_input(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(map_order_item(line))))
}

pub async fn get(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderItemView>, ServerError> {
    let line = state.engine.order_item(id).await?;
    Ok(Json(map_order_item(line)))
}

async fn update(
    state: ServerState,
    id: i32,
    payload: OrderItemWrite,
    mode: UpdateMode,
) -> Result<Json<OrderItemView>, ServerError> {
    let line = state
        .engine
        .update_order_item(id, order_item_input(payload)?, mode)
        .await?;
    Ok(Json(map_order_item(line)))
}

pub async fn replace(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrderItemWrite>,
) -> Result<Json<OrderItemView>, ServerError> {
    update(state, id, payload, UpdateMode::Replace).await
}

pub async fn patch(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrderItemWrite>,
) -> Result<Json<OrderItemView>, ServerError> {
    update(state, id, payload, UpdateMode::Partial).await
}

pub async fn remove(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_order_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
