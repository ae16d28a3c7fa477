//! Menu item API endpoints.

use api_types::{
    ListResponse,
    item::{ItemQuery, ItemView, ItemWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Item, ItemFilter, ItemInput, Requester, UpdateMode};

use crate::{ServerError, money, page_request, server::ServerState};

fn map_item(item: Item) -> ItemView {
    ItemView {
        id: item.id,
        menu: item.menu_id,
        category: item.category_id,
        restaurant: item.restaurant_id,
        name: item.name,
        description: item.description,
        price: item.price.to_string(),
        is_available: item.is_available,
        modifiers: item.modifiers,
        created_by: item.created_by,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

fn item_input(payload: ItemWrite) -> Result<ItemInput, ServerError> {
    Ok(ItemInput {
        menu: payload.menu,
        category: payload.category,
        name: payload.name,
        description: payload.description,
        price: money(payload.price, "price")?,
        is_available: payload.is_available,
        modifiers: payload.modifiers,
    })
}

pub async fn list(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<ListResponse<ItemView>>, ServerError> {
    let filter = ItemFilter {
        category: query.category,
        menu: query.menu,
    };
    let page = state
        .engine
        .items(&requester, filter, page_request(query.page, query.page_size)?)
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_item).collect(),
    }))
}

pub async fn create(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<ItemWrite>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let item = state
        .engine
        .create_item(&requester, item_input(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(map_item(item))))
}

pub async fn get(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state.engine.item(&requester, id).await?;
    Ok(Json(map_item(item)))
}

async fn update(
    requester: Requester,
    state: ServerState,
    id: i32,
    payload: ItemWrite,
    mode: UpdateMode,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .update_item(&requester, id, item_input(payload)?, mode)
        .await?;
    Ok(Json(map_item(item)))
}

pub async fn replace(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ItemWrite>,
) -> Result<Json<ItemView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Replace).await
}

pub async fn patch(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ItemWrite>,
) -> Result<Json<ItemView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Partial).await
}

pub async fn remove(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_item(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
