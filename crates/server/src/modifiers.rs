//! Modifier API endpoints. Modifiers are global and keyed by UUID.

use api_types::{
    ListResponse, PageQuery,
    modifier::{ModifierView, ModifierWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Modifier, ModifierInput, Requester, UpdateMode};
use uuid::Uuid;

use crate::{ServerError, money, page_request, server::ServerState};

fn map_modifier(modifier: Modifier) -> ModifierView {
    ModifierView {
        id: modifier.id,
        name: modifier.name,
        price: modifier.price.to_string(),
        is_available: modifier.is_available,
        created_by: modifier.created_by,
        created_at: modifier.created_at,
        updated_at: modifier.updated_at,
    }
}

fn modifier_input(payload: ModifierWrite) -> Result<ModifierInput, ServerError> {
    Ok(ModifierInput {
        name: payload.name,
        price: money(payload.price, "price")?,
        is_available: payload.is_available,
    })
}

pub async fn list(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<ModifierView>>, ServerError> {
    let page = state
        .engine
        .modifiers(page_request(query.page, query.page_size)?)
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_modifier).collect(),
    }))
}

pub async fn create(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<ModifierWrite>,
) -> Result<(StatusCode, Json<ModifierView>), ServerError> {
    let modifier = state
        .engine
        .create_modifier(&requester, modifier_input(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(map_modifier(modifier))))
}

pub async fn get(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ModifierView>, ServerError> {
    let modifier = state.engine.modifier(id).await?;
    Ok(Json(map_modifier(modifier)))
}

async fn update(
    requester: Requester,
    state: ServerState,
    id: Uuid,
    payload: ModifierWrite,
    mode: UpdateMode,
) -> Result<Json<ModifierView>, ServerError> {
    let modifier = state
        .engine
        .update_modifier(&requester, id, modifier_input(payload)?, mode)
        .await?;
    Ok(Json(map_modifier(modifier)))
}

pub async fn replace(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModifierWrite>,
) -> Result<Json<ModifierView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Replace).await
}

pub async fn patch(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModifierWrite>,
) -> Result<Json<ModifierView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Partial).await
}

pub async fn remove(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_modifier(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
