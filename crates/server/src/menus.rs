use api_types::{
    ListResponse,
    section::{RestaurantFilter, SectionView, SectionWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Menu, MenuInput, Requester, UpdateMode};

use crate::{ServerError, page_request, server::ServerState};

fn map_menu(menu: Menu) -> SectionView {
    SectionView {
        id: menu.id,
        restaurant: menu.restaurant_id,
        name: menu.name,
        description: menu.description,
        created_by: menu.created_by,
        created_at: menu.created_at,
        updated_at: menu.updated_at,
    }
}

fn menu_input(payload: SectionWrite) -> MenuInput {
    MenuInput {
        restaurant: payload.restaurant,
        name: payload.name,
        description: payload.description,
    }
}

pub async fn list(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Query(query): Query<RestaurantFilter>,
) -> Result<Json<ListResponse<SectionView>>, ServerError> {
    let page = state
        .engine
        .menus(
            &requester,
            query.restaurant,
            page_request(query.page, query.page_size)?,
        )
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_menu).collect(),
    }))
}

pub async fn create(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<SectionWrite>,
) -> Result<(StatusCode, Json<SectionView>), ServerError> {
    let menu = state
        .engine
        .create_menu(&requester, menu_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_menu(menu))))
}

pub async fn get(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<SectionView>, ServerError> {
    let menu = state.engine.menu(&requester, id).await?;
    Ok(Json(map_menu(menu)))
}

async fn update(
    requester: Requester,
    state: ServerState,
    id: i32,
    payload: SectionWrite,
    mode: UpdateMode,
) -> Result<Json<SectionView>, ServerError> {
    let menu = state
        .engine
        .update_menu(&requester, id, menu_input(payload), mode)
        .await?;
    Ok(Json(map_menu(menu)))
}

pub async fn replace(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<SectionWrite>,
) -> Result<Json<SectionView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Replace).await
}

pub async fn patch(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<SectionWrite>,
) -> Result<Json<SectionView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Partial).await
}

pub async fn remove(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_menu(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
