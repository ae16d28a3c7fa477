use api_types::{
    ListResponse,
    section::{RestaurantFilter, SectionView, SectionWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Category, CategoryInput, Requester, UpdateMode};

use crate::{ServerError, page_request, server::ServerState};

fn map_category(category: Category) -> SectionView {
    SectionView {
        id: category.id,
        restaurant: category.restaurant_id,
        name: category.name,
        description: category.description,
        created_by: category.created_by,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

fn category_input(payload: SectionWrite) -> CategoryInput {
    CategoryInput {
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
        .categories(
            &requester,
            query.restaurant,
            page_request(query.page, query.page_size)?,
        )
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_category).collect(),
    }))
}

pub async fn create(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<SectionWrite>,
) -> Result<(StatusCode, Json<SectionView>), ServerError> {
    let category = state
        .engine
        .create_category(&requester, category_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn get(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<SectionView>, ServerError> {
    let category = state.engine.category(&requester, id).await?;
    Ok(Json(map_category(category)))
}

async fn update(
    requester: Requester,
    state: ServerState,
    id: i32,
    payload: SectionWrite,
    mode: UpdateMode,
) -> Result<Json<SectionView>, ServerError> {
    let category = state
        .engine
        .update_category(&requester, id, category_input(payload), mode)
        .await?;
    Ok(Json(map_category(category)))
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
    state.engine.delete_category(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
