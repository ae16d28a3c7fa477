//! Company API endpoints.

use api_types::{
    ListResponse, PageQuery,
    company::{CompanyView, CompanyWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Company, CompanyInput, Requester, UpdateMode};

use crate::{ServerError, page_request, server::ServerState};

fn map_company(company: Company) -> CompanyView {
    CompanyView {
        id: company.id,
        name: company.name,
        description: company.description,
        created_by: company.created_by,
        created_at: company.created_at,
        updated_at: company.updated_at,
    }
}

fn company_input(payload: CompanyWrite) -> CompanyInput {
    CompanyInput {
        name: payload.name,
        description: payload.description,
    }
}

pub async fn list(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<CompanyView>>, ServerError> {
    let page = state
        .engine
        .companies(page_request(query.page, query.page_size)?)
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_company).collect(),
    }))
}

pub async fn create(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<CompanyWrite>,
) -> Result<(StatusCode, Json<CompanyView>), ServerError> {
    let company = state
        .engine
        .create_company(&requester, company_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_company(company))))
}

pub async fn get(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<CompanyView>, ServerError> {
    let company = state.engine.company(&requester, id).await?;
    Ok(Json(map_company(company)))
}

async fn update(
    requester: Requester,
    state: ServerState,
    id: i32,
    payload: CompanyWrite,
    mode: UpdateMode,
) -> Result<Json<CompanyView>, ServerError> {
    let company = state
        .engine
        .update_company(&requester, id, company_input(payload), mode)
        .await?;
    Ok(Json(map_company(company)))
}

pub async fn replace(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CompanyWrite>,
) -> Result<Json<CompanyView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Replace).await
}

pub async fn patch(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CompanyWrite>,
) -> Result<Json<CompanyView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Partial).await
}

pub async fn remove(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_company(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
