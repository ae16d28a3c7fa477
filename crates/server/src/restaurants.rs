//! Restaurant API endpoints, including staff assignment.

use api_types::{
    ListResponse,
    restaurant::{EmployeeAssign, EmployeeView, RestaurantQuery, RestaurantView, RestaurantWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    Employee, EngineError, FieldErrors, Requester, Restaurant, RestaurantInput, UpdateMode, User,
};

use crate::{ServerError, page_request, server::ServerState};

fn map_restaurant(restaurant: Restaurant) -> RestaurantView {
    RestaurantView {
        id: restaurant.id,
        company: restaurant.company_id,
        owner: restaurant.owner_id,
        name: restaurant.name,
        description: restaurant.description,
        phone_number: restaurant.phone_number,
        email: restaurant.email,
        website: restaurant.website,
        address: restaurant.address,
        created_by: restaurant.created_by,
        created_at: restaurant.created_at,
        updated_at: restaurant.updated_at,
    }
}

fn map_employee((user, employee): (User, Employee)) -> EmployeeView {
    EmployeeView {
        user: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        designation: employee.designation,
        restaurant: employee.restaurant_id,
    }
}

fn restaurant_input(payload: RestaurantWrite) -> RestaurantInput {
    RestaurantInput {
        company: payload.company,
        owner: payload.owner,
        name: payload.name,
        description: payload.description,
        phone_number: payload.phone_number,
        email: payload.email,
        website: payload.website,
        address: payload.address,
    }
}

pub async fn list(
    Extension(_requester): Extension<Requester>,
    State(state): State<ServerState>,
    Query(query): Query<RestaurantQuery>,
) -> Result<Json<ListResponse<RestaurantView>>, ServerError> {
    let page = state
        .engine
        .restaurants(query.company, page_request(query.page, query.page_size)?)
        .await?;
    Ok(Json(ListResponse {
        count: page.count,
        results: page.results.into_iter().map(map_restaurant).collect(),
    }))
}

pub async fn create(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<RestaurantWrite>,
) -> Result<(StatusCode, Json<RestaurantView>), ServerError> {
    let restaurant = state
        .engine
        .create_restaurant(&requester, restaurant_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_restaurant(restaurant))))
}

pub async fn get(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<RestaurantView>, ServerError> {
    let restaurant = state.engine.restaurant(&requester, id).await?;
    Ok(Json(map_restaurant(restaurant)))
}

async fn update(
    requester: Requester,
    state: ServerState,
    id: i32,
    payload: RestaurantWrite,
    mode: UpdateMode,
) -> Result<Json<RestaurantView>, ServerError> {
    let restaurant = state
        .engine
        .update_restaurant(&requester, id, restaurant_input(payload), mode)
        .await?;
    Ok(Json(map_restaurant(restaurant)))
}

pub async fn replace(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RestaurantWrite>,
) -> Result<Json<RestaurantView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Replace).await
}

pub async fn patch(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RestaurantWrite>,
) -> Result<Json<RestaurantView>, ServerError> {
    update(requester, state, id, payload, UpdateMode::Partial).await
}

pub async fn remove(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_restaurant(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn employees(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<EmployeeView>>, ServerError> {
    let staff = state.engine.restaurant_employees(&requester, id).await?;
    Ok(Json(staff.into_iter().map(map_employee).collect()))
}

pub async fn assign_employee(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<EmployeeAssign>,
) -> Result<(StatusCode, Json<EmployeeView>), ServerError> {
    let Some(user_id) = payload.user else {
        return Err(
            EngineError::Validation(FieldErrors::single("user", "This field is required.")).into(),
        );
    };
    let assigned = state
        .engine
        .assign_employee(&requester, id, user_id, payload.designation.as_deref())
        .await?;
    tracing::info!("assigned user {user_id} to restaurant {id}");
    Ok((StatusCode::CREATED, Json(map_employee(assigned))))
}

pub async fn unassign_employee(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .unassign_employee(&requester, id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
