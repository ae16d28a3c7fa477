//! Registration, token login/logout and the requester's own account.

use api_types::{
    Detail,
    auth::{Login, Token},
    user::{UserView, UserWrite},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Requester, UpdateMode, User, UserInput};

use crate::{ServerError, server::ServerState};

fn map_user(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        user_type: user.user_type,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        phone_number: user.phone_number,
        address: user.address,
        is_active: user.is_active,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
        date_joined: user.date_joined,
        last_login: user.last_login,
    }
}

fn user_input(payload: UserWrite) -> UserInput {
    UserInput {
        username: payload.username,
        password: payload.password,
        user_type: payload.user_type,
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone_number: payload.phone_number,
        address: payload.address,
        designation: None,
    }
}

pub async fn registration(
    State(state): State<ServerState>,
    Json(payload): Json<UserWrite>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state.engine.register(user_input(payload)).await?;
    tracing::info!("registered user {} as {}", user.username, user.user_type);
    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<Token>, ServerError> {
    let token = state
        .engine
        .login(payload.username.as_deref(), payload.password.as_deref())
        .await?;
    Ok(Json(Token { token }))
}

pub async fn logout(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
) -> Result<Json<Detail>, ServerError> {
    state.engine.logout(&requester).await?;
    Ok(Json(Detail {
        detail: "Successfully logged out.".to_string(),
    }))
}

pub async fn user_detail(Extension(requester): Extension<Requester>) -> Json<UserView> {
    Json(map_user(requester.user))
}

async fn update(
    requester: Requester,
    state: ServerState,
    payload: UserWrite,
    mode: UpdateMode,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .update_user(&requester, user_input(payload), mode)
        .await?;
    Ok(Json(map_user(user)))
}

pub async fn replace_user(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<UserWrite>,
) -> Result<Json<UserView>, ServerError> {
    update(requester, state, payload, UpdateMode::Replace).await
}

pub async fn patch_user(
    Extension(requester): Extension<Requester>,
    State(state): State<ServerState>,
    Json(payload): Json<UserWrite>,
) -> Result<Json<UserView>, ServerError> {
    update(requester, state, payload, UpdateMode::Partial).await
}
