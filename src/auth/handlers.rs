use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        extractors::AuthUser,
    },
    error::AppResult,
    state::AppState,
    users::repo_types::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state
        .auth
        .register(&payload.email, &payload.password, payload.name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let res = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(res))
}

#[instrument(skip(state, caller), fields(user_id = %caller.id, email = %caller.email))]
pub async fn get_me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.find_one(caller.id).await?))
}
