use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UpdatePasswordRequest, UpdateUserRequest},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/:id/password", patch(update_password))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state
        .users
        .create(&payload.email, &payload.password, payload.name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.find_all().await?))
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.find_one(id).await?))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update(id, payload.name.as_deref()).await?))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn update_password(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .update_password(id, &payload.old_password, &payload.new_password)
        .await?;
    Ok(Json(user))
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.delete(id).await?))
}
