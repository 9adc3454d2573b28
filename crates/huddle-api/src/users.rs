use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use huddle_types::api::{RegisterUserRequest, UpdatePresenceRequest};

use crate::error::ApiError;
use crate::{AppState, run_blocking};

pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(move || {
        state
            .chat
            .register_user(&req.name, &req.email, &req.role, req.avatar_url)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = run_blocking(move || state.chat.list_users()).await?;
    Ok(Json(users))
}

pub async fn update_presence(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdatePresenceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(move || state.chat.set_presence(user_id, req.status)).await?;
    Ok(Json(user))
}
