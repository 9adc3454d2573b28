use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use huddle_types::api::CreateThreadRequest;

use crate::error::ApiError;
use crate::{AppState, run_blocking};

pub async fn create_thread(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
    Json(req): Json<CreateThreadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let thread = run_blocking(move || {
        state
            .chat
            .create_thread(channel_id, &req.title, req.created_by)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn list_threads(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let threads = run_blocking(move || state.chat.list_threads(channel_id)).await?;
    Ok(Json(threads))
}
