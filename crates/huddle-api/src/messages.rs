use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use huddle_types::api::SendMessageRequest;

use crate::error::ApiError;
use crate::{AppState, run_blocking};

pub async fn send_message(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // req.mentions is advisory composer state; the facade's parser is the
    // single source of truth and recomputes the list from the body.
    let message = run_blocking(move || {
        state
            .chat
            .send_message(thread_id, req.author_id, &req.body, req.attachments)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = run_blocking(move || state.chat.list_messages(thread_id)).await?;
    Ok(Json(messages))
}
