use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use huddle_types::api::{ChannelQuery, CreateChannelRequest};

use crate::error::ApiError;
use crate::{AppState, run_blocking};

pub async fn create_channel(
    State(state): State<AppState>,
    Json(req): Json<CreateChannelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = run_blocking(move || {
        state
            .chat
            .create_channel(&req.name, req.kind, req.description, req.created_by)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(channel)))
}

pub async fn list_channels(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let channels = run_blocking(move || state.chat.list_channels(query.kind)).await?;
    Ok(Json(channels))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || state.chat.delete_channel(channel_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_channel_read(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || state.chat.mark_channel_read(channel_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
