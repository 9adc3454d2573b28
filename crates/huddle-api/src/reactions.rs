use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use huddle_types::api::ToggleReactionRequest;

use crate::error::ApiError;
use crate::{AppState, run_blocking};

/// Returns the updated message with its recomputed reaction list so the
/// caller can re-render in place.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Json(req): Json<ToggleReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = run_blocking(move || {
        state
            .chat
            .toggle_reaction(message_id, req.user_id, &req.user_name, &req.emoji)
    })
    .await?;

    Ok(Json(message))
}
