use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use huddle_types::api::SearchQuery;

use crate::error::ApiError;
use crate::{AppState, run_blocking};

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hits = run_blocking(move || state.chat.search(&query.q)).await?;
    Ok(Json(hits))
}
