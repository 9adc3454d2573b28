pub mod channels;
pub mod error;
pub mod messages;
pub mod reactions;
pub mod search;
pub mod threads;
pub mod users;

use std::sync::Arc;

use huddle_core::{ChatError, ChatService};

use error::ApiError;

pub struct AppStateInner {
    pub chat: ChatService,
}

pub type AppState = Arc<AppStateInner>;

/// Store calls are blocking (single connection behind a mutex), so every
/// handler runs them off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ChatError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {}", e);
            ApiError::internal(anyhow::anyhow!("task join error"))
        })?
        .map_err(ApiError::from)
}
