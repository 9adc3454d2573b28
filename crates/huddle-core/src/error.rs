use thiserror::Error;

/// Failures the messaging core reports to its callers. There are no
/// transient kinds — the store is local and synchronous, nothing retries.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A required field was empty or otherwise malformed.
    #[error("{0}")]
    Validation(String),

    /// A referenced id does not exist in the relevant store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness clash in the directory (duplicate email).
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ChatError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
