use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChannelKind, Presence};

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChannelRequest {
    pub name: String,
    pub kind: ChannelKind,
    pub description: Option<String>,
    pub created_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub kind: Option<ChannelKind>,
}

// -- Threads --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateThreadRequest {
    pub title: String,
    pub created_by: Uuid,
}

// -- Messages --

/// Attachment metadata supplied by the composer. The binary content lives in
/// the external storage service; only the issued URL travels here.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentUpload {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub author_id: Uuid,
    pub body: String,
    /// Advisory mention list from the composer. Accepted for compatibility
    /// and ignored: the server-side parser is the single source of truth.
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleReactionRequest {
    pub user_id: Uuid,
    pub user_name: String,
    pub emoji: String,
}

// -- Search --

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

// -- Directory --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePresenceRequest {
    pub status: Presence,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
