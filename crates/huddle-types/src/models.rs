use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Presence of a directory user. Only `status` and `last_seen` change during
/// a session; everything else on [`User`] is fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Away,
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Offline => "offline",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "online" => Some(Self::Online),
            "away" => Some(Self::Away),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Free-text label ("CFO", "Controller", ...) — not an authorization role.
    pub role: String,
    pub status: Presence,
    pub last_seen: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Team,
    Project,
    Client,
    Private,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Project => "project",
            Self::Client => "client",
            Self::Private => "private",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "team" => Some(Self::Team),
            "project" => Some(Self::Project),
            "client" => Some(Self::Client),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Denormalized summary of the most recent message in a channel.
/// A one-way projection recomputed on every send — never read back by the
/// message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    pub kind: ChannelKind,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub member_count: u32,
    /// Reset to 0 only by mark-read; incremented on every message delivered
    /// into one of this channel's threads.
    pub unread_count: u32,
    pub last_message: Option<LastMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    /// Always equals the number of stored messages in this thread.
    pub message_count: u32,
    pub last_activity: DateTime<Utc>,
    /// Distinct authors, in order of first contribution (creator first).
    pub participants: Vec<Uuid>,
    /// Set by the AI summary panel, never by the messaging core.
    pub is_ai_summarized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Retrieval URL issued by the external attachment storage service.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub author_id: Uuid,
    /// Snapshot of the author's directory name at send time. Kept verbatim
    /// even if the directory entry changes later.
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub body: String,
    /// Raw `@token` captures from the body, in order of appearance.
    pub mentions: Vec<String>,
    /// Directory ids the tokens resolved to at send time (unresolved tokens
    /// contribute nothing).
    pub mention_user_ids: Vec<Uuid>,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<Reaction>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// A single search result: the matched message with its owning thread and
/// channel, so the UI can jump straight to the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub message: Message,
    pub thread: Thread,
    pub channel: Channel,
}
