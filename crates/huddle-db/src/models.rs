//! Database row types — these map directly to SQLite rows.
//! Distinct from the huddle-types API models: timestamps stay as the stored
//! TEXT form and JSON columns stay serialized; the core layer converts.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub last_seen: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct ChannelRow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub created_at: String,
    pub created_by: String,
    pub member_count: u32,
    pub unread_count: u32,
    pub last_message_content: Option<String>,
    pub last_message_at: Option<String>,
    pub last_message_author: Option<String>,
}

pub struct ThreadRow {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub created_at: String,
    pub created_by: String,
    pub message_count: u32,
    pub last_activity: String,
    pub is_ai_summarized: bool,
}

pub struct MessageRow {
    pub id: String,
    pub thread_id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub body: String,
    /// JSON array of raw mention tokens
    pub mentions: String,
    /// JSON array of resolved user ids
    pub mention_user_ids: String,
    /// JSON array of attachment objects
    pub attachments: String,
    pub created_at: String,
    pub edited_at: Option<String>,
}

pub struct ReactionRow {
    pub id: String,
    pub message_id: String,
    pub user_id: String,
    pub user_name: String,
    pub emoji: String,
    pub created_at: String,
}

/// Everything `append_message` needs in one place; the facade fills this in
/// after mention extraction and preview truncation.
pub struct NewMessage<'a> {
    pub id: &'a str,
    pub thread_id: &'a str,
    pub author_id: &'a str,
    pub author_name: &'a str,
    pub author_avatar: Option<&'a str>,
    pub body: &'a str,
    pub mentions: &'a str,
    pub mention_user_ids: &'a str,
    pub attachments: &'a str,
    pub created_at: &'a str,
    /// Already-truncated preview for the channel's last-message summary.
    pub preview: &'a str,
}
