//! Row-to-model conversion. Stored values are trusted but not blindly: a
//! corrupt column is logged and replaced with a neutral default rather than
//! failing the whole read.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use huddle_db::models::{ChannelRow, MessageRow, ReactionRow, ThreadRow, UserRow};
use huddle_types::models::{
    Attachment, Channel, ChannelKind, LastMessage, Message, Presence, Reaction, Thread, User,
};

pub(crate) fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

pub(crate) fn parse_ts(raw: &str, what: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} timestamp '{}': {}", what, raw, e);
        DateTime::default()
    })
}

fn parse_opt_ts(raw: Option<&str>, what: &str) -> Option<DateTime<Utc>> {
    raw.map(|r| parse_ts(r, what))
}

fn parse_json<T: serde::de::DeserializeOwned + Default>(raw: &str, what: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt {} column '{}': {}", what, raw, e);
        T::default()
    })
}

pub(crate) fn user_from_row(row: UserRow) -> User {
    User {
        id: parse_id(&row.id, "user"),
        status: Presence::parse(&row.status).unwrap_or_else(|| {
            warn!("Corrupt presence '{}' on user '{}'", row.status, row.id);
            Presence::Offline
        }),
        last_seen: parse_opt_ts(row.last_seen.as_deref(), "user last_seen"),
        name: row.name,
        email: row.email,
        role: row.role,
        avatar_url: row.avatar_url,
    }
}

pub(crate) fn channel_from_row(row: ChannelRow) -> Channel {
    let last_message = match (
        row.last_message_content,
        row.last_message_at,
        row.last_message_author,
    ) {
        (Some(content), Some(at), Some(author)) => Some(LastMessage {
            content,
            timestamp: parse_ts(&at, "channel last_message"),
            author,
        }),
        _ => None,
    };

    Channel {
        id: parse_id(&row.id, "channel"),
        kind: ChannelKind::parse(&row.kind).unwrap_or_else(|| {
            warn!("Corrupt channel kind '{}' on '{}'", row.kind, row.id);
            ChannelKind::Team
        }),
        created_at: parse_ts(&row.created_at, "channel"),
        created_by: parse_id(&row.created_by, "channel creator"),
        name: row.name,
        description: row.description,
        member_count: row.member_count,
        unread_count: row.unread_count,
        last_message,
    }
}

pub(crate) fn thread_from_row(row: ThreadRow, participants: Vec<Uuid>) -> Thread {
    Thread {
        id: parse_id(&row.id, "thread"),
        channel_id: parse_id(&row.channel_id, "thread channel"),
        created_at: parse_ts(&row.created_at, "thread"),
        created_by: parse_id(&row.created_by, "thread creator"),
        last_activity: parse_ts(&row.last_activity, "thread last_activity"),
        title: row.title,
        message_count: row.message_count,
        participants,
        is_ai_summarized: row.is_ai_summarized,
    }
}

pub(crate) fn message_from_row(row: MessageRow, reactions: Vec<Reaction>) -> Message {
    Message {
        id: parse_id(&row.id, "message"),
        thread_id: parse_id(&row.thread_id, "message thread"),
        author_id: parse_id(&row.author_id, "message author"),
        created_at: parse_ts(&row.created_at, "message"),
        edited_at: parse_opt_ts(row.edited_at.as_deref(), "message edited_at"),
        mentions: parse_json::<Vec<String>>(&row.mentions, "message mentions"),
        mention_user_ids: parse_json::<Vec<Uuid>>(&row.mention_user_ids, "message mention ids"),
        attachments: parse_json::<Vec<Attachment>>(&row.attachments, "message attachments"),
        author_name: row.author_name,
        author_avatar: row.author_avatar,
        body: row.body,
        reactions,
    }
}

pub(crate) fn reaction_from_row(row: ReactionRow) -> Reaction {
    Reaction {
        id: parse_id(&row.id, "reaction"),
        message_id: parse_id(&row.message_id, "reaction message"),
        user_id: parse_id(&row.user_id, "reaction user"),
        created_at: parse_ts(&row.created_at, "reaction"),
        user_name: row.user_name,
        emoji: row.emoji,
    }
}
