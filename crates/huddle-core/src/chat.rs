use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use huddle_db::Database;
use huddle_db::models::{NewMessage, ReactionRow};
use huddle_types::api::AttachmentUpload;
use huddle_types::events::ChatEvent;
use huddle_types::models::{
    Attachment, Channel, ChannelKind, Message, Presence, Reaction, SearchHit, Thread, User,
};

use crate::clock::{Clock, SystemClock};
use crate::convert;
use crate::dispatcher::Dispatcher;
use crate::error::{ChatError, ChatResult};
use crate::mentions;
use crate::search;

/// Channel previews keep the first 50 characters of the latest message.
const PREVIEW_LIMIT: usize = 50;

/// The messaging facade: the single entry point collaborators use. Composes
/// the store, the mention parser, the search scan and the event dispatcher.
/// Mutations run one at a time against the store's single connection, so a
/// message append and its thread/channel side effects land atomically.
pub struct ChatService {
    db: Database,
    clock: Arc<dyn Clock>,
    dispatcher: Dispatcher,
}

impl ChatService {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    /// Build with an explicit time source. Tests pass a [`crate::FixedClock`].
    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Subscribe to the events emitted after each successful mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.dispatcher.subscribe()
    }

    // -- Directory --

    pub fn register_user(
        &self,
        name: &str,
        email: &str,
        role: &str,
        avatar_url: Option<String>,
    ) -> ChatResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::Validation("user name must not be empty".into()));
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(ChatError::Validation("email must not be empty".into()));
        }
        if self.db.get_user_by_email(email)?.is_some() {
            return Err(ChatError::Conflict(format!(
                "email already registered: {email}"
            )));
        }

        let id = Uuid::new_v4();
        self.db.create_user(
            &id.to_string(),
            name,
            email,
            role,
            Presence::Offline.as_str(),
            avatar_url.as_deref(),
        )?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            status: Presence::Offline,
            last_seen: None,
            avatar_url,
        })
    }

    pub fn list_users(&self) -> ChatResult<Vec<User>> {
        let rows = self.db.list_users()?;
        Ok(rows.into_iter().map(convert::user_from_row).collect())
    }

    /// Presence transition. `last_seen` is stamped when the user steps away
    /// or goes offline; coming back online keeps the previous stamp.
    pub fn set_presence(&self, user_id: Uuid, status: Presence) -> ChatResult<User> {
        let last_seen = match status {
            Presence::Online => None,
            Presence::Away | Presence::Offline => Some(self.ts(self.clock.now())),
        };

        let known = self
            .db
            .update_presence(&user_id.to_string(), status.as_str(), last_seen.as_deref())?;
        if !known {
            return Err(ChatError::not_found("user", user_id));
        }

        let user = self.require_user(user_id)?;
        self.dispatcher.broadcast(ChatEvent::PresenceUpdate {
            user_id,
            status,
            last_seen: user.last_seen,
        });
        Ok(user)
    }

    // -- Channels --

    pub fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        description: Option<String>,
        created_by: Uuid,
    ) -> ChatResult<Channel> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::Validation(
                "channel name must not be empty".into(),
            ));
        }
        self.require_user(created_by)?;

        let id = Uuid::new_v4();
        let now = self.clock.now();
        self.db.insert_channel(
            &id.to_string(),
            name,
            kind.as_str(),
            description.as_deref(),
            &self.ts(now),
            &created_by.to_string(),
        )?;

        let channel = Channel {
            id,
            name: name.to_string(),
            kind,
            description,
            created_at: now,
            created_by,
            member_count: 1,
            unread_count: 0,
            last_message: None,
        };
        self.dispatcher.broadcast(ChatEvent::ChannelCreate {
            channel: channel.clone(),
        });
        Ok(channel)
    }

    /// Removes the channel and cascades over its threads, their messages and
    /// reactions. Irreversible.
    pub fn delete_channel(&self, channel_id: Uuid) -> ChatResult<()> {
        let deleted = self.db.delete_channel_cascade(&channel_id.to_string())?;
        if !deleted {
            return Err(ChatError::not_found("channel", channel_id));
        }
        self.dispatcher
            .broadcast(ChatEvent::ChannelDelete { channel_id });
        Ok(())
    }

    /// Resets the unread counter. Unknown ids are tolerated as a silent
    /// no-op — the UI fires this freely while switching channels.
    pub fn mark_channel_read(&self, channel_id: Uuid) -> ChatResult<()> {
        let known = self.db.mark_channel_read(&channel_id.to_string())?;
        if known {
            self.dispatcher
                .broadcast(ChatEvent::ChannelRead { channel_id });
        }
        Ok(())
    }

    /// Channels in insertion order, optionally restricted to one kind.
    pub fn list_channels(&self, kind: Option<ChannelKind>) -> ChatResult<Vec<Channel>> {
        let rows = self.db.list_channels(kind.map(|k| k.as_str()))?;
        Ok(rows.into_iter().map(convert::channel_from_row).collect())
    }

    // -- Threads --

    pub fn create_thread(
        &self,
        channel_id: Uuid,
        title: &str,
        created_by: Uuid,
    ) -> ChatResult<Thread> {
        if self.db.get_channel(&channel_id.to_string())?.is_none() {
            return Err(ChatError::not_found("channel", channel_id));
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::Validation(
                "thread title must not be empty".into(),
            ));
        }
        self.require_user(created_by)?;

        let id = Uuid::new_v4();
        let now = self.clock.now();
        self.db.create_thread(
            &id.to_string(),
            &channel_id.to_string(),
            title,
            &self.ts(now),
            &created_by.to_string(),
        )?;

        let thread = Thread {
            id,
            channel_id,
            title: title.to_string(),
            created_at: now,
            created_by,
            message_count: 0,
            last_activity: now,
            participants: vec![created_by],
            is_ai_summarized: false,
        };
        self.dispatcher.broadcast(ChatEvent::ThreadCreate {
            thread: thread.clone(),
        });
        Ok(thread)
    }

    /// Threads of a channel in creation order.
    pub fn list_threads(&self, channel_id: Uuid) -> ChatResult<Vec<Thread>> {
        if self.db.get_channel(&channel_id.to_string())?.is_none() {
            return Err(ChatError::not_found("channel", channel_id));
        }

        let rows = self.db.list_threads(&channel_id.to_string())?;
        let ids: Vec<String> = rows.iter().map(|t| t.id.clone()).collect();
        let mut participants = group_participants(self.db.get_participants_for_threads(&ids)?);

        Ok(rows
            .into_iter()
            .map(|row| {
                let own = participants.remove(&row.id).unwrap_or_default();
                convert::thread_from_row(row, own)
            })
            .collect())
    }

    // -- Messages --

    /// Appends a message. Mentions are extracted from the body here — any
    /// mention list a composer supplies alongside is advisory and ignored;
    /// the parser is the single source of truth. The append, the thread
    /// metadata update and the channel unread/preview update commit together.
    pub fn send_message(
        &self,
        thread_id: Uuid,
        author_id: Uuid,
        body: &str,
        attachments: Vec<AttachmentUpload>,
    ) -> ChatResult<Message> {
        if self.db.get_thread(&thread_id.to_string())?.is_none() {
            return Err(ChatError::not_found("thread", thread_id));
        }
        let author = self.require_user(author_id)?;

        let mention_tokens = mentions::extract_mentions(body);
        let directory = self.list_users()?;
        let mention_user_ids = mentions::resolve_mentions(&mention_tokens, &directory);

        let attachments: Vec<Attachment> = attachments
            .into_iter()
            .map(|upload| Attachment {
                id: Uuid::new_v4(),
                name: upload.name,
                mime_type: upload.mime_type,
                size_bytes: upload.size_bytes,
                url: upload.url,
            })
            .collect();

        let id = Uuid::new_v4();
        let now = self.clock.now();
        let mentions_json =
            serde_json::to_string(&mention_tokens).context("serialize mentions")?;
        let mention_ids_json =
            serde_json::to_string(&mention_user_ids).context("serialize mention ids")?;
        let attachments_json =
            serde_json::to_string(&attachments).context("serialize attachments")?;

        let channel_id = self
            .db
            .append_message(&NewMessage {
                id: &id.to_string(),
                thread_id: &thread_id.to_string(),
                author_id: &author_id.to_string(),
                author_name: &author.name,
                author_avatar: author.avatar_url.as_deref(),
                body,
                mentions: &mentions_json,
                mention_user_ids: &mention_ids_json,
                attachments: &attachments_json,
                created_at: &self.ts(now),
                preview: &preview(body),
            })?
            .ok_or_else(|| ChatError::not_found("thread", thread_id))?;

        let message = Message {
            id,
            thread_id,
            author_id,
            author_name: author.name,
            author_avatar: author.avatar_url,
            body: body.to_string(),
            mentions: mention_tokens,
            mention_user_ids,
            attachments,
            reactions: vec![],
            created_at: now,
            edited_at: None,
        };
        self.dispatcher.broadcast(ChatEvent::MessageCreate {
            channel_id: convert::parse_id(&channel_id, "channel"),
            message: message.clone(),
        });
        Ok(message)
    }

    /// Messages of a thread in arrival order — never reordered by reactions.
    pub fn list_messages(&self, thread_id: Uuid) -> ChatResult<Vec<Message>> {
        if self.db.get_thread(&thread_id.to_string())?.is_none() {
            return Err(ChatError::not_found("thread", thread_id));
        }

        let rows = self.db.list_messages(&thread_id.to_string())?;
        let ids: Vec<String> = rows.iter().map(|m| m.id.clone()).collect();
        let mut reactions = group_reactions(self.db.get_reactions_for_messages(&ids)?);

        Ok(rows
            .into_iter()
            .map(|row| {
                let own = reactions.remove(&row.id).unwrap_or_default();
                convert::message_from_row(row, own)
            })
            .collect())
    }

    // -- Reactions --

    /// Toggle semantics: the same (user, emoji) pair a second time removes
    /// the reaction instead of duplicating it. Returns the updated message so
    /// callers can re-render.
    pub fn toggle_reaction(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        user_name: &str,
        emoji: &str,
    ) -> ChatResult<Message> {
        self.require_user(user_id)?;

        let id = Uuid::new_v4();
        let now = self.clock.now();
        let added = self
            .db
            .toggle_reaction(
                &id.to_string(),
                &message_id.to_string(),
                &user_id.to_string(),
                user_name,
                emoji,
                &self.ts(now),
            )?
            .ok_or_else(|| ChatError::not_found("message", message_id))?;

        let row = self
            .db
            .get_message(&message_id.to_string())?
            .ok_or_else(|| ChatError::not_found("message", message_id))?;
        let reactions: Vec<Reaction> = self
            .db
            .get_reactions_for_message(&message_id.to_string())?
            .into_iter()
            .map(convert::reaction_from_row)
            .collect();
        let message = convert::message_from_row(row, reactions);

        if added {
            self.dispatcher.broadcast(ChatEvent::ReactionAdd {
                message_id,
                user_id,
                user_name: user_name.to_string(),
                emoji: emoji.to_string(),
            });
        } else {
            self.dispatcher.broadcast(ChatEvent::ReactionRemove {
                message_id,
                user_id,
                emoji: emoji.to_string(),
            });
        }
        Ok(message)
    }

    // -- Search --

    /// Scans every message in the store, in (channel insertion, thread
    /// creation, message arrival) order, matching case-insensitively against
    /// body or author name. Recomputed on every call.
    pub fn search(&self, query: &str) -> ChatResult<Vec<SearchHit>> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();

        for channel_row in self.db.list_channels(None)? {
            let channel_id = channel_row.id.clone();
            let channel = convert::channel_from_row(channel_row);

            let thread_rows = self.db.list_threads(&channel_id)?;
            let thread_ids: Vec<String> = thread_rows.iter().map(|t| t.id.clone()).collect();
            let mut participants =
                group_participants(self.db.get_participants_for_threads(&thread_ids)?);

            for thread_row in thread_rows {
                let thread_id = thread_row.id.clone();
                let own = participants.remove(&thread_id).unwrap_or_default();
                let thread = convert::thread_from_row(thread_row, own);

                let message_rows = self.db.list_messages(&thread_id)?;
                let message_ids: Vec<String> =
                    message_rows.iter().map(|m| m.id.clone()).collect();
                let mut reactions =
                    group_reactions(self.db.get_reactions_for_messages(&message_ids)?);

                for message_row in message_rows {
                    if !search::matches(&needle, &message_row.body, &message_row.author_name) {
                        continue;
                    }
                    let own = reactions.remove(&message_row.id).unwrap_or_default();
                    hits.push(SearchHit {
                        message: convert::message_from_row(message_row, own),
                        thread: thread.clone(),
                        channel: channel.clone(),
                    });
                }
            }
        }

        Ok(hits)
    }

    fn require_user(&self, user_id: Uuid) -> ChatResult<User> {
        match self.db.get_user(&user_id.to_string())? {
            Some(row) => Ok(convert::user_from_row(row)),
            None => Err(ChatError::not_found("user", user_id)),
        }
    }

    fn ts(&self, at: DateTime<Utc>) -> String {
        at.to_rfc3339()
    }
}

/// First `PREVIEW_LIMIT` characters plus an ellipsis marker; shorter bodies
/// are kept verbatim.
fn preview(body: &str) -> String {
    if body.chars().count() > PREVIEW_LIMIT {
        let head: String = body.chars().take(PREVIEW_LIMIT).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

fn group_participants(pairs: Vec<(String, String)>) -> HashMap<String, Vec<Uuid>> {
    let mut grouped: HashMap<String, Vec<Uuid>> = HashMap::new();
    for (thread_id, user_id) in pairs {
        grouped
            .entry(thread_id)
            .or_default()
            .push(convert::parse_id(&user_id, "participant"));
    }
    grouped
}

fn group_reactions(rows: Vec<ReactionRow>) -> HashMap<String, Vec<Reaction>> {
    let mut grouped: HashMap<String, Vec<Reaction>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.message_id.clone())
            .or_default()
            .push(convert::reaction_from_row(row));
    }
    grouped
}
