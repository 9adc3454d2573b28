use crate::Database;
use crate::models::{ChannelRow, MessageRow, NewMessage, ReactionRow, ThreadRow, UserRow};
use anyhow::Result;
use rusqlite::{Row, params};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        role: &str,
        status: &str,
        avatar_url: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, role, status, avatar_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, name, email, role, status, avatar_url],
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, email, role, status, last_seen, avatar_url
                 FROM users WHERE id = ?1",
                [id],
                row_to_user,
            )
            .optional()
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, email, role, status, last_seen, avatar_url
                 FROM users WHERE email = ?1",
                [email],
                row_to_user,
            )
            .optional()
        })
    }

    /// Directory listing in registration order.
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, role, status, last_seen, avatar_url
                 FROM users ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([], row_to_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false if the user is unknown.
    pub fn update_presence(
        &self,
        id: &str,
        status: &str,
        last_seen: Option<&str>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET status = ?1, last_seen = COALESCE(?2, last_seen) WHERE id = ?3",
                params![status, last_seen, id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Channels --

    pub fn insert_channel(
        &self,
        id: &str,
        name: &str,
        kind: &str,
        description: Option<&str>,
        created_at: &str,
        created_by: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO channels (id, name, kind, description, created_at, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, name, kind, description, created_at, created_by],
            )?;
            Ok(())
        })
    }

    pub fn get_channel(&self, id: &str) -> Result<Option<ChannelRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{CHANNEL_SELECT} WHERE id = ?1"),
                [id],
                row_to_channel,
            )
            .optional()
        })
    }

    /// Channels in insertion order, optionally restricted to one kind.
    pub fn list_channels(&self, kind: Option<&str>) -> Result<Vec<ChannelRow>> {
        self.with_conn(|conn| {
            let rows = match kind {
                Some(kind) => {
                    let mut stmt = conn
                        .prepare(&format!("{CHANNEL_SELECT} WHERE kind = ?1 ORDER BY rowid"))?;
                    let rows = stmt
                        .query_map([kind], row_to_channel)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(&format!("{CHANNEL_SELECT} ORDER BY rowid"))?;
                    let rows = stmt
                        .query_map([], row_to_channel)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows)
        })
    }

    /// Returns false if the channel is unknown — the caller decides whether
    /// that is tolerated (mark-read is).
    pub fn mark_channel_read(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("UPDATE channels SET unread_count = 0 WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Removes the channel and everything it owns — reactions, messages,
    /// participants, threads — in one transaction. Returns false if the
    /// channel was unknown.
    pub fn delete_channel_cascade(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM reactions WHERE message_id IN (
                     SELECT m.id FROM messages m
                     JOIN threads t ON m.thread_id = t.id
                     WHERE t.channel_id = ?1)",
                [id],
            )?;
            tx.execute(
                "DELETE FROM messages WHERE thread_id IN (
                     SELECT id FROM threads WHERE channel_id = ?1)",
                [id],
            )?;
            tx.execute(
                "DELETE FROM thread_participants WHERE thread_id IN (
                     SELECT id FROM threads WHERE channel_id = ?1)",
                [id],
            )?;
            tx.execute("DELETE FROM threads WHERE channel_id = ?1", [id])?;
            let deleted = tx.execute("DELETE FROM channels WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(deleted > 0)
        })
    }

    // -- Threads --

    /// Inserts the thread and seeds its participant set with the creator in
    /// one transaction.
    pub fn create_thread(
        &self,
        id: &str,
        channel_id: &str,
        title: &str,
        created_at: &str,
        created_by: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO threads (id, channel_id, title, created_at, created_by, last_activity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?4)",
                params![id, channel_id, title, created_at, created_by],
            )?;
            tx.execute(
                "INSERT INTO thread_participants (thread_id, user_id) VALUES (?1, ?2)",
                params![id, created_by],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_thread(&self, id: &str) -> Result<Option<ThreadRow>> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{THREAD_SELECT} WHERE id = ?1"), [id], row_to_thread)
                .optional()
        })
    }

    /// Threads of a channel in creation order — the reference orders by
    /// creation, not last activity.
    pub fn list_threads(&self, channel_id: &str) -> Result<Vec<ThreadRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{THREAD_SELECT} WHERE channel_id = ?1 ORDER BY rowid"))?;
            let rows = stmt
                .query_map([channel_id], row_to_thread)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch participants for a set of thread ids as
    /// (thread_id, user_id) pairs in first-contribution order.
    pub fn get_participants_for_threads(
        &self,
        thread_ids: &[String],
    ) -> Result<Vec<(String, String)>> {
        if thread_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=thread_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT thread_id, user_id FROM thread_participants
                 WHERE thread_id IN ({}) ORDER BY rowid",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let sql_params: Vec<&dyn rusqlite::types::ToSql> = thread_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(sql_params.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Messages --

    /// Appends a message and applies its side effects atomically: thread
    /// message count + last activity + participant set, and the owning
    /// channel's unread counter + last-message summary. Returns the owning
    /// channel id, or `None` if the thread does not exist (including a
    /// thread that was just cascade-deleted — the append fails rather than
    /// landing in an orphaned record).
    pub fn append_message(&self, msg: &NewMessage<'_>) -> Result<Option<String>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let channel_id: Option<String> = tx
                .query_row(
                    "SELECT channel_id FROM threads WHERE id = ?1",
                    [msg.thread_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(channel_id) = channel_id else {
                return Ok(None);
            };

            tx.execute(
                "INSERT INTO messages (id, thread_id, author_id, author_name, author_avatar,
                                       body, mentions, mention_user_ids, attachments, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    msg.id,
                    msg.thread_id,
                    msg.author_id,
                    msg.author_name,
                    msg.author_avatar,
                    msg.body,
                    msg.mentions,
                    msg.mention_user_ids,
                    msg.attachments,
                    msg.created_at,
                ],
            )?;
            tx.execute(
                "UPDATE threads SET message_count = message_count + 1, last_activity = ?1
                 WHERE id = ?2",
                params![msg.created_at, msg.thread_id],
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO thread_participants (thread_id, user_id) VALUES (?1, ?2)",
                params![msg.thread_id, msg.author_id],
            )?;
            tx.execute(
                "UPDATE channels SET unread_count = unread_count + 1,
                                     last_message_content = ?1,
                                     last_message_at = ?2,
                                     last_message_author = ?3
                 WHERE id = ?4",
                params![msg.preview, msg.created_at, msg.author_name, channel_id],
            )?;

            tx.commit()?;
            Ok(Some(channel_id))
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{MESSAGE_SELECT} WHERE id = ?1"),
                [id],
                row_to_message,
            )
            .optional()
        })
    }

    /// Messages of a thread in arrival order.
    pub fn list_messages(&self, thread_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{MESSAGE_SELECT} WHERE thread_id = ?1 ORDER BY rowid"))?;
            let rows = stmt
                .query_map([thread_id], row_to_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Reactions --

    /// Toggle a reaction inside one transaction: removes the existing
    /// (message, user, emoji) row if present, inserts otherwise. Returns
    /// `None` if the message is unknown, otherwise `Some(added)`.
    pub fn toggle_reaction(
        &self,
        id: &str,
        message_id: &str,
        user_id: &str,
        user_name: &str,
        emoji: &str,
        created_at: &str,
    ) -> Result<Option<bool>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let message_exists: Option<String> = tx
                .query_row("SELECT id FROM messages WHERE id = ?1", [message_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if message_exists.is_none() {
                return Ok(None);
            }

            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM reactions WHERE message_id = ?1 AND user_id = ?2 AND emoji = ?3",
                    params![message_id, user_id, emoji],
                    |row| row.get(0),
                )
                .optional()?;

            let added = if let Some(existing_id) = existing {
                tx.execute("DELETE FROM reactions WHERE id = ?1", [&existing_id])?;
                false
            } else {
                tx.execute(
                    "INSERT INTO reactions (id, message_id, user_id, user_name, emoji, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![id, message_id, user_id, user_name, emoji, created_at],
                )?;
                true
            };

            tx.commit()?;
            Ok(Some(added))
        })
    }

    pub fn get_reactions_for_message(&self, message_id: &str) -> Result<Vec<ReactionRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{REACTION_SELECT} WHERE message_id = ?1 ORDER BY rowid"))?;
            let rows = stmt
                .query_map([message_id], row_to_reaction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch reactions for a set of message IDs.
    pub fn get_reactions_for_messages(&self, message_ids: &[String]) -> Result<Vec<ReactionRow>> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "{REACTION_SELECT} WHERE message_id IN ({}) ORDER BY rowid",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let sql_params: Vec<&dyn rusqlite::types::ToSql> = message_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(sql_params.as_slice(), row_to_reaction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

const CHANNEL_SELECT: &str = "SELECT id, name, kind, description, created_at, created_by,
        member_count, unread_count, last_message_content, last_message_at, last_message_author
 FROM channels";

const THREAD_SELECT: &str = "SELECT id, channel_id, title, created_at, created_by,
        message_count, last_activity, is_ai_summarized
 FROM threads";

const MESSAGE_SELECT: &str = "SELECT id, thread_id, author_id, author_name, author_avatar,
        body, mentions, mention_user_ids, attachments, created_at, edited_at
 FROM messages";

const REACTION_SELECT: &str =
    "SELECT id, message_id, user_id, user_name, emoji, created_at FROM reactions";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        status: row.get(4)?,
        last_seen: row.get(5)?,
        avatar_url: row.get(6)?,
    })
}

fn row_to_channel(row: &Row<'_>) -> rusqlite::Result<ChannelRow> {
    Ok(ChannelRow {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        created_by: row.get(5)?,
        member_count: row.get(6)?,
        unread_count: row.get(7)?,
        last_message_content: row.get(8)?,
        last_message_at: row.get(9)?,
        last_message_author: row.get(10)?,
    })
}

fn row_to_thread(row: &Row<'_>) -> rusqlite::Result<ThreadRow> {
    Ok(ThreadRow {
        id: row.get(0)?,
        channel_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        created_by: row.get(4)?,
        message_count: row.get(5)?,
        last_activity: row.get(6)?,
        is_ai_summarized: row.get(7)?,
    })
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        author_id: row.get(2)?,
        author_name: row.get(3)?,
        author_avatar: row.get(4)?,
        body: row.get(5)?,
        mentions: row.get(6)?,
        mention_user_ids: row.get(7)?,
        attachments: row.get(8)?,
        created_at: row.get(9)?,
        edited_at: row.get(10)?,
    })
}

fn row_to_reaction(row: &Row<'_>) -> rusqlite::Result<ReactionRow> {
    Ok(ReactionRow {
        id: row.get(0)?,
        message_id: row.get(1)?,
        user_id: row.get(2)?,
        user_name: row.get(3)?,
        emoji: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMessage;

    const TS: &str = "2026-02-10T09:00:00Z";

    fn store() -> Database {
        let db = Database::open_in_memory().expect("open");
        db.create_user("u1", "Sarah Johnson", "sarah@example.com", "CFO", "online", None)
            .expect("user u1");
        db.create_user("u2", "Michael Chen", "michael@example.com", "Analyst", "online", None)
            .expect("user u2");
        db.insert_channel("c1", "finance", "team", None, TS, "u1")
            .expect("channel");
        db.create_thread("t1", "c1", "Q4 close", TS, "u1").expect("thread");
        db
    }

    fn message<'a>(id: &'a str, thread_id: &'a str, body: &'a str) -> NewMessage<'a> {
        NewMessage {
            id,
            thread_id,
            author_id: "u1",
            author_name: "Sarah Johnson",
            author_avatar: None,
            body,
            mentions: "[]",
            mention_user_ids: "[]",
            attachments: "[]",
            created_at: TS,
            preview: body,
        }
    }

    #[test]
    fn append_updates_thread_and_channel_in_step() {
        let db = store();
        let channel_id = db
            .append_message(&message("m1", "t1", "numbers are in"))
            .expect("append")
            .expect("thread known");
        assert_eq!(channel_id, "c1");

        let thread = db.get_thread("t1").expect("query").expect("row");
        assert_eq!(thread.message_count, 1);
        assert_eq!(thread.last_activity, TS);

        let channel = db.get_channel("c1").expect("query").expect("row");
        assert_eq!(channel.unread_count, 1);
        assert_eq!(channel.last_message_content.as_deref(), Some("numbers are in"));
        assert_eq!(channel.last_message_author.as_deref(), Some("Sarah Johnson"));
    }

    #[test]
    fn append_into_unknown_thread_is_refused() {
        let db = store();
        let outcome = db
            .append_message(&message("m1", "missing", "hello"))
            .expect("append");
        assert!(outcome.is_none());
        assert!(db.get_message("m1").expect("query").is_none());
    }

    #[test]
    fn toggle_reaction_inserts_then_removes() {
        let db = store();
        db.append_message(&message("m1", "t1", "done")).expect("append");

        let added = db
            .toggle_reaction("r1", "m1", "u2", "Michael Chen", "👍", TS)
            .expect("toggle")
            .expect("message known");
        assert!(added);
        assert_eq!(db.get_reactions_for_message("m1").expect("query").len(), 1);

        let added = db
            .toggle_reaction("r2", "m1", "u2", "Michael Chen", "👍", TS)
            .expect("toggle")
            .expect("message known");
        assert!(!added);
        assert!(db.get_reactions_for_message("m1").expect("query").is_empty());
    }

    #[test]
    fn cascade_delete_leaves_no_descendants() {
        let db = store();
        db.create_thread("t2", "c1", "audit prep", TS, "u2").expect("thread");
        db.append_message(&message("m1", "t1", "one")).expect("append");
        db.append_message(&message("m2", "t2", "two")).expect("append");
        db.toggle_reaction("r1", "m1", "u2", "Michael Chen", "🎉", TS)
            .expect("toggle");

        assert!(db.delete_channel_cascade("c1").expect("delete"));

        assert!(db.get_channel("c1").expect("query").is_none());
        assert!(db.get_thread("t1").expect("query").is_none());
        assert!(db.get_thread("t2").expect("query").is_none());
        assert!(db.get_message("m1").expect("query").is_none());
        assert!(db.get_message("m2").expect("query").is_none());
        assert!(
            db.get_reactions_for_messages(&["m1".into(), "m2".into()])
                .expect("query")
                .is_empty()
        );

        assert!(!db.delete_channel_cascade("c1").expect("second delete"));
    }

    #[test]
    fn channels_list_in_insertion_order_by_kind() {
        let db = store();
        db.insert_channel("c2", "q4-forecast", "project", None, TS, "u1")
            .expect("channel");
        db.insert_channel("c3", "acme-co", "client", None, TS, "u1")
            .expect("channel");
        db.insert_channel("c4", "budget-review", "project", None, TS, "u1")
            .expect("channel");

        let all: Vec<String> = db
            .list_channels(None)
            .expect("list")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(all, ["c1", "c2", "c3", "c4"]);

        let projects: Vec<String> = db
            .list_channels(Some("project"))
            .expect("list")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(projects, ["c2", "c4"]);
    }
}
