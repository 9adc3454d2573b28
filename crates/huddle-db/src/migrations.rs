use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// All timestamps are written by the application (the facade's injected
/// clock) — no SQL-side time defaults, so tests with a fixed clock are
/// fully deterministic.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            role        TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'offline',
            last_seen   TEXT,
            avatar_url  TEXT
        );

        CREATE TABLE IF NOT EXISTS channels (
            id                   TEXT PRIMARY KEY,
            name                 TEXT NOT NULL,
            kind                 TEXT NOT NULL,
            description          TEXT,
            created_at           TEXT NOT NULL,
            created_by           TEXT NOT NULL REFERENCES users(id),
            member_count         INTEGER NOT NULL DEFAULT 1,
            unread_count         INTEGER NOT NULL DEFAULT 0,
            last_message_content TEXT,
            last_message_at      TEXT,
            last_message_author  TEXT
        );

        CREATE TABLE IF NOT EXISTS threads (
            id               TEXT PRIMARY KEY,
            channel_id       TEXT NOT NULL REFERENCES channels(id),
            title            TEXT NOT NULL,
            created_at       TEXT NOT NULL,
            created_by       TEXT NOT NULL REFERENCES users(id),
            message_count    INTEGER NOT NULL DEFAULT 0,
            last_activity    TEXT NOT NULL,
            is_ai_summarized INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_threads_channel
            ON threads(channel_id);

        CREATE TABLE IF NOT EXISTS thread_participants (
            thread_id   TEXT NOT NULL REFERENCES threads(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            UNIQUE(thread_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS messages (
            id               TEXT PRIMARY KEY,
            thread_id        TEXT NOT NULL REFERENCES threads(id),
            author_id        TEXT NOT NULL REFERENCES users(id),
            author_name      TEXT NOT NULL,
            author_avatar    TEXT,
            body             TEXT NOT NULL,
            mentions         TEXT NOT NULL DEFAULT '[]',
            mention_user_ids TEXT NOT NULL DEFAULT '[]',
            attachments      TEXT NOT NULL DEFAULT '[]',
            created_at       TEXT NOT NULL,
            edited_at        TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_messages_thread
            ON messages(thread_id);

        CREATE TABLE IF NOT EXISTS reactions (
            id          TEXT PRIMARY KEY,
            message_id  TEXT NOT NULL REFERENCES messages(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            user_name   TEXT NOT NULL,
            emoji       TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            UNIQUE(message_id, user_id, emoji)
        );

        CREATE INDEX IF NOT EXISTS idx_reactions_message
            ON reactions(message_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
