//! Message store schema
//!
//! Migrations are embedded below and tracked with `PRAGMA user_version`.

use crate::error::Result;
use rusqlite::Connection;

/// Version after all migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Migration `i` brings the schema to version `i + 1`
const MIGRATIONS: &[&str] = &[
    // Version 1: messages and their emojis
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id               INTEGER PRIMARY KEY,   -- transcript order
        sent_at          DATETIME NOT NULL,
        sender           TEXT NOT NULL,
        content          TEXT NOT NULL,
        word_count       INTEGER NOT NULL,
        media_kind       TEXT,                  -- 'images', 'videos', 'audio', 'stickers'
        hey_ys           INTEGER,               -- trailing y's of a leading "hey", else NULL
        laughs           INTEGER NOT NULL,      -- 0 or 1
        conversation_id  INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS emojis (
        message_id       INTEGER NOT NULL REFERENCES messages(id),
        emoji            TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender);
    CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, id);
    CREATE INDEX IF NOT EXISTS idx_messages_media ON messages(media_kind) WHERE media_kind IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_emojis_emoji ON emojis(emoji);
    "#,
];

/// Apply every migration newer than the stored `user_version`.
///
/// Each migration runs in its own transaction together with its version bump.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let from = get_schema_version(conn)?;
    let pending = MIGRATIONS.iter().zip(1..).filter(|(_, version)| *version > from);

    for (sql, version) in pending {
        tracing::debug!(from, version, "Applying schema migration");
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(())
}

/// Schema version stored in the database (0 for a fresh one)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |r| r.get(0))?)
}
