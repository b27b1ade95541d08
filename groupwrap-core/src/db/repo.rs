//! Database repository layer
//!
//! Loads canonical lines into SQLite and answers the aggregate queries of
//! [`AnalyticsStore`]. Every query orders ties by name so results do not depend
//! on insertion order.

use super::messages::parse_messages;
use crate::analytics::AnalyticsStore;
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

/// Counts from loading one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Messages inserted
    pub messages: usize,
    /// Emoji occurrences inserted
    pub emojis: usize,
    /// Distinct conversations
    pub conversations: i64,
}

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    // ============================================
    // Loading
    // ============================================

    /// Insert the messages of a canonical line sequence in one transaction.
    pub fn load_lines(&self, lines: &[String], config: &IngestConfig) -> Result<LoadSummary> {
        let messages = parse_messages(lines, config.conversation_gap_minutes)?;

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut summary = LoadSummary::default();

        {
            let mut insert_message = tx.prepare(
                r#"
                INSERT INTO messages
                    (id, sent_at, sender, content, word_count, media_kind, hey_ys, laughs, conversation_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            let mut insert_emoji =
                tx.prepare("INSERT INTO emojis (message_id, emoji) VALUES (?1, ?2)")?;

            for (idx, message) in messages.iter().enumerate() {
                let id = (idx + 1) as i64;
                insert_message.execute(params![
                    id,
                    message.sent_at.to_rfc3339(),
                    message.sender,
                    message.content,
                    message.word_count() as i64,
                    message.media_kind().map(|k| k.as_str()),
                    message.hey_ys(),
                    message.laughs(),
                    message.conversation_id,
                ])?;

                for emoji in message.emojis() {
                    insert_emoji.execute(params![id, emoji.to_string()])?;
                    summary.emojis += 1;
                }
            }
        }

        tx.commit()?;

        summary.messages = messages.len();
        summary.conversations = messages.last().map_or(0, |m| m.conversation_id);

        tracing::debug!(
            messages = summary.messages,
            emojis = summary.emojis,
            conversations = summary.conversations,
            "Loaded canonical lines"
        );

        Ok(summary)
    }

    fn person_counts(&self, sql: &str, param: Option<&str>) -> Result<Vec<PersonCount>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let map_row = |r: &rusqlite::Row<'_>| -> rusqlite::Result<PersonCount> {
            Ok(PersonCount::new(r.get::<_, String>(0)?, r.get(1)?))
        };

        let rows = match param {
            Some(p) => stmt.query_map([p], map_row)?.collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt.query_map([], map_row)?.collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
    }

    fn person_score(&self, query: &'static str, sql: &str) -> Result<PersonScore> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(sql, [], |r| {
            Ok(PersonScore::new(r.get::<_, String>(0)?, r.get::<_, f64>(1)?))
        })
        .optional()?
        .ok_or_else(|| no_rows(query))
    }
}

fn no_rows(query: &'static str) -> Error {
    Error::Aggregate {
        query,
        message: "no qualifying messages".to_string(),
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Aggregate {
            query: "longest_conversation",
            message: format!("bad timestamp {:?}: {}", s, e),
        })
}

impl AnalyticsStore for Database {
    fn total_messages(&self) -> Result<u32> {
        let conn = self.conn.lock().unwrap();
        let total = conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?;
        Ok(total)
    }

    fn messages_per_person(&self) -> Result<Vec<PersonCount>> {
        self.person_counts(
            r#"
            SELECT sender, COUNT(*) AS message_count
            FROM messages
            GROUP BY sender
            ORDER BY message_count DESC, sender ASC
            "#,
            None,
        )
    }

    fn top_emojis(&self, limit: usize) -> Result<Vec<TopEmoji>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT emoji, COUNT(*) AS cnt
            FROM emojis
            GROUP BY emoji
            ORDER BY cnt DESC, emoji ASC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt
            .query_map([limit as i64], |r| {
                Ok(TopEmoji {
                    emoji: r.get(0)?,
                    count: r.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn media_per_person(&self, kind: MediaKind) -> Result<Vec<PersonCount>> {
        self.person_counts(
            r#"
            SELECT sender, COUNT(*) AS cnt
            FROM messages
            WHERE media_kind = ?1
            GROUP BY sender
            ORDER BY cnt DESC, sender ASC
            "#,
            Some(kind.as_str()),
        )
    }

    fn conversation_count(&self) -> Result<u32> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(DISTINCT conversation_id) FROM messages",
            [],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    fn top_couple(&self) -> Result<Couple> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            r#"
            WITH replies AS (
                SELECT
                    sender,
                    LAG(sender) OVER (PARTITION BY conversation_id ORDER BY id) AS previous
                FROM messages
            )
            SELECT MIN(sender, previous) AS one, MAX(sender, previous) AS two, COUNT(*) AS cnt
            FROM replies
            WHERE previous IS NOT NULL AND previous != sender
            GROUP BY one, two
            ORDER BY cnt DESC, one ASC, two ASC
            LIMIT 1
            "#,
            [],
            |r| {
                Ok(Couple {
                    person_one: r.get(0)?,
                    person_two: r.get(1)?,
                    count: r.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| no_rows("couple"))
    }

    fn longest_conversation(&self) -> Result<LongestConversation> {
        let conn = self.conn.lock().unwrap();
        let longest: Option<(i64, String, String)> = conn
            .query_row(
                r#"
                SELECT conversation_id, MIN(sent_at), MAX(sent_at)
                FROM messages
                GROUP BY conversation_id
                ORDER BY julianday(MAX(sent_at)) - julianday(MIN(sent_at)) DESC,
                         conversation_id ASC
                LIMIT 1
                "#,
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?;

        let (conversation_id, start, end) = longest.ok_or_else(|| no_rows("longest_conversation"))?;
        let start = parse_timestamp(&start)?;
        let end = parse_timestamp(&end)?;

        let mut stmt = conn.prepare(
            "SELECT DISTINCT sender FROM messages WHERE conversation_id = ?1 ORDER BY sender",
        )?;
        let participants = stmt
            .query_map([conversation_id], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(LongestConversation {
            start,
            duration_minutes: u32::try_from((end - start).num_minutes()).unwrap_or(0),
            participants,
        })
    }

    fn opener(&self) -> Result<PersonScore> {
        self.person_score(
            "opener",
            r#"
            WITH firsts AS (
                SELECT
                    sender,
                    ROW_NUMBER() OVER (PARTITION BY conversation_id ORDER BY id) AS position
                FROM messages
            )
            SELECT sender, COUNT(*) AS opened
            FROM firsts
            WHERE position = 1
            GROUP BY sender
            ORDER BY opened DESC, sender ASC
            LIMIT 1
            "#,
        )
    }

    fn jester(&self) -> Result<PersonScore> {
        self.person_score(
            "jester",
            r#"
            SELECT sender, COUNT(*) AS laugh_count
            FROM messages
            WHERE laughs = 1
            GROUP BY sender
            ORDER BY laugh_count DESC, sender ASC
            LIMIT 1
            "#,
        )
    }

    fn bot(&self) -> Result<PersonScore> {
        self.person_score(
            "bot",
            r#"
            SELECT sender, AVG(word_count) AS avg_words
            FROM messages
            WHERE media_kind IS NULL
            GROUP BY sender
            ORDER BY avg_words ASC, sender ASC
            LIMIT 1
            "#,
        )
    }

    fn hey_y_average(&self) -> Result<PersonScore> {
        self.person_score(
            "hey_y_average",
            r#"
            SELECT sender, AVG(hey_ys) AS avg_ys
            FROM messages
            WHERE hey_ys IS NOT NULL
            GROUP BY sender
            ORDER BY avg_ys DESC, sender ASC
            LIMIT 1
            "#,
        )
    }
}
