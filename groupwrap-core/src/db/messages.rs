//! Canonical lines to message rows
//!
//! A canonical header is `[DD.MM.YY, HH:MM:SS] Sender: text`. Lines that are
//! not headers belong to the message above them. Per-message features the
//! analytics queries need (word count, media kind, laughter, "heyyy" length,
//! emojis) are computed here once, before insertion.

use crate::error::Result;
use crate::ingest::parse_flexible;
use crate::types::MediaKind;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static CANONICAL_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d{2}\.\d{2}\.\d{2}, \d{2}:\d{2}:\d{2})\] (.*)$")
        .expect("canonical header pattern")
});

const LAUGH_EMOJIS: &[char] = &['😂', '🤣', '😆', '😹'];

const LAUGH_WORDS: &[&str] = &["haha", "hehe", "lol", "lmao", "jaja", "xaxa", "хаха"];

/// One chat message reassembled from canonical lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sent_at: DateTime<Utc>,
    pub sender: String,
    pub content: String,
    /// Conversation this message belongs to, starting at 1
    pub conversation_id: i64,
}

impl ChatMessage {
    /// Whitespace-separated words in the message.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::detect(&self.content)
    }

    /// Number of trailing `y`s when the message opens with "hey", "heyy", ...
    pub fn hey_ys(&self) -> Option<u32> {
        let first = self.content.split_whitespace().next()?.to_lowercase();
        let word = first.trim_end_matches(|c: char| !c.is_alphanumeric());
        let tail = word.strip_prefix("he")?;

        if !tail.is_empty() && tail.chars().all(|c| c == 'y') {
            u32::try_from(tail.len()).ok()
        } else {
            None
        }
    }

    /// Whether the message laughs, in emoji or in letters.
    pub fn laughs(&self) -> bool {
        if self.content.contains(LAUGH_EMOJIS) {
            return true;
        }
        let lower = self.content.to_lowercase();
        LAUGH_WORDS.iter().any(|w| lower.contains(w))
    }

    /// Emojis in order of appearance; modifiers and joiners are skipped.
    pub fn emojis(&self) -> Vec<char> {
        self.content.chars().filter(|c| is_emoji(*c)).collect()
    }
}

fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    // Skin tone modifiers sit inside the pictograph block
    if (0x1F3FB..=0x1F3FF).contains(&cp) {
        return false;
    }
    matches!(
        cp,
        0x1F000..=0x1F02F
            | 0x1F0A0..=0x1F0FF
            | 0x1F170..=0x1F251
            | 0x1F300..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B50
            | 0x2B55
            | 0x2934
            | 0x2935
            | 0x3030
            | 0x303D
    )
}

/// Reassemble messages from canonical lines.
///
/// Continuations before the first header are discarded, as are headers with
/// no `Sender:` part. A message opens a new conversation when more than
/// `gap_minutes` passed since the previous one.
pub fn parse_messages(lines: &[String], gap_minutes: i64) -> Result<Vec<ChatMessage>> {
    let gap = Duration::minutes(gap_minutes);
    let mut messages: Vec<ChatMessage> = Vec::new();
    let mut conversation_id = 0i64;
    let mut last_sent: Option<DateTime<Utc>> = None;
    // Whether continuation lines still attach to the last pushed message
    let mut open = false;

    for line in lines {
        let Some(caps) = CANONICAL_HEADER.captures(line) else {
            if open {
                if let Some(last) = messages.last_mut() {
                    last.content.push('\n');
                    last.content.push_str(line);
                }
            }
            continue;
        };

        let sent_at = parse_flexible(&caps[1])?;
        let Some((sender, content)) = split_sender(&caps[2]) else {
            open = false;
            continue;
        };

        if last_sent.map_or(true, |prev| sent_at - prev > gap) {
            conversation_id += 1;
        }
        last_sent = Some(sent_at);
        open = true;

        messages.push(ChatMessage {
            sent_at,
            sender: sender.to_string(),
            content: content.to_string(),
            conversation_id,
        });
    }

    Ok(messages)
}

fn split_sender(rest: &str) -> Option<(&str, &str)> {
    let (sender, content) = match rest.split_once(": ") {
        Some(parts) => parts,
        None => (rest.strip_suffix(':')?, ""),
    };
    let sender = sender.trim();
    if sender.is_empty() {
        None
    } else {
        Some((sender, content))
    }
}
