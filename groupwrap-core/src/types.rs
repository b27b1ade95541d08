//! Core domain types for groupwrap
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Convention** | One of the two export line layouts (bracketed vs. dash-separated prefix) |
//! | **Canonical line** | A transcript line whose timestamp was rewritten to `DD.MM.YY, HH:MM:SS` |
//! | **Conversation** | A run of messages with no silence longer than the configured gap |
//! | **Stats** | The aggregate snapshot of one export |
//! | **Card** | A superlative awarded to one participant |
//! | **Rare card** | TIMECHEESE, drawn by chance rather than earned |
//!
//! Field names of [`Stats`] and [`Card`] are part of the JSON output contract
//! and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Conventions
// ============================================

/// Line layout of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    /// `[6.09.25, 15:00:00] Alice: hi`
    #[serde(rename = "IOS_STYLE")]
    Bracketed,
    /// `06/09/2025, 15:00 - Alice: hi`
    #[serde(rename = "ANDROID_STYLE")]
    PrefixSeparator,
}

impl Convention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Convention::Bracketed => "IOS_STYLE",
            Convention::PrefixSeparator => "ANDROID_STYLE",
        }
    }
}

impl std::fmt::Display for Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Cards
// ============================================

/// Kind of superlative a card awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardType {
    /// Most stickers sent
    Grandma,
    /// Started the most conversations
    Opener,
    /// Fewest words per message
    Bot,
    /// Most laughter
    Jester,
    /// Fewest messages
    Lurker,
    /// Most images, videos and audio
    Spammer,
    /// Most messages
    Core,
    /// Longest "heyyy"s
    BasicBitch,
    /// Random drop
    TimeCheese,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Grandma => "GRANDMA",
            CardType::Opener => "OPENER",
            CardType::Bot => "BOT",
            CardType::Jester => "JESTER",
            CardType::Lurker => "LURKER",
            CardType::Spammer => "SPAMMER",
            CardType::Core => "CORE",
            CardType::BasicBitch => "BASICBITCH",
            CardType::TimeCheese => "TIMECHEESE",
        }
    }

    /// Get the tagline shown under the card.
    pub fn tagline(&self) -> &'static str {
        match self {
            CardType::Grandma => "Communicates exclusively in stickers",
            CardType::Opener => "Always the one to break the silence",
            CardType::Bot => "Says a lot with very few words",
            CardType::Jester => "Keeps the group laughing",
            CardType::Lurker => "Reads everything, says nothing",
            CardType::Spammer => "The camera roll never sleeps",
            CardType::Core => "The group would be silent without them",
            CardType::BasicBitch => "heyyyyy",
            CardType::TimeCheese => "One in ten thousand",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GRANDMA" => Ok(CardType::Grandma),
            "OPENER" => Ok(CardType::Opener),
            "BOT" => Ok(CardType::Bot),
            "JESTER" => Ok(CardType::Jester),
            "LURKER" => Ok(CardType::Lurker),
            "SPAMMER" => Ok(CardType::Spammer),
            "CORE" => Ok(CardType::Core),
            "BASICBITCH" => Ok(CardType::BasicBitch),
            "TIMECHEESE" => Ok(CardType::TimeCheese),
            _ => Err(format!("unknown card type: {}", s)),
        }
    }
}

/// A superlative awarded to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub person: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub value: u32,
}

impl Card {
    pub fn new(person: impl Into<String>, card_type: CardType, value: u32) -> Self {
        Self {
            person: person.into(),
            card_type,
            value,
        }
    }
}

// ============================================
// Statistics
// ============================================

/// Kind of media attachment counted per person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Images,
    Videos,
    Audio,
    Stickers,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Images,
        MediaKind::Videos,
        MediaKind::Audio,
        MediaKind::Stickers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Images => "images",
            MediaKind::Videos => "videos",
            MediaKind::Audio => "audio",
            MediaKind::Stickers => "stickers",
        }
    }

    /// Detect the attachment placeholder an export writes instead of the media.
    ///
    /// Covers the "image omitted" family, `<attached: …>` and
    /// `… (file attached)` forms. Android's generic `<Media omitted>` carries
    /// no kind and is not counted.
    pub fn detect(content: &str) -> Option<MediaKind> {
        let lower = content.trim().to_lowercase();

        if lower.contains("sticker omitted") || lower.ends_with(".webp (file attached)") {
            return Some(MediaKind::Stickers);
        }
        if lower.contains("image omitted")
            || lower.contains("gif omitted")
            || (lower.contains("<attached:") && lower.contains("photo"))
            || lower.ends_with(".jpg (file attached)")
            || lower.ends_with(".jpeg (file attached)")
            || lower.ends_with(".png (file attached)")
        {
            return Some(MediaKind::Images);
        }
        if lower.contains("video omitted")
            || (lower.contains("<attached:") && lower.contains("video"))
            || lower.ends_with(".mp4 (file attached)")
        {
            return Some(MediaKind::Videos);
        }
        if lower.contains("audio omitted")
            || (lower.contains("<attached:") && lower.contains("audio"))
            || lower.ends_with(".opus (file attached)")
        {
            return Some(MediaKind::Audio);
        }
        None
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sender and a count (messages, or media of one kind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCount {
    pub sender: String,
    pub count: u32,
}

impl PersonCount {
    pub fn new(sender: impl Into<String>, count: u32) -> Self {
        Self {
            sender: sender.into(),
            count,
        }
    }
}

/// An emoji and its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEmoji {
    pub emoji: String,
    pub count: u32,
}

/// The pair that replies to each other the most.
///
/// The default (empty names, zero count) stands in when no pair exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Couple {
    pub person_one: String,
    pub person_two: String,
    pub count: u32,
}

/// The conversation with the longest span between first and last message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestConversation {
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub participants: Vec<String>,
}

/// A per-person extreme reported by one analytics query.
///
/// `score` is a count for opener and jester, an average for bot and hey.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonScore {
    pub person: String,
    pub score: f64,
}

impl PersonScore {
    pub fn new(person: impl Into<String>, score: f64) -> Self {
        Self {
            person: person.into(),
            score,
        }
    }

    /// Score rounded half away from zero, clamped at zero.
    pub fn rounded(&self) -> u32 {
        if self.score.is_finite() && self.score > 0.0 {
            self.score.round() as u32
        } else {
            0
        }
    }
}

/// Aggregate snapshot of one export.
///
/// Every field is filled independently; a failed query leaves its field at
/// the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "totalMessages")]
    pub total_messages: u32,
    /// Descending by count
    #[serde(rename = "messagesPerPerson")]
    pub messages_per_person: Vec<PersonCount>,
    #[serde(rename = "top3emojis")]
    pub top_emojis: Vec<TopEmoji>,
    #[serde(rename = "imagesPerPerson")]
    pub images_per_person: Vec<PersonCount>,
    #[serde(rename = "videosPerPerson")]
    pub videos_per_person: Vec<PersonCount>,
    #[serde(rename = "AudioPerPerson")]
    pub audio_per_person: Vec<PersonCount>,
    #[serde(rename = "stickersPerPerson")]
    pub stickers_per_person: Vec<PersonCount>,
    #[serde(rename = "totalConversations")]
    pub total_conversations: u32,
    /// Always serialized; empty when no two people talked to each other
    #[serde(rename = "couple", default)]
    pub couple: Couple,
    #[serde(
        rename = "longestConversation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub longest_conversation: Option<LongestConversation>,

    // Query-derived scalars, consumed by the card engine only
    #[serde(skip)]
    pub opener: Option<PersonScore>,
    #[serde(skip)]
    pub bot: Option<PersonScore>,
    #[serde(skip)]
    pub jester: Option<PersonScore>,
    #[serde(skip)]
    pub hey_y_average: Option<PersonScore>,
}

impl Stats {
    /// Per-person counts for one media kind.
    pub fn media(&self, kind: MediaKind) -> &[PersonCount] {
        match kind {
            MediaKind::Images => &self.images_per_person,
            MediaKind::Videos => &self.videos_per_person,
            MediaKind::Audio => &self.audio_per_person,
            MediaKind::Stickers => &self.stickers_per_person,
        }
    }

    /// Mutable per-person counts for one media kind.
    pub fn media_mut(&mut self, kind: MediaKind) -> &mut Vec<PersonCount> {
        match kind {
            MediaKind::Images => &mut self.images_per_person,
            MediaKind::Videos => &mut self.videos_per_person,
            MediaKind::Audio => &mut self.audio_per_person,
            MediaKind::Stickers => &mut self.stickers_per_person,
        }
    }

    /// Number of distinct participants.
    pub fn participant_count(&self) -> usize {
        self.messages_per_person.len()
    }
}

/// Everything returned for one export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedOutput {
    pub statistics: Stats,
    pub cards: Vec<Card>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_serializes_with_contract_field_names() {
        let card = Card::new("Alice", CardType::BasicBitch, 3);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"person": "Alice", "type": "BASICBITCH", "value": 3})
        );
    }

    #[test]
    fn test_card_type_round_trips_through_str() {
        for card_type in [
            CardType::Grandma,
            CardType::Opener,
            CardType::Bot,
            CardType::Jester,
            CardType::Lurker,
            CardType::Spammer,
            CardType::Core,
            CardType::BasicBitch,
            CardType::TimeCheese,
        ] {
            assert_eq!(card_type.as_str().parse::<CardType>(), Ok(card_type));
        }
        assert!("WIZARD".parse::<CardType>().is_err());
    }

    #[test]
    fn test_stats_field_names() {
        let stats = Stats {
            total_messages: 2,
            messages_per_person: vec![PersonCount::new("A", 2)],
            opener: Some(PersonScore::new("A", 1.0)),
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        let obj = json.as_object().unwrap();

        for key in [
            "totalMessages",
            "messagesPerPerson",
            "top3emojis",
            "imagesPerPerson",
            "videosPerPerson",
            "AudioPerPerson",
            "stickersPerPerson",
            "totalConversations",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(
            json["couple"],
            serde_json::json!({"personOne": "", "personTwo": "", "count": 0})
        );
        assert!(!obj.contains_key("longestConversation"));
        assert!(!obj.contains_key("opener"));
        assert_eq!(json["messagesPerPerson"][0]["sender"], "A");
    }

    #[test]
    fn test_couple_uses_camel_case() {
        let couple = Couple {
            person_one: "A".to_string(),
            person_two: "B".to_string(),
            count: 4,
        };
        let json = serde_json::to_value(&couple).unwrap();
        assert_eq!(json["personOne"], "A");
        assert_eq!(json["personTwo"], "B");
    }

    #[test]
    fn test_media_detection() {
        assert_eq!(MediaKind::detect("image omitted"), Some(MediaKind::Images));
        assert_eq!(MediaKind::detect("sticker omitted"), Some(MediaKind::Stickers));
        assert_eq!(MediaKind::detect("video omitted"), Some(MediaKind::Videos));
        assert_eq!(MediaKind::detect("audio omitted"), Some(MediaKind::Audio));
        assert_eq!(
            MediaKind::detect("IMG-20240101-WA0001.jpg (file attached)"),
            Some(MediaKind::Images)
        );
        assert_eq!(
            MediaKind::detect("<attached: 00000012-PHOTO-2024-01-01-10-00-00.jpg>"),
            Some(MediaKind::Images)
        );
        assert_eq!(MediaKind::detect("<Media omitted>"), None);
        assert_eq!(MediaKind::detect("look at this image"), None);
    }

    #[test]
    fn test_person_score_rounding() {
        assert_eq!(PersonScore::new("A", 2.5).rounded(), 3);
        assert_eq!(PersonScore::new("A", 2.49).rounded(), 2);
        assert_eq!(PersonScore::new("A", -1.0).rounded(), 0);
        assert_eq!(PersonScore::new("A", f64::NAN).rounded(), 0);
    }
}
