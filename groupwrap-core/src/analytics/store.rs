//! Aggregate query interface

use crate::error::Result;
use crate::types::{Couple, LongestConversation, MediaKind, PersonCount, PersonScore, TopEmoji};

/// Aggregate queries over one loaded export.
///
/// Every method may fail on its own. A query with no qualifying rows returns
/// [`Error::Aggregate`](crate::Error::Aggregate); callers treat that as a
/// missing statistic rather than a failed export.
pub trait AnalyticsStore {
    fn total_messages(&self) -> Result<u32>;

    /// Message count per sender, by count descending then sender ascending.
    fn messages_per_person(&self) -> Result<Vec<PersonCount>>;

    /// Most used emojis, at most `limit`.
    fn top_emojis(&self, limit: usize) -> Result<Vec<TopEmoji>>;

    /// Per-sender count of one media kind, same ordering as
    /// [`messages_per_person`](Self::messages_per_person).
    fn media_per_person(&self, kind: MediaKind) -> Result<Vec<PersonCount>>;

    fn conversation_count(&self) -> Result<u32>;

    /// Pair of senders who most often answer each other.
    fn top_couple(&self) -> Result<Couple>;

    fn longest_conversation(&self) -> Result<LongestConversation>;

    /// Who starts the most conversations; score is the count.
    fn opener(&self) -> Result<PersonScore>;

    /// Who laughs the most; score is the count.
    fn jester(&self) -> Result<PersonScore>;

    /// Lowest average words per text message.
    fn bot(&self) -> Result<PersonScore>;

    /// Highest average number of y's in "heyyy".
    fn hey_y_average(&self) -> Result<PersonScore>;
}
