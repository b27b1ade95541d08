//! Statistics collection
//!
//! Runs every store query independently. A failing query is logged and its
//! field keeps the default, so one empty aggregate never costs the rest.

use super::AnalyticsStore;
use crate::config::StatsConfig;
use crate::error::Result;
use crate::types::{MediaKind, Stats};

/// Log a failed query and turn it into `None`.
fn soft<T>(query: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(query, error = %e, fatal = e.is_fatal(), "Aggregate query failed");
            None
        }
    }
}

/// Gather a [`Stats`] snapshot from a store. Never fails.
pub fn collect_stats(store: &dyn AnalyticsStore, config: &StatsConfig) -> Stats {
    let mut stats = Stats {
        total_messages: soft("total_messages", store.total_messages()).unwrap_or_default(),
        messages_per_person: soft("messages_per_person", store.messages_per_person())
            .unwrap_or_default(),
        top_emojis: soft("top_emojis", store.top_emojis(config.top_emoji_count))
            .unwrap_or_default(),
        total_conversations: soft("conversation_count", store.conversation_count())
            .unwrap_or_default(),
        couple: soft("couple", store.top_couple()).unwrap_or_default(),
        longest_conversation: soft("longest_conversation", store.longest_conversation()),
        opener: soft("opener", store.opener()),
        bot: soft("bot", store.bot()),
        jester: soft("jester", store.jester()),
        hey_y_average: soft("hey_y_average", store.hey_y_average()),
        ..Default::default()
    };

    for kind in MediaKind::ALL {
        if let Some(counts) = soft(kind.as_str(), store.media_per_person(kind)) {
            *stats.media_mut(kind) = counts;
        }
    }

    tracing::debug!(
        total_messages = stats.total_messages,
        participants = stats.participant_count(),
        conversations = stats.total_conversations,
        "Collected statistics"
    );

    stats
}
