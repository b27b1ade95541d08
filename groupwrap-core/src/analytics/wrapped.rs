//! Wrapped - chat in review
//!
//! Generates "Spotify Wrapped"-style summaries of a group chat export.

use rand::Rng;
use uuid::Uuid;

use super::{collect_stats, CardEngine};
use crate::config::Config;
use crate::db::Database;
use crate::ingest::ingest;
use crate::types::WrappedOutput;

/// Generate statistics and cards for one raw export.
///
/// Ingestion errors are fatal; a failed aggregate only leaves its statistic
/// empty.
pub fn generate_wrapped<R: Rng + ?Sized>(
    content: &str,
    config: &Config,
    rng: &mut R,
) -> crate::Result<WrappedOutput> {
    let export_id = Uuid::new_v4();
    let span = tracing::info_span!("wrapped", export_id = %export_id);
    let _enter = span.enter();

    let export = ingest(content)?;

    let db = Database::open_in_memory()?;
    db.migrate()?;
    let loaded = db.load_lines(&export.lines, &config.ingest)?;

    let statistics = collect_stats(&db, &config.stats);
    let cards = CardEngine::new(config.cards.clone()).assign(&statistics, rng);

    tracing::info!(
        convention = %export.convention,
        messages = loaded.messages,
        participants = statistics.participant_count(),
        conversations = statistics.total_conversations,
        cards = cards.len(),
        "Generated wrapped"
    );

    Ok(WrappedOutput { statistics, cards })
}
