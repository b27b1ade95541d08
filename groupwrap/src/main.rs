//! groupwrap - Group Chat Wrapped CLI
//!
//! Reads an exported group chat and prints its statistics and personality
//! cards.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use groupwrap_core::analytics::generate_wrapped;
use groupwrap_core::ingest::ingest;
use groupwrap_core::{Config, MediaKind, PersonCount, WrappedOutput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "groupwrap")]
#[command(about = "Group Chat Wrapped - who is who in your group chat")]
#[command(version)]
struct Args {
    /// Exported chat transcript ("-" reads stdin)
    file: String,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,

    /// Seed for card shuffling and the rare card draw
    #[arg(long)]
    seed: Option<u64>,

    /// Print the canonical lines and stop
    #[arg(long)]
    normalize_only: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/groupwrap/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    let _log_guard = groupwrap_core::logging::init(&config.logging).ok();

    let content = read_input(&args.file)?;
    tracing::info!(file = %args.file, bytes = content.len(), "Read export");

    if args.normalize_only {
        let export = ingest(&content).context("failed to ingest chat export")?;
        for line in &export.lines {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let output =
        generate_wrapped(&content, &config, &mut rng).context("failed to generate wrapped")?;

    match args.export.as_deref() {
        Some("json") => print_json(&output)?,
        Some("md") => print_markdown(&output),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&output),
    }

    Ok(())
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read export from stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file))
    }
}

/// Inner width of the terminal header box, in columns.
const BOX_WIDTH: usize = 60;

/// Center `text` between two party emoji inside the box borders.
///
/// `{:^}` pads by chars, and each emoji takes two columns, so the padding is
/// worked out by hand.
fn title_row(text: &str) -> String {
    let width = text.chars().count() + 6;
    let left = BOX_WIDTH.saturating_sub(width) / 2;
    let right = BOX_WIDTH.saturating_sub(width + left);
    format!(
        "│{}🎉 {} 🎉{}│",
        " ".repeat(left),
        text,
        " ".repeat(right)
    )
}

fn print_terminal(output: &WrappedOutput) {
    let stats = &output.statistics;

    // Header
    println!();
    println!("╭{}╮", "─".repeat(BOX_WIDTH));
    println!("{}", title_row("YOUR GROUP CHAT WRAPPED"));
    println!("╰{}╯", "─".repeat(BOX_WIDTH));
    println!();

    if stats.total_messages == 0 {
        println!("  No messages found in this export.");
        println!();
        return;
    }

    // The Numbers
    println!("📊 THE NUMBERS");
    println!(
        "   Messages: {:<12} Conversations: {}",
        stats.total_messages, stats.total_conversations
    );
    println!("   People:   {}", stats.participant_count());
    println!();

    // Top talkers
    println!("🗣  LOUDEST VOICES");
    for (i, person) in stats.messages_per_person.iter().take(5).enumerate() {
        println!("   {} {:<24} {}", medal(i), person.sender, person.count);
    }
    println!();

    if !stats.top_emojis.is_empty() {
        let emojis = stats
            .top_emojis
            .iter()
            .map(|e| format!("{} ×{}", e.emoji, e.count))
            .collect::<Vec<_>>()
            .join("   ");
        println!("😀 TOP EMOJIS");
        println!("   {}", emojis);
        println!();
    }

    let media: Vec<(MediaKind, &[PersonCount])> = MediaKind::ALL
        .iter()
        .map(|kind| (*kind, stats.media(*kind)))
        .filter(|(_, counts)| !counts.is_empty())
        .collect();
    if !media.is_empty() {
        println!("📷 MEDIA");
        for (kind, counts) in media {
            let total: u32 = counts.iter().map(|c| c.count).sum();
            println!(
                "   {:<10} {:<6} (mostly {})",
                kind.as_str(),
                total,
                counts[0].sender
            );
        }
        println!();
    }

    let couple = &stats.couple;
    if couple.count > 0 {
        println!("💞 COUPLE OF THE CHAT");
        println!(
            "   {} & {} ({} back-and-forths)",
            couple.person_one, couple.person_two, couple.count
        );
        println!();
    }

    if let Some(longest) = &stats.longest_conversation {
        println!("⏳ LONGEST CONVERSATION");
        println!(
            "   {} - {} minutes with {}",
            longest.start.format("%d %b %Y %H:%M"),
            longest.duration_minutes,
            longest.participants.join(", ")
        );
        println!();
    }

    // Cards
    if !output.cards.is_empty() {
        println!("🃏 CARDS");
        for card in &output.cards {
            println!("   {:<12} {:<24} {}", card.card_type, card.person, card.value);
            println!("   {:<12} \"{}\"", "", card.card_type.tagline());
        }
        println!();
    }
}

fn print_markdown(output: &WrappedOutput) {
    let stats = &output.statistics;

    println!("# Group Chat Wrapped");
    println!();

    println!("## The Numbers");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Messages | {} |", stats.total_messages);
    println!("| Conversations | {} |", stats.total_conversations);
    println!("| People | {} |", stats.participant_count());
    println!();

    if !stats.messages_per_person.is_empty() {
        println!("## Messages per Person");
        println!();
        for (i, person) in stats.messages_per_person.iter().enumerate() {
            println!("{}. **{}** - {} messages", i + 1, person.sender, person.count);
        }
        println!();
    }

    if !stats.top_emojis.is_empty() {
        println!("## Top Emojis");
        println!();
        for (i, emoji) in stats.top_emojis.iter().enumerate() {
            println!("{} {} - {} times", medal(i), emoji.emoji, emoji.count);
        }
        println!();
    }

    println!("## Media");
    println!();
    println!("| Kind | Person | Count |");
    println!("|------|--------|-------|");
    for kind in MediaKind::ALL {
        for person in stats.media(kind) {
            println!("| {} | {} | {} |", kind.as_str(), person.sender, person.count);
        }
    }
    println!();

    let couple = &stats.couple;
    if couple.count > 0 {
        println!("## Couple of the Chat");
        println!();
        println!(
            "**{}** & **{}** - {} back-and-forths",
            couple.person_one, couple.person_two, couple.count
        );
        println!();
    }

    if let Some(longest) = &stats.longest_conversation {
        println!("## Longest Conversation");
        println!();
        println!(
            "- **Started:** {}",
            longest.start.format("%Y-%m-%d %H:%M UTC")
        );
        println!("- **Duration:** {} minutes", longest.duration_minutes);
        println!("- **With:** {}", longest.participants.join(", "));
        println!();
    }

    if !output.cards.is_empty() {
        println!("## Cards");
        println!();
        for card in &output.cards {
            println!(
                "- **{}** - {} ({}) *\"{}\"*",
                card.card_type,
                card.person,
                card.value,
                card.card_type.tagline()
            );
        }
        println!();
    }

    println!("---");
    println!(
        "*Generated by groupwrap on {}*",
        Local::now().format("%Y-%m-%d")
    );
}

fn print_json(output: &WrappedOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn medal(rank: usize) -> &'static str {
    match rank {
        0 => "🥇",
        1 => "🥈",
        2 => "🥉",
        _ => "  ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_row_fills_the_box() {
        let row = title_row("YOUR GROUP CHAT WRAPPED");
        let emoji = row.matches('🎉').count();
        // Both borders plus one extra column per emoji
        assert_eq!(row.chars().count() + emoji, BOX_WIDTH + 2);
        assert_eq!(emoji, 2);
    }

    #[test]
    fn test_title_row_is_centered() {
        let row = title_row("ODD");
        let inner = row.trim_start_matches('│').trim_end_matches('│');
        let left = inner.len() - inner.trim_start().len();
        let right = inner.len() - inner.trim_end().len();
        assert!(left.abs_diff(right) <= 1, "{row:?}");
    }
}
