//! Integration tests for the groupwrap ingestion and analytics pipeline
//!
//! These tests use fixture exports in `tests/fixtures/` to verify the flow
//! from raw text through the SQLite store to cards.

use chrono::{Local, NaiveDate, TimeZone, Utc};
use groupwrap_core::analytics::{collect_stats, generate_wrapped, AnalyticsStore, CardEngine};
use groupwrap_core::config::{CardsConfig, IngestConfig, StatsConfig};
use groupwrap_core::ingest::format_canonical;
use groupwrap_core::{ingest, CardType, Config, Convention, Database, MediaKind, PersonCount};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::PathBuf;

/// Read a fixture export
fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

/// Ingest a fixture and load it into a fresh store
fn load_fixture(name: &str) -> Database {
    let export = ingest(&fixture(name)).unwrap();
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    db.load_lines(&export.lines, &IngestConfig::default()).unwrap();
    db
}

fn config_without_rare_card() -> Config {
    let mut config = Config::default();
    config.cards.rare_card_odds = 0;
    config
}

// ============================================
// Ingestion
// ============================================

#[test]
fn test_ingest_bracketed_dotted_export() {
    let export = ingest(&fixture("ios_dotted.txt")).unwrap();

    assert_eq!(export.convention, Convention::Bracketed);
    assert_eq!(
        export.lines,
        vec![
            "[06.09.25, 15:00:00] Alice: heyyy everyone 😂😂",
            "[06.09.25, 15:00:30] Bob: hi",
            "[06.09.25, 15:01:00] Alice: image omitted",
            "[06.09.25, 15:02:00] Carol: sticker omitted",
            "[06.09.25, 15:03:00] Bob: haha",
            "that was good",
            "[06.09.25, 15:40:00] Alice: ok ❤️",
            "[07.09.25, 09:00:00] Carol: morning",
            "[07.09.25, 09:05:00] Alice: sticker omitted",
            "[07.09.25, 09:06:00] Carol: sticker omitted",
        ]
    );
}

#[test]
fn test_ingest_bracketed_us_twelve_hour_export() {
    let export = ingest(&fixture("ios_us_12h.txt")).unwrap();

    assert_eq!(export.convention, Convention::Bracketed);
    assert_eq!(
        export.lines,
        vec![
            "[06.09.25, 15:00:00] Dana: Heyyyy",
            "[06.09.25, 15:05:12] Eli: lol ok",
            "[06.09.25, 23:59:59] Dana: audio omitted",
            "[07.09.25, 00:00:30] Eli: 🎉",
        ]
    );
}

#[test]
fn test_ingest_separator_export_drops_system_lines() {
    let export = ingest(&fixture("android_uk.txt")).unwrap();

    assert_eq!(export.convention, Convention::PrefixSeparator);
    assert_eq!(
        export.lines,
        vec![
            "[06.09.25, 15:00:10] Fran: Where are we going - mountains or sea?",
            "[06.09.25, 15:01:00] Gus: sea",
            "obviously",
            "[06.09.25, 15:03:00] Hal: IMG-20250906-WA0001.jpg (file attached)",
            "[06.09.25, 15:04:00] Gus: <Media omitted>",
            "[13.09.25, 10:00:00] Fran: hey",
        ]
    );
}

#[test]
fn test_ingest_separator_us_export() {
    let export = ingest(&fixture("android_us.txt")).unwrap();

    assert_eq!(
        export.lines,
        vec![
            "[06.09.25, 15:00:00] Ivy: first",
            "[06.09.25, 15:10:00] Jon: VID-20250906-WA0002.mp4 (file attached)",
        ]
    );
}

#[test]
fn test_minutes_only_export_uses_local_time() {
    let export = ingest("06/09/2025, 15:00 - Kim: hi\n").unwrap();

    let naive = NaiveDate::from_ymd_opt(2025, 9, 6)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap();
    let expected = Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap()
        .with_timezone(&Utc);

    assert_eq!(
        export.lines,
        vec![format!("[{}] Kim: hi", format_canonical(expected))]
    );
}

#[test]
fn test_every_fixture_is_a_fixed_point() {
    for name in [
        "ios_dotted.txt",
        "ios_us_12h.txt",
        "android_uk.txt",
        "android_us.txt",
    ] {
        let first = ingest(&fixture(name)).unwrap();
        let second = ingest(&first.lines.join("\n")).unwrap();
        assert_eq!(second.lines, first.lines, "{name} is not stable");
    }
}

// ============================================
// Store queries
// ============================================

#[test]
fn test_store_answers_dotted_fixture() {
    let db = load_fixture("ios_dotted.txt");

    assert_eq!(db.total_messages().unwrap(), 9);
    assert_eq!(db.conversation_count().unwrap(), 2);
    assert_eq!(
        db.messages_per_person().unwrap(),
        vec![
            PersonCount::new("Alice", 4),
            PersonCount::new("Carol", 3),
            PersonCount::new("Bob", 2),
        ]
    );
    assert_eq!(
        db.media_per_person(MediaKind::Stickers).unwrap(),
        vec![PersonCount::new("Carol", 2), PersonCount::new("Alice", 1)]
    );

    let couple = db.top_couple().unwrap();
    assert_eq!(
        (couple.person_one.as_str(), couple.person_two.as_str(), couple.count),
        ("Alice", "Bob", 3)
    );

    let longest = db.longest_conversation().unwrap();
    assert_eq!(longest.duration_minutes, 40);
    assert_eq!(longest.start, Utc.with_ymd_and_hms(2025, 9, 6, 15, 0, 0).unwrap());

    assert_eq!(db.bot().unwrap().person, "Carol");
    assert_eq!(db.hey_y_average().unwrap().score, 3.0);
}

#[test]
fn test_store_answers_separator_fixture() {
    let db = load_fixture("android_uk.txt");

    assert_eq!(db.total_messages().unwrap(), 5);
    assert_eq!(db.conversation_count().unwrap(), 2);
    assert_eq!(
        db.media_per_person(MediaKind::Images).unwrap(),
        vec![PersonCount::new("Hal", 1)]
    );
    // "<Media omitted>" carries no kind
    assert!(db.media_per_person(MediaKind::Videos).unwrap().is_empty());
    assert_eq!(db.opener().unwrap().person, "Fran");
    assert_eq!(db.bot().unwrap().person, "Gus");
    assert!(db.jester().is_err());
}

// ============================================
// End to end
// ============================================

#[test]
fn test_cards_for_dotted_fixture() {
    let db = load_fixture("ios_dotted.txt");
    let stats = collect_stats(&db, &StatsConfig::default());
    let engine = CardEngine::new(CardsConfig {
        rare_card_odds: 0,
        ..Default::default()
    });

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let cards = engine.assign(&stats, &mut rng);

        // Three people, each with at least one candidate
        assert_eq!(cards.len(), 3, "seed {seed}");

        let bob: Vec<CardType> = cards
            .iter()
            .filter(|c| c.person == "Bob")
            .map(|c| c.card_type)
            .collect();
        assert_eq!(bob, vec![CardType::Lurker], "seed {seed}");

        let carol = cards
            .iter()
            .find(|c| c.person == "Carol")
            .map(|c| c.card_type);
        assert!(
            matches!(carol, Some(CardType::Grandma) | Some(CardType::Bot)),
            "seed {seed}: {carol:?}"
        );
    }
}

#[test]
fn test_generate_wrapped_json_contract() {
    groupwrap_core::logging::init_test();

    let mut rng = StdRng::seed_from_u64(11);
    let output =
        generate_wrapped(&fixture("ios_dotted.txt"), &config_without_rare_card(), &mut rng)
            .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    let statistics = &json["statistics"];

    assert_eq!(statistics["totalMessages"], 9);
    assert_eq!(statistics["totalConversations"], 2);
    assert_eq!(statistics["messagesPerPerson"][0]["sender"], "Alice");
    assert_eq!(statistics["top3emojis"][0]["emoji"], "😂");
    assert_eq!(statistics["top3emojis"][0]["count"], 2);
    assert_eq!(statistics["imagesPerPerson"][0]["sender"], "Alice");
    assert!(statistics["AudioPerPerson"].as_array().unwrap().is_empty());
    assert_eq!(statistics["couple"]["personOne"], "Alice");
    assert_eq!(statistics["longestConversation"]["durationMinutes"], 40);

    let cards = json["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 3);
    let persons: HashSet<&str> = cards
        .iter()
        .map(|c| c["person"].as_str().unwrap())
        .collect();
    assert_eq!(persons.len(), 3);
}

#[test]
fn test_single_sender_chat_keeps_couple_key() {
    let mut rng = StdRng::seed_from_u64(5);
    let output = generate_wrapped(
        "[6.09.25, 15:00:00] A: hi\n[6.09.25, 15:01:00] A: yo\n",
        &config_without_rare_card(),
        &mut rng,
    )
    .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    let couple = &json["statistics"]["couple"];
    assert_eq!(couple["personOne"], "");
    assert_eq!(couple["personTwo"], "");
    assert_eq!(couple["count"], 0);
}

#[test]
fn test_generate_wrapped_rejects_garbage_timestamp() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = generate_wrapped(
        "[6.09.25, 15:00:00] Alice: hi\n[not a date] Bob: hey\n",
        &Config::default(),
        &mut rng,
    )
    .unwrap_err();

    assert!(err.is_fatal());
    assert!(err.to_string().contains("not a date"));
}
