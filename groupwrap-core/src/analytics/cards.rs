//! Superlative card assignment
//!
//! Each card type names the extreme holder of one statistic. Candidates are
//! computed independently, shuffled, then dealt out to participants in
//! descending message order so that nobody holds two cards and no type
//! appears twice.

use crate::config::CardsConfig;
use crate::types::{Card, CardType, MediaKind, PersonCount, Stats};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Deals cards from a [`Stats`] snapshot.
#[derive(Debug, Clone, Default)]
pub struct CardEngine {
    config: CardsConfig,
}

impl CardEngine {
    pub fn new(config: CardsConfig) -> Self {
        Self { config }
    }

    /// Every card the statistics justify, one per type at most.
    pub fn candidates(&self, stats: &Stats) -> Vec<Card> {
        let mut candidates = Vec::new();
        let people = &stats.messages_per_person;

        if let Some(top) = max_person(stats.media(MediaKind::Stickers).iter().cloned()) {
            if top.count > 0 {
                candidates.push(Card::new(top.sender, CardType::Grandma, top.count));
            }
        }

        if let Some(opener) = &stats.opener {
            candidates.push(Card::new(&opener.person, CardType::Opener, opener.rounded()));
        }

        if let Some(bot) = &stats.bot {
            candidates.push(Card::new(&bot.person, CardType::Bot, bot.rounded()));
        }

        if let Some(jester) = &stats.jester {
            candidates.push(Card::new(&jester.person, CardType::Jester, jester.rounded()));
        }

        if let Some(last) = people.last() {
            candidates.push(Card::new(&last.sender, CardType::Lurker, last.count));
        }

        if let Some(top) = max_person(spam_totals(stats).into_iter()) {
            if top.count > 0 {
                candidates.push(Card::new(top.sender, CardType::Spammer, top.count));
            }
        }

        if let Some(first) = people.first() {
            candidates.push(Card::new(&first.sender, CardType::Core, first.count));
        }

        if let Some(hey) = &stats.hey_y_average {
            if hey.score > self.config.basic_threshold {
                candidates.push(Card::new(&hey.person, CardType::BasicBitch, hey.rounded()));
            }
        }

        candidates
    }

    /// Assign at most `max_cards` cards, at most one per participant.
    ///
    /// Every participant in turn may draw the rare TIMECHEESE card instead of
    /// a statistic card, until someone has drawn it.
    pub fn assign<R: Rng + ?Sized>(&self, stats: &Stats, rng: &mut R) -> Vec<Card> {
        let mut candidates = self.candidates(stats);
        candidates.shuffle(rng);

        let quota = candidates
            .len()
            .min(stats.participant_count())
            .min(self.config.max_cards);

        let mut cards: Vec<Card> = Vec::with_capacity(quota);
        let mut used: HashSet<CardType> = HashSet::new();

        for participant in &stats.messages_per_person {
            if cards.len() >= quota {
                break;
            }

            if !used.contains(&CardType::TimeCheese) && self.rare_draw(rng) {
                used.insert(CardType::TimeCheese);
                cards.push(Card::new(&participant.sender, CardType::TimeCheese, 0));
                continue;
            }

            let pick = candidates
                .iter()
                .find(|c| c.person == participant.sender && !used.contains(&c.card_type));
            if let Some(card) = pick {
                used.insert(card.card_type);
                cards.push(card.clone());
            }
        }

        tracing::debug!(
            candidates = candidates.len(),
            quota,
            assigned = cards.len(),
            "Assigned cards"
        );

        cards
    }

    fn rare_draw<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let odds = self.config.rare_card_odds;
        odds > 0 && rng.gen_range(0..odds) == self.config.rare_card_draw
    }
}

/// Images, videos and audio per person, ordered by name.
fn spam_totals(stats: &Stats) -> Vec<PersonCount> {
    let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
    for kind in [MediaKind::Images, MediaKind::Videos, MediaKind::Audio] {
        for person in stats.media(kind) {
            *totals.entry(person.sender.as_str()).or_default() += person.count;
        }
    }
    totals
        .into_iter()
        .map(|(sender, count)| PersonCount::new(sender, count))
        .collect()
}

/// Highest count; ties go to the lexicographically smallest name.
fn max_person(counts: impl Iterator<Item = PersonCount>) -> Option<PersonCount> {
    counts.max_by(|a, b| match a.count.cmp(&b.count) {
        Ordering::Equal => b.sender.cmp(&a.sender),
        other => other,
    })
}
