//! Tarot draw engine.
//!
//! ## Core Contract
//!
//! Given a topic label, a spread and a seed, deterministically draw one card
//! per slot from the fixed deck, without replacement.
//!
//! ```text
//! topic label → Topic (prefix match) ─┐
//! spread id   → Spread (fixed table) ─┼→ draw → TarotDraw
//! seed + i    → seeded_index ─────────┘
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same topic + spread + reverse flag + seed → identical draw
//! - Slot `i` uses `seed + i`; the working deck shrinks after every pick
//! - Orientation depends only on `allow_reverse` and slot parity

pub mod deck;
pub mod spread;

use serde::{Deserialize, Serialize};

use crate::seed::seeded_index;
use crate::types::{Orientation, TarotCardResult, TarotDraw, Topic};

pub use deck::{TarotCard, DECK};
pub use spread::{Spread, SpreadId};

/// Errors from the draw engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TarotError {
    /// Spread id is not in the registry.
    #[error("Unknown spread: {0}")]
    UnknownSpread(String),
    /// Deck cannot fill the spread.
    #[error("Deck has {deck} cards but spread needs {needed}")]
    DeckTooSmall {
        /// Cards available.
        deck: usize,
        /// Cards required.
        needed: usize,
    },
}

/// Parameters for one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRequest {
    /// Free-text topic label (resolved by key prefix).
    pub topic: String,
    /// Spread to lay out.
    pub spread: SpreadId,
    /// Whether odd slots are drawn reversed.
    #[serde(default)]
    pub allow_reverse: bool,
    /// Seed; `None` uses the current epoch milliseconds.
    #[serde(default)]
    pub seed: Option<i64>,
}

impl DrawRequest {
    /// Create a request with an explicit seed.
    pub fn new(topic: impl Into<String>, spread: SpreadId, allow_reverse: bool, seed: i64) -> Self {
        Self {
            topic: topic.into(),
            spread,
            allow_reverse,
            seed: Some(seed),
        }
    }

    /// Create a request seeded from the clock at draw time.
    pub fn unseeded(topic: impl Into<String>, spread: SpreadId, allow_reverse: bool) -> Self {
        Self {
            topic: topic.into(),
            spread,
            allow_reverse,
            seed: None,
        }
    }

    /// Seed that will be used for this request.
    pub fn effective_seed(&self) -> i64 {
        self.seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
    }
}

/// Topic whose card texts a draw uses for a free-text label.
///
/// First topic whose key prefixes the label; [`Topic::Career`] otherwise.
pub fn resolve_topic(label: &str) -> Topic {
    Topic::resolve_prefix(label)
}

/// Draw cards for a request from the standard deck.
pub fn draw(request: &DrawRequest) -> TarotDraw {
    let seed = request.effective_seed();
    // The standard deck covers every registered spread (checked in deck tests).
    draw_from(&DECK, request, seed).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Standard deck cannot fill spread");
        TarotDraw {
            cards: Vec::new(),
            summary: summary_for(&request.spread.spread(), &request.topic),
        }
    })
}

/// Draw cards from an arbitrary deck with an explicit seed.
///
/// Fails if the deck has fewer cards than the spread has slots.
pub fn draw_from(
    deck: &[TarotCard],
    request: &DrawRequest,
    seed: i64,
) -> Result<TarotDraw, TarotError> {
    let spread = request.spread.spread();
    if deck.len() < spread.count {
        return Err(TarotError::DeckTooSmall {
            deck: deck.len(),
            needed: spread.count,
        });
    }

    let topic = resolve_topic(&request.topic);
    let mut working: Vec<&TarotCard> = deck.iter().collect();
    let mut cards = Vec::with_capacity(spread.count);

    for i in 0..spread.count {
        let index = seeded_index(seed.wrapping_add(i as i64), working.len());
        let card = working.remove(index);
        let position = if request.allow_reverse && i % 2 == 1 {
            Orientation::Reversed
        } else {
            Orientation::Upright
        };
        cards.push(TarotCardResult {
            name: card.name.to_string(),
            position,
            focus: card.keyword(topic).to_string(),
            advice: card.action(topic).to_string(),
            action: card.action(topic).to_string(),
            reflection: card.reflection(topic).to_string(),
            slot_meaning: spread.slot_name(i),
        });
    }

    tracing::debug!(
        spread = %request.spread,
        topic = %topic,
        seed = seed,
        cards = cards.len(),
        "Tarot draw complete"
    );

    Ok(TarotDraw {
        cards,
        summary: summary_for(&spread, &request.topic),
    })
}

fn summary_for(spread: &Spread, topic_label: &str) -> String {
    format!("{} · 關於 {} 的洞察", spread.label, topic_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_three_card_example() {
        let request = DrawRequest::new("健康 / 身心", SpreadId::Three, true, 1);
        let result = draw(&request);

        assert_eq!(result.cards.len(), 3);
        let slots: Vec<_> = result.cards.iter().map(|c| c.slot_meaning.as_str()).collect();
        assert_eq!(slots, vec!["過去", "現在", "未來"]);
        let positions: Vec<_> = result.cards.iter().map(|c| c.position).collect();
        assert_eq!(
            positions,
            vec![Orientation::Upright, Orientation::Reversed, Orientation::Upright]
        );
        assert_eq!(result.summary, "三張日常卡 · 關於 健康 / 身心 的洞察");
    }

    #[test]
    fn test_text_comes_from_resolved_topic() {
        let request = DrawRequest::new("健康 / 身心", SpreadId::Three, false, 42);
        let result = draw(&request);
        for card in &result.cards {
            let source = DECK.iter().find(|c| c.name == card.name).unwrap();
            assert_eq!(card.focus, source.keyword(Topic::Health));
            assert_eq!(card.action, source.action(Topic::Health));
            assert_eq!(card.advice, card.action);
            assert_eq!(card.reflection, source.reflection(Topic::Health));
        }
    }

    #[test]
    fn test_unmatched_topic_uses_career_text() {
        let request = DrawRequest::new("旅行運", SpreadId::Relation, false, 9);
        let result = draw(&request);
        let first = DECK.iter().find(|c| c.name == result.cards[0].name).unwrap();
        assert_eq!(result.cards[0].focus, first.keyword(Topic::Career));
        // Summary keeps the caller's label.
        assert_eq!(result.summary, "關係牌陣 · 關於 旅行運 的洞察");
    }

    #[test]
    fn test_no_reverse_when_disabled() {
        let request = DrawRequest::new("愛情", SpreadId::Six, false, 7);
        let result = draw(&request);
        assert!(result.cards.iter().all(|c| c.position == Orientation::Upright));
    }

    #[test]
    fn test_no_duplicates_for_all_spreads() {
        for spread in SpreadId::ALL {
            for seed in 0..50 {
                let result = draw(&DrawRequest::new("事業", spread, true, seed));
                let names: BTreeSet<_> = result.card_names().into_iter().collect();
                assert_eq!(names.len(), spread.spread().count);
            }
        }
    }

    #[test]
    fn test_same_seed_same_draw() {
        let request = DrawRequest::new("婚姻", SpreadId::Decision, true, 1_700_000_000_000);
        assert_eq!(draw(&request), draw(&request));
    }

    #[test]
    fn test_small_deck_rejected() {
        let request = DrawRequest::new("事業", SpreadId::Six, false, 1);
        let err = draw_from(&DECK[..4], &request, 1).unwrap_err();
        assert_eq!(err, TarotError::DeckTooSmall { deck: 4, needed: 6 });
    }

    #[test]
    fn test_request_deserializes_without_seed() {
        let json = r#"{"topic":"家庭","spread":"cross","allowReverse":true}"#;
        let request: DrawRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.spread, SpreadId::Cross);
        assert!(request.seed.is_none());
        assert_eq!(draw(&request).cards.len(), 6);
    }
}
