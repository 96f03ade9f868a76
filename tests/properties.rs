//! Property tests for the reading kernel.
//!
//! Bounds and determinism that must hold for any input, not just the
//! golden ones.

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::{Map, Number, Value};
use reading_kernel::enrichment::payload::{ApiPalace, ApiStar, BasicInfo};
use reading_kernel::share;
use reading_kernel::store::StoredRecord;
use reading_kernel::types::{MAX_ELEMENT_VALUE, MAX_TOPIC_SCORE, MIN_TOPIC_SCORE};
use reading_kernel::{
    draw, generate_report, merge, seeded_fraction, seeded_index, BirthProfileInput, ChartResult,
    DrawRequest, InMemoryBackend, RecordStore, SpreadId, Topic, ZiweiProfile,
};

// ─────────────────────────────────────────────────────────────────────────────
// Strategies
// ─────────────────────────────────────────────────────────────────────────────

fn profile_strategy() -> impl Strategy<Value = BirthProfileInput> {
    (
        "\\PC{0,8}",
        (1900u32..2030, 1u32..13, 1u32..29),
        (0u32..24, 0u32..60),
        "\\PC{0,6}",
    )
        .prop_map(|(name, (y, m, d), (h, min), city)| {
            BirthProfileInput::new(
                name,
                format!("{y:04}-{m:02}-{d:02}"),
                format!("{h:02}:{min:02}"),
                city,
            )
        })
}

fn spread_strategy() -> impl Strategy<Value = SpreadId> {
    prop::sample::select(SpreadId::ALL.to_vec())
}

fn optional_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("\\PC{0,6}")
}

fn star_strategy() -> impl Strategy<Value = ApiStar> {
    (optional_text(), optional_text(), optional_text()).prop_map(|(name, brightness, mutagen)| {
        ApiStar {
            name,
            brightness,
            mutagen,
        }
    })
}

fn palace_strategy() -> impl Strategy<Value = ApiPalace> {
    (
        prop::option::of(prop::sample::select(vec![
            "命宫", "官祿", "財帛", "夫妻", "疾厄", "田宅", "遷移",
        ])),
        optional_text(),
        optional_text(),
        prop::option::of(prop::collection::vec(star_strategy(), 0..4)),
        prop::option::of(prop::collection::vec(star_strategy(), 0..6)),
    )
        .prop_map(|(name, branch, stem, major, minor)| ApiPalace {
            name: name.map(str::to_string),
            earthly_branch: branch,
            heavenly_stem: stem,
            major_stars: major,
            minor_stars: minor,
        })
}

fn chart_strategy() -> impl Strategy<Value = ChartResult> {
    (
        prop::option::of(prop::collection::vec(palace_strategy(), 0..12)),
        prop::option::of(prop::sample::select(vec![
            "水二局", "木三局", "金四局", "土五局", "火六局", "無局",
        ])),
    )
        .prop_map(|(palaces, class)| ChartResult {
            basic_info: class.map(|c| BasicInfo {
                five_elements_class: Some(c.to_string()),
                ..Default::default()
            }),
            palaces,
            summary: None,
        })
}

/// Arbitrary JSON, including every finite f64 bit pattern.
fn json_strategy() -> impl Strategy<Value = Value> {
    let finite = any::<f64>().prop_filter_map("finite", |f| Number::from_f64(f).map(Value::Number));
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        finite,
        "\\PC{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("\\PC{0,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn test_fraction_stays_in_unit_interval(n in any::<i64>()) {
        let f = seeded_fraction(n);
        prop_assert!((0.0..1.0).contains(&f));
    }

    #[test]
    fn test_index_stays_in_range(n in any::<i64>(), len in 1usize..64) {
        prop_assert!(seeded_index(n, len) < len);
    }

    #[test]
    fn test_report_scores_and_elements_bounded(input in profile_strategy()) {
        let report = generate_report(&input, 2026);
        prop_assert_eq!(report.results.len(), Topic::ALL.len());
        for result in &report.results {
            prop_assert!((MIN_TOPIC_SCORE..=MAX_TOPIC_SCORE).contains(&result.score));
            prop_assert_eq!(result.timeline.len(), 3);
        }
        prop_assert_eq!(report.five_elements.len(), 5);
        for row in &report.five_elements {
            prop_assert!((MIN_TOPIC_SCORE..=MAX_ELEMENT_VALUE).contains(&row.value));
        }
    }

    #[test]
    fn test_report_is_deterministic(input in profile_strategy()) {
        prop_assert_eq!(generate_report(&input, 2026), generate_report(&input, 2026));
    }

    #[test]
    fn test_draw_never_repeats_a_card(
        seed in any::<i64>(),
        spread in spread_strategy(),
        allow_reverse in any::<bool>(),
    ) {
        let result = draw(&DrawRequest::new("事業", spread, allow_reverse, seed));
        prop_assert_eq!(result.cards.len(), spread.spread().count);
        let names: BTreeSet<_> = result.card_names().into_iter().collect();
        prop_assert_eq!(names.len(), result.cards.len());
    }

    #[test]
    fn test_share_token_round_trips_any_json(value in json_strategy()) {
        let token = share::encode(&value);
        prop_assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
        prop_assert_eq!(share::decode_value(&token), Some(value));
    }

    #[test]
    fn test_merge_keeps_report_shape(input in profile_strategy(), chart in chart_strategy()) {
        let template = generate_report(&input, 2026);
        let merged = merge(&template, Some(&chart));

        prop_assert_eq!(merged.scores(), template.scores());
        prop_assert_eq!(merged.five_elements.len(), 5);
        for (m, t) in merged.results.iter().zip(&template.results) {
            prop_assert_eq!(&m.topic, &t.topic);
            prop_assert!(m.stars.len() <= 6.max(t.stars.len()));
        }
        for row in &merged.five_elements {
            prop_assert!((MIN_TOPIC_SCORE..=MAX_ELEMENT_VALUE).contains(&row.value));
        }
    }

    #[test]
    fn test_store_never_exceeds_cap(count in 0usize..20) {
        let store = RecordStore::new(InMemoryBackend::new());
        for i in 0..count {
            let input = BirthProfileInput::new(format!("P{i}"), "2000-01-01", "00:00", "台南");
            let report = generate_report(&input, 2026);
            store.upsert(ZiweiProfile::new(input, report)).unwrap();
        }
        prop_assert_eq!(store.load::<ZiweiProfile>().len(), count.min(ZiweiProfile::CAP));
    }
}
