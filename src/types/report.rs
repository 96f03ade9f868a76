//! Ziwei report types.
//!
//! A [`ZiweiReport`] is a value object: it is derived entirely from a
//! [`BirthProfileInput`](super::profile::BirthProfileInput) plus optional
//! remote enrichment, never mutated in place, and regenerated wholesale when
//! the input changes.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use super::topic::Element;

/// Lowest score a topic can carry.
pub const MIN_TOPIC_SCORE: u32 = 35;
/// Highest score a topic can carry.
pub const MAX_TOPIC_SCORE: u32 = 95;
/// Ceiling for element values after enrichment.
pub const MAX_ELEMENT_VALUE: u32 = 99;

/// One point on the near-term timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// When (e.g. 下個月).
    pub label: String,
    /// What to do then.
    pub tip: String,
}

/// Palace backing a topic card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalaceDetail {
    /// Palace name (e.g. 官祿宮).
    pub name: String,
    /// Primary star.
    pub main_star: String,
    /// Element glyph.
    pub element: String,
    /// Short commentary.
    pub comment: String,
}

/// Favorable or adverse star polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarPolarity {
    /// 吉
    #[serde(rename = "吉")]
    Favorable,
    /// 凶
    #[serde(rename = "凶")]
    Adverse,
}

/// A star influencing a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarInfluence {
    /// Polarity.
    #[serde(rename = "type")]
    pub polarity: StarPolarity,
    /// Star name.
    pub name: String,
    /// Short tip.
    pub tip: String,
}

/// Quarterly energy trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterTrend {
    /// Q1..Q4.
    pub quarter: String,
    /// 推進 or 調整.
    pub theme: String,
    /// Focus for the quarter.
    pub focus: String,
    /// Energy in [40, 95].
    pub energy: u32,
}

/// Major and minor cycle labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleInfo {
    /// 大限 label.
    pub major: String,
    /// 小限 label.
    pub minor: String,
}

/// Palace relationship hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationHints {
    /// Supporting palace.
    pub ally: String,
    /// Opposite palace.
    pub opposite: String,
    /// Triad palaces.
    pub triad: String,
}

/// Kind of star alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarAlertKind {
    /// 四化 transformation.
    #[serde(rename = "四化")]
    Transformation,
    /// 吉
    #[serde(rename = "吉")]
    Favorable,
    /// 凶
    #[serde(rename = "凶")]
    Adverse,
}

/// Highlighted star event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarAlert {
    /// Alert kind.
    #[serde(rename = "type")]
    pub kind: StarAlertKind,
    /// Short label.
    pub label: String,
    /// Detail text.
    pub detail: String,
}

/// Outlook for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualTrend {
    /// e.g. `2026 年`.
    pub year_label: String,
    /// Headline.
    pub highlight: String,
    /// Focus area.
    pub focus: String,
}

/// Scored result for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicResult {
    /// Topic display label.
    pub topic: String,
    /// Score in [35, 95].
    pub score: u32,
    /// Narrative insight.
    pub insight: String,
    /// Suggested action.
    pub action: String,
    /// Three near-term points, in order.
    pub timeline: Vec<TimelineEntry>,
    /// Backing palace.
    pub palace: PalaceDetail,
    /// Star influences.
    pub stars: Vec<StarInfluence>,
    /// Four quarterly trends.
    #[serde(default)]
    pub quarter_trends: Vec<QuarterTrend>,
    /// Cycle labels.
    pub cycle_info: Option<CycleInfo>,
    /// Palace relationship hints.
    pub relation_hints: Option<RelationHints>,
    /// Star alerts.
    #[serde(default)]
    pub star_alerts: Vec<StarAlert>,
    /// Current and next year.
    pub annual_trends: Vec<AnnualTrend>,
    /// Favorable element.
    pub use_god: String,
    /// Unfavorable element.
    pub avoid_god: String,
}

/// One row of the five-element balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiveElementState {
    /// Element.
    pub element: Element,
    /// Value in [35, 99].
    pub value: u32,
    /// Advice text.
    pub advice: String,
    /// Display colour.
    pub color: String,
}

impl FiveElementState {
    /// Build a row from an element's static advice and colour.
    pub fn new(element: Element, value: u32) -> Self {
        Self {
            element,
            value,
            advice: element.advice().to_string(),
            color: element.color().to_string(),
        }
    }

    /// Neutral balance used before any report has been generated, and for
    /// shared payloads that omit their element rows.
    pub fn neutral_table() -> Vec<Self> {
        [
            (Element::Wood, 70, "多親近自然或補綠色蔬菜。"),
            (Element::Fire, 68, "安排運動或陽光浴補足火氣。"),
            (Element::Earth, 65, "保持規律作息與伸展，帶來穩定。"),
            (Element::Metal, 60, "練習呼吸冥想、整理環境補金氣。"),
            (Element::Water, 72, "多補水並透過音樂寫作讓情緒流動。"),
        ]
        .into_iter()
        .map(|(element, value, advice)| Self {
            element,
            value,
            advice: advice.to_string(),
            color: element.color().to_string(),
        })
        .collect()
    }
}

/// Complete generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZiweiReport {
    /// Five topic results in canonical order.
    pub results: Vec<TopicResult>,
    /// One-line summary.
    pub summary: String,
    /// Five element rows in canonical order.
    pub five_elements: Vec<FiveElementState>,
}

impl ZiweiReport {
    /// Stable fingerprint of the report contents (xxh64 of canonical JSON).
    ///
    /// Two reports with the same fingerprint are byte-identical when serialized.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }

    /// Look up a topic result by its display label.
    pub fn topic(&self, label: &str) -> Option<&TopicResult> {
        self.results.iter().find(|r| r.topic == label)
    }

    /// Scores in result order.
    pub fn scores(&self) -> Vec<u32> {
        self.results.iter().map(|r| r.score).collect()
    }
}

/// Per-topic score difference between two reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComparison {
    /// Topic label.
    pub topic: String,
    /// Score in the primary report.
    pub mine: u32,
    /// Score in the compared report.
    pub other: u32,
    /// `mine - other`.
    pub diff: i64,
}

/// Compare two sets of topic results by label.
///
/// Topics present in `mine` but missing from `other` are skipped.
pub fn compare_scores(mine: &[TopicResult], other: &[TopicResult]) -> Vec<ScoreComparison> {
    mine.iter()
        .filter_map(|item| {
            let target = other.iter().find(|r| r.topic == item.topic)?;
            Some(ScoreComparison {
                topic: item.topic.clone(),
                mine: item.score,
                other: target.score,
                diff: i64::from(item.score) - i64::from(target.score),
            })
        })
        .collect()
}
