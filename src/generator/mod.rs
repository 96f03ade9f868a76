//! Ziwei report generator.
//!
//! A report is a pure function of the profile seed and a reference year.
//!
//! ## Scoring
//!
//! For topic index `i`:
//!
//! ```text
//! variation = (seed >> (i + 2)) % 18
//! polarity  = +1 for even i, -1 for odd i
//! score     = clamp(70 + polarity * variation, 35, 95)
//! ```
//!
//! Element `j` takes `65 + (seed >> (j + 1)) % 25`, then `+10` for the
//! element selected by `seed % 5` and `-5` for the others, clamped to
//! `[35, 95]`.
//!
//! ## Determinism Guarantees
//!
//! - Same identity fields + same reference year → byte-identical report
//! - No clock reads inside [`ReportGenerator::generate`]

pub mod templates;

use chrono::Datelike;

use crate::seed::Seed;
use crate::types::{
    AnnualTrend, BirthProfileInput, CycleInfo, Element, FiveElementState, PalaceDetail,
    QuarterTrend, RelationHints, StarAlert, StarAlertKind, StarInfluence, StarPolarity,
    TimelineEntry, TopicResult, ZiweiReport, MAX_TOPIC_SCORE, MIN_TOPIC_SCORE,
};

pub use templates::{TopicTemplate, TOPIC_TEMPLATES};

/// Baseline score topics oscillate around.
const BASELINE_SCORE: i64 = 70;
/// Exclusive bound of per-topic variation.
const SCORE_VARIATION: u32 = 18;
/// Baseline element value.
const ELEMENT_BASE: u32 = 65;
/// Exclusive bound of per-element variation.
const ELEMENT_VARIATION: u32 = 25;
/// Bonus for the dominant element.
const DOMINANT_BONUS: i64 = 10;
/// Penalty for the other elements.
const RECESSIVE_PENALTY: i64 = -5;

/// Report generator bound to a reference year.
///
/// The reference year labels the annual trends. It is fixed at construction
/// so generation never reads the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportGenerator {
    reference_year: i32,
}

impl ReportGenerator {
    /// Create a generator for an explicit reference year.
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Create a generator for the current UTC year.
    pub fn for_current_year() -> Self {
        Self::new(chrono::Utc::now().year())
    }

    /// Reference year used for annual trends.
    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Generate a full report. Total: never fails for any input.
    pub fn generate(&self, input: &BirthProfileInput) -> ZiweiReport {
        let seed = Seed::from_profile(input);

        let results: Vec<TopicResult> = TOPIC_TEMPLATES
            .iter()
            .enumerate()
            .map(|(index, template)| self.topic_result(input, seed, index, template))
            .collect();

        let five_elements = five_elements_for(seed);
        let summary = summary_for(input, &results);

        tracing::debug!(
            seed = seed.value(),
            reference_year = self.reference_year,
            "Generated ziwei report"
        );

        ZiweiReport {
            results,
            summary,
            five_elements,
        }
    }

    fn topic_result(
        &self,
        input: &BirthProfileInput,
        seed: Seed,
        index: usize,
        template: &TopicTemplate,
    ) -> TopicResult {
        let variation = i64::from(seed.shifted(index as u32 + 2) % SCORE_VARIATION);
        let polarity: i64 = if index % 2 == 0 { 1 } else { -1 };
        let positive = polarity > 0;
        let score = clamp(
            BASELINE_SCORE + polarity * variation,
            MIN_TOPIC_SCORE,
            MAX_TOPIC_SCORE,
        );

        let quarter_trends = ["Q1", "Q2", "Q3", "Q4"]
            .iter()
            .enumerate()
            .map(|(q, label)| {
                let base = i64::from(score) + (q as i64 - 1) * 3 * polarity;
                QuarterTrend {
                    quarter: label.to_string(),
                    theme: if positive { "推進" } else { "調整" }.to_string(),
                    focus: if q % 2 == 0 { "維繫關係" } else { "自我優化" }.to_string(),
                    energy: clamp(base, 40, 95),
                }
            })
            .collect();

        let timeline = vec![
            entry("下個月", if positive { "適合推新計畫" } else { "先穩住節奏再前進" }),
            entry("三個月內", if score > 75 { "持續增溫、主動出擊" } else { "留意情緒波動" }),
            entry("半年後", if positive { "有轉職/轉換的契機" } else { "建議累積籌碼再行動" }),
        ];

        let [primary, secondary] = template.stars;
        let stars = vec![
            StarInfluence {
                polarity: StarPolarity::Favorable,
                name: primary.to_string(),
                tip: format!("{} 幫助快速聚焦", primary),
            },
            StarInfluence {
                polarity: StarPolarity::Adverse,
                name: secondary.to_string(),
                tip: format!("{} 可能帶來雜訊，記得簡化流程", secondary),
            },
        ];

        let palace = template.palace;
        let cycle_info = CycleInfo {
            major: format!("{} 大限", palace),
            minor: format!("{} 小限", primary),
        };
        let relation_hints = RelationHints {
            ally: format!("{} 與 {} 相助", palace, template.ally_palace()),
            opposite: format!("{} 對宮需留意 {}", palace, template.opposite_palace()),
            triad: format!("{} 三合 {}", palace, template.triad_palaces()),
        };
        let star_alerts = vec![
            StarAlert {
                kind: StarAlertKind::Transformation,
                label: "化祿".to_string(),
                detail: format!("{} 得祿，適合設定收益指標。", palace),
            },
            StarAlert {
                kind: StarAlertKind::Adverse,
                label: "煞曜".to_string(),
                detail: format!("留意 {} 的外在干擾，簡化流程可降低波動。", palace),
            },
        ];

        let annual_trends = vec![
            AnnualTrend {
                year_label: format!("{} 年", self.reference_year),
                highlight: if positive {
                    "能見度提升，適合把握主動"
                } else {
                    "需要整理內部，避免倉促"
                }
                .to_string(),
                focus: if score > 75 {
                    "向外拓展、建立新合作"
                } else {
                    "培養基本功、留意資源配置"
                }
                .to_string(),
            },
            AnnualTrend {
                year_label: format!("{} 年", self.reference_year + 1),
                highlight: if positive {
                    "進入收割期，做好指標管理"
                } else {
                    "穩住根基，避免分心"
                }
                .to_string(),
                focus: if positive {
                    "設定具體 KPI 與回顧節奏"
                } else {
                    "專注重要關係與身心健康"
                }
                .to_string(),
            },
        ];

        TopicResult {
            topic: template.topic.label().to_string(),
            score,
            insight: template.insight(input, score),
            action: template.action.to_string(),
            timeline,
            palace: PalaceDetail {
                name: palace.to_string(),
                main_star: primary.to_string(),
                element: template.element.glyph().to_string(),
                comment: format!("{} 受 {} 影響，{} 氣較為明顯。", palace, primary, template.element),
            },
            stars,
            quarter_trends,
            cycle_info: Some(cycle_info),
            relation_hints: Some(relation_hints),
            star_alerts,
            annual_trends,
            use_god: template.use_god().glyph().to_string(),
            avoid_god: template.avoid_god().glyph().to_string(),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::for_current_year()
    }
}

/// Generate a report for `input` with annual trends labelled from `reference_year`.
pub fn generate_report(input: &BirthProfileInput, reference_year: i32) -> ZiweiReport {
    ReportGenerator::new(reference_year).generate(input)
}

/// Five-element balance for a seed.
pub fn five_elements_for(seed: Seed) -> Vec<FiveElementState> {
    let dominant = (seed.value() % 5) as usize;
    Element::ALL
        .iter()
        .enumerate()
        .map(|(idx, element)| {
            let base = ELEMENT_BASE + seed.shifted(idx as u32 + 1) % ELEMENT_VARIATION;
            let adjust = if idx == dominant { DOMINANT_BONUS } else { RECESSIVE_PENALTY };
            let value = clamp(i64::from(base) + adjust, MIN_TOPIC_SCORE, MAX_TOPIC_SCORE);
            FiveElementState::new(*element, value)
        })
        .collect()
}

fn summary_for(input: &BirthProfileInput, results: &[TopicResult]) -> String {
    let total: u32 = results.iter().map(|r| r.score).sum();
    let average = if results.is_empty() {
        0
    } else {
        (f64::from(total) / results.len() as f64).round() as u32
    };
    let solar = if input.true_solar { "已校正真太陽時" } else { "未校正真太陽時" };
    format!(
        "平均 {} 分 · {}，適合以 {} 的生活節奏為主要參考。",
        average, solar, input.city
    )
}

fn entry(label: &str, tip: &str) -> TimelineEntry {
    TimelineEntry {
        label: label.to_string(),
        tip: tip.to_string(),
    }
}

fn clamp(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Topic;

    fn sample_input() -> BirthProfileInput {
        BirthProfileInput::new("小明", "1990-05-20", "08:30", "台北").with_true_solar(true)
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = ReportGenerator::new(2026);
        let a = generator.generate(&sample_input());
        let b = generator.generate(&sample_input());
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_five_topics_in_order() {
        let report = generate_report(&sample_input(), 2026);
        let topics: Vec<_> = report.results.iter().map(|r| r.topic.as_str()).collect();
        let expected: Vec<_> = Topic::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(topics, expected);
    }

    #[test]
    fn test_scores_follow_formula() {
        let input = sample_input();
        let seed = Seed::from_profile(&input);
        let report = generate_report(&input, 2026);
        for (i, result) in report.results.iter().enumerate() {
            let variation = i64::from(seed.shifted(i as u32 + 2) % 18);
            let expected = if i % 2 == 0 { 70 + variation } else { 70 - variation };
            assert_eq!(i64::from(result.score), expected);
            assert!((35..=95).contains(&result.score));
        }
    }

    #[test]
    fn test_five_elements_boost_exactly_one() {
        let seed = Seed::new(0b1011_0110_1101);
        let rows = five_elements_for(seed);
        assert_eq!(rows.len(), 5);
        let dominant = (seed.value() % 5) as usize;
        for (idx, row) in rows.iter().enumerate() {
            let base = 65 + seed.shifted(idx as u32 + 1) % 25;
            let expected = if idx == dominant { base + 10 } else { base - 5 };
            assert_eq!(row.value, expected.min(95));
            assert_eq!(row.element, Element::ALL[idx]);
        }
    }

    #[test]
    fn test_summary_mentions_average_and_city() {
        let input = sample_input();
        let report = generate_report(&input, 2026);
        let total: u32 = report.scores().iter().sum();
        let average = (f64::from(total) / 5.0).round() as u32;
        assert_eq!(
            report.summary,
            format!("平均 {} 分 · 已校正真太陽時，適合以 台北 的生活節奏為主要參考。", average)
        );
    }

    #[test]
    fn test_summary_without_true_solar() {
        let input = sample_input().with_true_solar(false);
        let report = generate_report(&input, 2026);
        assert!(report.summary.contains("未校正真太陽時"));
    }

    #[test]
    fn test_annual_trends_use_reference_year() {
        let report = generate_report(&sample_input(), 2031);
        let labels: Vec<_> = report.results[0]
            .annual_trends
            .iter()
            .map(|t| t.year_label.as_str())
            .collect();
        assert_eq!(labels, vec!["2031 年", "2032 年"]);
    }

    #[test]
    fn test_timeline_and_stars_shape() {
        let report = generate_report(&sample_input(), 2026);
        for result in &report.results {
            let labels: Vec<_> = result.timeline.iter().map(|t| t.label.as_str()).collect();
            assert_eq!(labels, vec!["下個月", "三個月內", "半年後"]);
            assert_eq!(result.stars.len(), 2);
            assert_eq!(result.stars[0].polarity, StarPolarity::Favorable);
            assert_eq!(result.stars[1].polarity, StarPolarity::Adverse);
            assert_eq!(result.quarter_trends.len(), 4);
            assert!(result.quarter_trends.iter().all(|q| (40..=95).contains(&q.energy)));
        }
    }

    #[test]
    fn test_polarity_drives_timeline_text() {
        let report = generate_report(&sample_input(), 2026);
        assert_eq!(report.results[0].timeline[0].tip, "適合推新計畫");
        assert_eq!(report.results[1].timeline[0].tip, "先穩住節奏再前進");
    }

    #[test]
    fn test_empty_input_is_total() {
        let report = ReportGenerator::new(2026).generate(&BirthProfileInput::default());
        assert_eq!(report.results.len(), 5);
        assert_eq!(report.five_elements.len(), 5);
    }
}
