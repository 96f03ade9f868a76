//! External enrichment merger.
//!
//! Overlays remote palace/star data onto a locally generated report.
//!
//! ## Merge Contract
//!
//! - `merge(template, None) == template`
//! - Never removes a topic or element row; only augments
//! - Topics without a matching remote palace are left untouched
//! - Pure: the template is borrowed, the result is a new report

pub mod aliases;
pub mod payload;

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::types::{
    Element, FiveElementState, PalaceDetail, StarInfluence, StarPolarity, Topic, TopicResult,
    ZiweiReport, MAX_ELEMENT_VALUE,
};

pub use aliases::{normalize_name, palace_aliases, resolve_palace};
pub use payload::{
    present, ApiPalace, ApiStar, BasicInfo, ChartPayload, ChartRequest, ChartResult, ChartSummary,
};

/// Maximum stars kept per topic after merging.
pub const MAX_MERGED_STARS: usize = 6;
/// Boost applied to the element named by the chart's five-element class.
pub const ELEMENT_BOOST: u32 = 6;

/// Separator for joined summary and comment parts.
const JOIN: &str = " · ";

/// Why enrichment could not be applied.
///
/// None of these are fatal: callers fall back to the unmerged template and
/// surface the message as a status string.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// No remote base URL configured.
    #[error("尚未設定 ZIWEI_API_BASE_URL，使用範例數據")]
    NotConfigured,
    /// Transport failure or timeout.
    #[error("無法連線到 Ziwei API: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("API 回應 {0}")]
    Status(u16),
    /// Response body was not the expected JSON.
    #[error("API 回應格式錯誤: {0}")]
    Decode(String),
    /// Envelope reported failure or carried no result.
    #[error("{0}")]
    Rejected(String),
}

fn malefic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new("[忌煞劫空耗刑陷破衰喪丧]").expect("malefic star pattern is valid")
    })
}

/// Whether a star name carries an adverse indicator.
pub fn is_malefic_star(name: Option<&str>) -> bool {
    name.map(|n| malefic_pattern().is_match(n)).unwrap_or(false)
}

/// Tip text for a remote star.
pub fn star_tip(star: &ApiStar) -> String {
    let Some(name) = present(&star.name) else {
        return "暫無描述".to_string();
    };
    if let Some(mutagen) = present(&star.mutagen) {
        return format!("{}{}{}", name, JOIN, mutagen);
    }
    if is_malefic_star(Some(name)) {
        format!("{} 需留意波動", name)
    } else {
        format!("{} 可善用優勢", name)
    }
}

/// Merge a remote chart into a template report.
pub fn merge(template: &ZiweiReport, api_result: Option<&ChartResult>) -> ZiweiReport {
    let Some(result) = api_result else {
        return template.clone();
    };
    let palaces = result.palaces.as_deref().unwrap_or(&[]);

    let results = template
        .results
        .iter()
        .map(|item| {
            let palace = Topic::from_label(&item.topic).and_then(|t| resolve_palace(t, palaces));
            enhance_topic(item, palace)
        })
        .collect();

    let class = result
        .basic_info
        .as_ref()
        .and_then(|info| present(&info.five_elements_class));

    ZiweiReport {
        results,
        summary: merged_summary(template, result),
        five_elements: enhance_five_elements(&template.five_elements, class),
    }
}

fn enhance_topic(item: &TopicResult, palace: Option<&ApiPalace>) -> TopicResult {
    let Some(palace) = palace else {
        return item.clone();
    };
    let major = palace.major_stars.as_deref().unwrap_or(&[]);
    let minor = palace.minor_stars.as_deref().unwrap_or(&[]);

    let mut comment_parts = Vec::new();
    if let Some(stem) = present(&palace.heavenly_stem) {
        comment_parts.push(format!("天干 {}", stem));
    }
    if let Some(branch) = present(&palace.earthly_branch) {
        comment_parts.push(format!("地支 {}", branch));
    }
    let major_names: Vec<&str> = major.iter().filter_map(|s| present(&s.name)).collect();
    if !major_names.is_empty() {
        comment_parts.push(format!("主星 {}", major_names.join("、")));
    }
    let comment = if comment_parts.is_empty() {
        item.palace.comment.clone()
    } else {
        comment_parts.join(JOIN)
    };

    let stars: Vec<StarInfluence> = major
        .iter()
        .chain(minor.iter())
        .take(MAX_MERGED_STARS)
        .map(|star| StarInfluence {
            polarity: if is_malefic_star(star.name.as_deref()) {
                StarPolarity::Adverse
            } else {
                StarPolarity::Favorable
            },
            name: present(&star.name).unwrap_or("未知星曜").to_string(),
            tip: star_tip(star),
        })
        .collect();

    TopicResult {
        palace: PalaceDetail {
            name: present(&palace.name)
                .map(str::to_string)
                .unwrap_or_else(|| item.palace.name.clone()),
            main_star: major
                .first()
                .and_then(|s| present(&s.name))
                .map(str::to_string)
                .unwrap_or_else(|| item.palace.main_star.clone()),
            element: item.palace.element.clone(),
            comment,
        },
        stars: if stars.is_empty() { item.stars.clone() } else { stars },
        ..item.clone()
    }
}

fn enhance_five_elements(states: &[FiveElementState], class: Option<&str>) -> Vec<FiveElementState> {
    let Some((class, target)) = class.and_then(|c| Element::find_in(c).map(|e| (c, e))) else {
        return states.to_vec();
    };
    states
        .iter()
        .map(|state| {
            if state.element == target {
                FiveElementState {
                    value: (state.value + ELEMENT_BOOST).min(MAX_ELEMENT_VALUE),
                    advice: format!("{}（命盤屬 {}）", state.advice, class),
                    ..state.clone()
                }
            } else {
                state.clone()
            }
        })
        .collect()
}

fn merged_summary(template: &ZiweiReport, result: &ChartResult) -> String {
    let basic = result.basic_info.as_ref();
    let summary = result.summary.as_ref();
    let mut parts: Vec<String> = Vec::new();

    if let Some(description) = summary.and_then(|s| present(&s.description)) {
        parts.push(description.to_string());
    }
    if let Some(time_info) = summary.and_then(|s| present(&s.time_info)) {
        parts.push(time_info.to_string());
    }
    if let Some(sign) = basic.and_then(|b| present(&b.sign)) {
        parts.push(format!("命宮：{}", sign));
    }
    if let Some(class) = basic.and_then(|b| present(&b.five_elements_class)) {
        parts.push(class.to_string());
    }
    if let (Some(soul), Some(body)) = (
        summary.and_then(|s| present(&s.soul_palace)),
        summary.and_then(|s| present(&s.body_palace)),
    ) {
        parts.push(format!("命身：{} / {}", soul, body));
    }

    if parts.is_empty() {
        template.summary.clone()
    } else {
        parts.join(JOIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_report;
    use crate::types::BirthProfileInput;

    fn template() -> ZiweiReport {
        generate_report(&BirthProfileInput::new("阿美", "1988-11-02", "21:15", "花蓮"), 2026)
    }

    fn star(name: &str) -> ApiStar {
        ApiStar {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn career_palace() -> ApiPalace {
        ApiPalace {
            name: Some("官禄宫".to_string()),
            earthly_branch: Some("午".to_string()),
            heavenly_stem: Some("庚".to_string()),
            major_stars: Some(vec![star("紫微"), star("天府")]),
            minor_stars: Some(vec![
                star("文昌"),
                star("地劫"),
                ApiStar {
                    name: Some("擎羊".to_string()),
                    mutagen: Some("化忌".to_string()),
                    ..Default::default()
                },
                star("天魁"),
                star("陀羅"),
            ]),
        }
    }

    #[test]
    fn test_merge_none_is_identity() {
        let t = template();
        assert_eq!(merge(&t, None), t);
    }

    #[test]
    fn test_merge_empty_result_keeps_everything() {
        let t = template();
        let merged = merge(&t, Some(&ChartResult::default()));
        assert_eq!(merged, t);
    }

    #[test]
    fn test_merge_replaces_matching_palace() {
        let t = template();
        let result = ChartResult {
            palaces: Some(vec![career_palace()]),
            ..Default::default()
        };
        let merged = merge(&t, Some(&result));

        let career = &merged.results[0];
        assert_eq!(career.palace.name, "官禄宫");
        assert_eq!(career.palace.main_star, "紫微");
        assert_eq!(career.palace.element, t.results[0].palace.element);
        assert_eq!(career.palace.comment, "天干 庚 · 地支 午 · 主星 紫微、天府");
        assert_eq!(career.stars.len(), MAX_MERGED_STARS);
        assert_eq!(career.stars[3].polarity, StarPolarity::Adverse);
        assert_eq!(career.stars[3].tip, "地劫 需留意波動");
        assert_eq!(career.stars[4].tip, "擎羊 · 化忌");
        assert_eq!(career.stars[0].tip, "紫微 可善用優勢");
        // Score and narrative stay local.
        assert_eq!(career.score, t.results[0].score);
        assert_eq!(career.insight, t.results[0].insight);

        // Other topics untouched.
        assert_eq!(merged.results[1..], t.results[1..]);
    }

    #[test]
    fn test_palace_without_stars_keeps_template_stars() {
        let t = template();
        let result = ChartResult {
            palaces: Some(vec![ApiPalace {
                name: Some("疾厄宮".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let merged = merge(&t, Some(&result));
        let health = &merged.results[4];
        assert_eq!(health.stars, t.results[4].stars);
        assert_eq!(health.palace.comment, t.results[4].palace.comment);
        assert_eq!(health.palace.main_star, t.results[4].palace.main_star);
    }

    #[test]
    fn test_element_boost_and_annotation() {
        let t = template();
        let result = ChartResult {
            basic_info: Some(BasicInfo {
                five_elements_class: Some("水二局".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(&t, Some(&result));
        let water_before = &t.five_elements[4];
        let water_after = &merged.five_elements[4];
        assert_eq!(water_after.value, (water_before.value + 6).min(99));
        assert!(water_after.advice.ends_with("（命盤屬 水二局）"));
        assert_eq!(merged.five_elements[..4], t.five_elements[..4]);
        assert_eq!(merged.summary, "水二局");
    }

    #[test]
    fn test_element_boost_caps_at_99() {
        let rows = vec![FiveElementState::new(Element::Fire, 97)];
        let boosted = enhance_five_elements(&rows, Some("火六局"));
        assert_eq!(boosted[0].value, 99);
    }

    #[test]
    fn test_summary_parts_order() {
        let t = template();
        let result = ChartResult {
            basic_info: Some(BasicInfo {
                sign: Some("天秤座".to_string()),
                five_elements_class: Some("木三局".to_string()),
                ..Default::default()
            }),
            summary: Some(ChartSummary {
                description: Some("命主貪狼".to_string()),
                time_info: Some("戌時".to_string()),
                soul_palace: Some("貪狼".to_string()),
                body_palace: Some("天相".to_string()),
            }),
            ..Default::default()
        };
        let merged = merge(&t, Some(&result));
        assert_eq!(
            merged.summary,
            "命主貪狼 · 戌時 · 命宮：天秤座 · 木三局 · 命身：貪狼 / 天相"
        );
    }

    #[test]
    fn test_soul_without_body_is_skipped() {
        let t = template();
        let result = ChartResult {
            summary: Some(ChartSummary {
                soul_palace: Some("貪狼".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(merge(&t, Some(&result)).summary, t.summary);
    }

    #[test]
    fn test_unknown_topic_label_untouched() {
        let mut t = template();
        t.results[0].topic = "自訂主題".to_string();
        let result = ChartResult {
            palaces: Some(vec![career_palace()]),
            ..Default::default()
        };
        let merged = merge(&t, Some(&result));
        assert_eq!(merged.results[0], t.results[0]);
    }

    #[test]
    fn test_star_tip_without_name() {
        assert_eq!(star_tip(&ApiStar::default()), "暫無描述");
        assert!(!is_malefic_star(None));
        assert!(is_malefic_star(Some("天空")));
    }
}
