//! Topic → palace alias table and name normalization.
//!
//! The remote chart may answer in simplified or traditional characters.
//! Both the aliases and the remote names pass through [`normalize_name`]
//! before comparison.

use crate::types::Topic;

use super::payload::ApiPalace;

/// Simplified → traditional replacements applied during normalization.
const CHAR_REPLACEMENTS: [(char, char); 6] = [
    ('宫', '宮'),
    ('禄', '祿'),
    ('迁', '遷'),
    ('阳', '陽'),
    ('阴', '陰'),
    ('业', '業'),
];

/// Accepted palace spellings for a topic.
pub fn palace_aliases(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Career => &["官祿宮", "官禄宫", "事业宫"],
        Topic::Marriage => &["夫妻宮", "夫妻宫"],
        Topic::Romance => &["遷移宮", "迁移宫", "福德宮", "福德宫"],
        Topic::Family => &["父母宮", "父母宫", "田宅宮", "田宅宫"],
        Topic::Health => &["疾厄宮", "疾厄宫", "命宮", "命宫"],
    }
}

/// Trim and fold simplified variants to their traditional form.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            CHAR_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

/// First remote palace whose normalized name matches one of the topic's aliases.
pub fn resolve_palace(topic: Topic, palaces: &[ApiPalace]) -> Option<&ApiPalace> {
    let aliases: Vec<String> = palace_aliases(topic)
        .iter()
        .map(|alias| normalize_name(alias))
        .collect();
    palaces.iter().find(|palace| {
        let name = normalize_name(palace.name.as_deref().unwrap_or(""));
        aliases.iter().any(|alias| *alias == name)
    })
}
