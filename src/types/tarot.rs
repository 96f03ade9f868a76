//! Tarot draw result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card orientation within a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// 正位
    #[default]
    #[serde(rename = "正位")]
    Upright,
    /// 逆位
    #[serde(rename = "逆位")]
    Reversed,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upright => f.write_str("正位"),
            Self::Reversed => f.write_str("逆位"),
        }
    }
}

/// One drawn card, placed in a spread slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TarotCardResult {
    /// Card name.
    pub name: String,
    /// Orientation.
    pub position: Orientation,
    /// Topic keywords.
    pub focus: String,
    /// Advice text.
    pub advice: String,
    /// Concrete action.
    pub action: String,
    /// Reflection question.
    pub reflection: String,
    /// Meaning of the slot this card landed in.
    pub slot_meaning: String,
}

impl TarotCardResult {
    /// Whether the card carries the fields every reader needs.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.focus.is_empty()
    }
}

/// Parse loosely-typed card entries, keeping only complete cards.
///
/// Entries that are not card objects (or carry `null` text fields) are
/// dropped individually instead of failing the whole list.
pub fn parse_cards(values: Vec<serde_json::Value>) -> Vec<TarotCardResult> {
    values
        .into_iter()
        .filter_map(|value| serde_json::from_value::<TarotCardResult>(value).ok())
        .filter(TarotCardResult::is_complete)
        .collect()
}

/// Serde adapter for card lists read back from storage or share links.
pub(crate) fn deserialize_cards<'de, D>(deserializer: D) -> Result<Vec<TarotCardResult>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(parse_cards(values.unwrap_or_default()))
}

/// Cards plus summary for one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotDraw {
    /// Cards in slot order.
    pub cards: Vec<TarotCardResult>,
    /// `{spread label} · 關於 {topic} 的洞察`.
    pub summary: String,
}

impl TarotDraw {
    /// Card names in slot order.
    pub fn card_names(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.name.as_str()).collect()
    }
}
