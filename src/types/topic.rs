//! Fixed life topics and the five elements.
//!
//! Every report and every comparable record is organised around the same
//! five topics in the same order. The order is part of the contract: report
//! results, alias lookups and tarot text banks all index by it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five fixed life domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Career and wealth.
    Career,
    /// Marriage and partnership.
    Marriage,
    /// Romance and new relationships.
    Romance,
    /// Family (parents and children).
    Family,
    /// Health, body and mind.
    Health,
}

impl Topic {
    /// All topics in canonical order.
    pub const ALL: [Topic; 5] = [
        Topic::Career,
        Topic::Marriage,
        Topic::Romance,
        Topic::Family,
        Topic::Health,
    ];

    /// Display label used on topic cards and as the persisted topic field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Career => "事業 / 財運",
            Self::Marriage => "婚姻 / 伴侶",
            Self::Romance => "愛情 / 新關係",
            Self::Family => "家庭（父母＋子女）",
            Self::Health => "健康 / 身心",
        }
    }

    /// Two-character key used for prefix matching free-text topic labels.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Career => "事業",
            Self::Marriage => "婚姻",
            Self::Romance => "愛情",
            Self::Family => "家庭",
            Self::Health => "健康",
        }
    }

    /// Position of this topic in [`Topic::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Exact lookup by display label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Resolve a free-text label to a topic by key prefix.
    ///
    /// Labels that match no key resolve to [`Topic::Career`], so any label
    /// yields a reading.
    pub fn resolve_prefix(label: &str) -> Self {
        match Self::ALL.into_iter().find(|t| label.starts_with(t.key())) {
            Some(topic) => topic,
            None => {
                tracing::debug!(label = %label, "No topic key prefix matched, defaulting to career");
                Self::Career
            }
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the five elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    /// 木
    #[serde(rename = "木")]
    Wood,
    /// 火
    #[serde(rename = "火")]
    Fire,
    /// 土
    #[serde(rename = "土")]
    Earth,
    /// 金
    #[serde(rename = "金")]
    Metal,
    /// 水
    #[serde(rename = "水")]
    Water,
}

impl Element {
    /// All elements in canonical order.
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// Single-glyph name.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Wood => "木",
            Self::Fire => "火",
            Self::Earth => "土",
            Self::Metal => "金",
            Self::Water => "水",
        }
    }

    /// Balancing advice shown next to the element bar.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Wood => "多親近自然、補綠色蔬菜或芳療幫助放鬆。",
            Self::Fire => "適合運動或陽光浴，紅色系穿著能增補能量。",
            Self::Earth => "保持規律作息與伸展，暖色系食物帶來穩定感。",
            Self::Metal => "專注呼吸與冥想，整潔環境也能補強金氣。",
            Self::Water => "多補水、接觸音樂或寫作幫助內在流動。",
        }
    }

    /// Display colour as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Wood => "#3b873e",
            Self::Fire => "#d25b4d",
            Self::Earth => "#c28f52",
            Self::Metal => "#c4b19b",
            Self::Water => "#4a6fb3",
        }
    }

    /// First element whose glyph occurs in `text`, in canonical order.
    pub fn find_in(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| text.contains(e.glyph()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}
