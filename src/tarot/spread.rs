//! Spread registry.
//!
//! Spreads are a fixed table; an id outside the table is a caller contract
//! violation and fails at parse time rather than at draw time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TarotError;

/// Identifier of a registered spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpreadId {
    /// Three-card past/present/future.
    #[serde(rename = "3")]
    Three,
    /// Six-card hexagram.
    #[serde(rename = "6")]
    Six,
    /// Simplified Celtic cross.
    #[serde(rename = "cross")]
    Cross,
    /// Four-card relationship spread.
    #[serde(rename = "relation")]
    Relation,
    /// Five-card decision spread.
    #[serde(rename = "decision")]
    Decision,
}

impl SpreadId {
    /// All registered spreads.
    pub const ALL: [SpreadId; 5] = [
        SpreadId::Three,
        SpreadId::Six,
        SpreadId::Cross,
        SpreadId::Relation,
        SpreadId::Decision,
    ];

    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Six => "6",
            Self::Cross => "cross",
            Self::Relation => "relation",
            Self::Decision => "decision",
        }
    }

    /// Definition of this spread.
    pub fn spread(&self) -> Spread {
        match self {
            Self::Three => Spread {
                id: *self,
                label: "三張日常卡",
                count: 3,
                slots: &["過去", "現在", "未來"],
            },
            Self::Six => Spread {
                id: *self,
                label: "六芒星",
                count: 6,
                slots: &["議題核心", "阻力", "助力", "關鍵行動", "外在回饋", "結果"],
            },
            Self::Cross => Spread {
                id: *self,
                label: "凱爾特十字（簡化）",
                count: 6,
                slots: &["現況", "挑戰", "內在根源", "外在影響", "近期", "遠期"],
            },
            Self::Relation => Spread {
                id: *self,
                label: "關係牌陣",
                count: 4,
                slots: &["我", "對方", "互動", "提醒"],
            },
            Self::Decision => Spread {
                id: *self,
                label: "決策牌陣",
                count: 5,
                slots: &["情境", "方案 A", "方案 B", "隱藏因素", "最終趨勢"],
            },
        }
    }
}

impl FromStr for SpreadId {
    type Err = TarotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| TarotError::UnknownSpread(s.to_string()))
    }
}

impl fmt::Display for SpreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spread definition: label, slot count, ordered slot meanings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    /// Spread id.
    pub id: SpreadId,
    /// Display label.
    pub label: &'static str,
    /// Number of cards drawn.
    pub count: usize,
    /// Slot meanings in draw order.
    pub slots: &'static [&'static str],
}

impl Spread {
    /// Meaning of slot `index`, or `位置 N` when the table is shorter than the count.
    pub fn slot_name(&self, index: usize) -> String {
        self.slots
            .get(index)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("位置 {}", index + 1))
    }
}
