//! Static per-topic templates.

use crate::types::{BirthProfileInput, Element, Topic};

/// Template for one topic card.
#[derive(Debug, Clone, Copy)]
pub struct TopicTemplate {
    /// Topic this template renders.
    pub topic: Topic,
    /// Suggested action (fixed per topic).
    pub action: &'static str,
    /// Palace name.
    pub palace: &'static str,
    /// Element of the palace.
    pub element: Element,
    /// Primary star followed by a secondary star.
    pub stars: [&'static str; 2],
}

impl TopicTemplate {
    /// Narrative insight for a score.
    pub fn insight(&self, input: &BirthProfileInput, score: u32) -> String {
        match self.topic {
            Topic::Career => format!(
                "{} 的地氣提升了職涯運勢，整體指數為 {}，適合推進新提案與財務節奏。",
                input.city, score
            ),
            Topic::Marriage => format!(
                "目前溝通敏感度提高，指數 {}，建議以傾聽取代辯論，並運用共同回憶降溫。",
                score
            ),
            Topic::Romance => {
                let name = if input.name.is_empty() { "你" } else { input.name.as_str() };
                format!(
                    "{} 的桃花宮受到流年活化，指數 {}，若有新對象可慢慢升溫。",
                    name, score
                )
            }
            Topic::Family => format!(
                "家庭互動指數 {}，提醒關心父母身心，同時給下一代更多陪伴。",
                score
            ),
            Topic::Health => format!(
                "疾厄宮顯示指數 {}，若長期熬夜或久坐，務必為自己安排補給與運動。",
                score
            ),
        }
    }

    /// Palace named as the supporting ally.
    pub fn ally_palace(&self) -> &'static str {
        if self.topic == Topic::Family { "田宅宮" } else { "遷移宮" }
    }

    /// Palace named as the opposite.
    pub fn opposite_palace(&self) -> &'static str {
        if self.topic == Topic::Career { "田宅宮" } else { "官祿宮" }
    }

    /// Palaces named as the triad.
    pub fn triad_palaces(&self) -> &'static str {
        if self.topic == Topic::Health { "命宮/遷移宮" } else { "財帛/官祿宮" }
    }

    /// Favorable element for this palace.
    pub fn use_god(&self) -> Element {
        match self.element {
            Element::Wood | Element::Water => Element::Wood,
            _ => Element::Fire,
        }
    }

    /// Unfavorable element for this palace.
    pub fn avoid_god(&self) -> Element {
        if self.element == Element::Earth { Element::Metal } else { Element::Earth }
    }
}

/// One template per topic, in canonical topic order.
pub const TOPIC_TEMPLATES: [TopicTemplate; 5] = [
    TopicTemplate {
        topic: Topic::Career,
        action: "在接下來的兩週設定一次回顧，並優先完成最能帶來資源的合作。",
        palace: "官祿宮",
        element: Element::Metal,
        stars: ["武曲", "祿存"],
    },
    TopicTemplate {
        topic: Topic::Marriage,
        action: "安排沒有腳本的相處時光，隔三天再談正事，讓情緒沉澱。",
        palace: "夫妻宮",
        element: Element::Wood,
        stars: ["天喜", "紅鸞"],
    },
    TopicTemplate {
        topic: Topic::Romance,
        action: "把注意力放在日常細節，如訊息回覆節奏或共同活動。",
        palace: "遷移宮",
        element: Element::Fire,
        stars: ["貪狼", "右弼"],
    },
    TopicTemplate {
        topic: Topic::Family,
        action: "主動安排電話或共餐，記錄長輩健康狀態並與家人分享。",
        palace: "父母宮",
        element: Element::Water,
        stars: ["天梁", "天鉞"],
    },
    TopicTemplate {
        topic: Topic::Health,
        action: "調整睡眠與飲食節奏，必要時安排檢查或靜心課程。",
        palace: "疾厄宮",
        element: Element::Earth,
        stars: ["天同", "地空"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_follow_topic_order() {
        let topics: Vec<_> = TOPIC_TEMPLATES.iter().map(|t| t.topic).collect();
        assert_eq!(topics, Topic::ALL.to_vec());
    }

    #[test]
    fn test_romance_insight_defaults_name() {
        let input = BirthProfileInput::new("", "2000-01-01", "00:00", "高雄");
        let text = TOPIC_TEMPLATES[2].insight(&input, 80);
        assert!(text.starts_with("你 的桃花宮"));
    }

    #[test]
    fn test_gods() {
        assert_eq!(TOPIC_TEMPLATES[0].use_god(), Element::Fire);
        assert_eq!(TOPIC_TEMPLATES[1].use_god(), Element::Wood);
        assert_eq!(TOPIC_TEMPLATES[4].avoid_god(), Element::Metal);
        assert_eq!(TOPIC_TEMPLATES[3].avoid_god(), Element::Earth);
    }
}
