//! Fixed major-arcana deck with per-topic text banks.

use crate::types::Topic;

/// A card with one keyword line, action and reflection per topic.
///
/// Text banks are indexed by [`Topic::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TarotCard {
    /// Stable id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Keywords per topic.
    pub keywords: [&'static str; 5],
    /// Actions per topic.
    pub actions: [&'static str; 5],
    /// Reflection questions per topic.
    pub reflections: [&'static str; 5],
}

impl TarotCard {
    /// Keywords for a topic.
    pub fn keyword(&self, topic: Topic) -> &'static str {
        self.keywords[topic.index()]
    }

    /// Action for a topic.
    pub fn action(&self, topic: Topic) -> &'static str {
        self.actions[topic.index()]
    }

    /// Reflection question for a topic.
    pub fn reflection(&self, topic: Topic) -> &'static str {
        self.reflections[topic.index()]
    }
}

/// The full deck in draw order.
pub const DECK: [TarotCard; 8] = [
    TarotCard {
        id: "sun",
        name: "太陽",
        keywords: [
            "成功、聚光燈、公開肯定",
            "坦誠相對、共享喜悅",
            "熱情表白、陽光能量",
            "家庭聚會、親子同樂",
            "活力充沛、需要節奏",
        ],
        actions: [
            "公開分享成果並邀請回饋。",
            "安排共同慶祝的儀式或旅行。",
            "製造可愛驚喜、主動說出喜歡。",
            "召集家人共餐或週末出遊。",
            "維持規律運動與日光浴。",
        ],
        reflections: [
            "我希望被看見的亮點是什麼？",
            "哪些喜悅還沒與伴侶分享？",
            "我能如何用行動帶來溫暖？",
            "多久沒與家人一起歡笑了？",
            "哪些習慣讓我真正有活力？",
        ],
    },
    TarotCard {
        id: "moon",
        name: "月亮",
        keywords: [
            "潛意識、信息未明",
            "情緒波動、需要傾聽",
            "曖昧混沌、放慢腳步",
            "家人敏感、需要陪伴",
            "睡眠與情緒需留意",
        ],
        actions: [
            "暫緩重大決策，蒐集更多訊息。",
            "用溫柔方式詢問對方感受。",
            "別急著下定論，讓關係自然發展。",
            "用陪伴與對話安撫情緒。",
            "調整作息，記錄夢境與心情。",
        ],
        reflections: [
            "我是否忽略了直覺給的警訊？",
            "我有坦誠分享自己的不安嗎？",
            "我害怕面對的真相是什麼？",
            "我能打造更安全的溝通空間嗎？",
            "什麼樣的生活節奏讓我安心？",
        ],
    },
    TarotCard {
        id: "chariot",
        name: "戰車",
        keywords: [
            "行動、勝利、掌控",
            "對齊方向、共同目標",
            "主動追求、掌握節奏",
            "搬遷/出行相關決策",
            "訓練、競賽、保持動能",
        ],
        actions: [
            "制定里程碑、堅定執行計畫。",
            "與伴侶討論下一階段藍圖。",
            "勇敢邀約，展現明確誠意。",
            "規劃旅行或搬家細節。",
            "設定運動計畫並追蹤成果。",
        ],
        reflections: [
            "我真正要征服的戰場是什麼？",
            "我們是否朝同個方向前進？",
            "我的行動是否尊重對方節奏？",
            "此決定對每位家人意味著什麼？",
            "我給身體/心靈多大的壓力？",
        ],
    },
    TarotCard {
        id: "temperance",
        name: "節制",
        keywords: [
            "平衡節奏、整合資源",
            "互相調和、溫柔對話",
            "慢慢磨合差異",
            "界線與共處的平衡",
            "身心療癒、飲食調整",
        ],
        actions: [
            "安排休息、檢視工作步調。",
            "固定開啟「只聊感受」的時間。",
            "尊重雙方步調並設立安全詞。",
            "制定家庭儀式保持和諧。",
            "嘗試冥想/瑜珈/寫日記。",
        ],
        reflections: [
            "我在哪些地方用力過猛？",
            "我們需要怎樣的緩衝空間？",
            "我能否更耐心理解對方？",
            "界線與親密如何並存？",
            "哪些儀式能讓我安定？",
        ],
    },
    TarotCard {
        id: "lovers",
        name: "戀人",
        keywords: [
            "合作、價值觀選擇",
            "親密、誠實、承諾",
            "互相吸引、需要抉擇",
            "凝聚共識、家庭契合",
            "身心連結、傾聽自己",
        ],
        actions: [
            "檢視合作是否符合價值。",
            "坦誠需求並做共同決定。",
            "勇敢定義關係。",
            "召開家庭會議，凝聚願景。",
            "重新評估與自我契合的生活。",
        ],
        reflections: [
            "我是否為了妥協而失去自我？",
            "我願意在關係裡更誠實嗎？",
            "我害怕承諾的原因是什麼？",
            "共同願景是什麼？",
            "哪些選擇讓我更貼近真實自我？",
        ],
    },
    TarotCard {
        id: "hermit",
        name: "隱者",
        keywords: [
            "研究、獨立、內省",
            "需要個人空間、自我探索",
            "沉澱反思、暫緩互動",
            "長輩智慧、彼此給空間",
            "靜心療癒、內在修復",
        ],
        actions: [
            "專注知識累積、優化流程。",
            "誠實提出個人空間需求。",
            "給彼此喘息時間，理解真正需求。",
            "向長輩請教或整理家族故事。",
            "安排靜心、閱讀或散步儀式。",
        ],
        reflections: [
            "我需要哪段獨處時間充電？",
            "我有沒有好好說出自己的界線？",
            "我真的知道自己要的是什麼嗎？",
            "家族智慧對我有何啟發？",
            "我有聽見內在聲音嗎？",
        ],
    },
    TarotCard {
        id: "strength",
        name: "力量",
        keywords: [
            "以柔克剛、堅定領導",
            "包容與療癒",
            "耐心、信任、勇敢",
            "守護與界線",
            "心理韌性與身體力量",
        ],
        actions: [
            "以同理心帶領團隊堅守價值。",
            "以溫柔語氣說出需求與界線。",
            "展現真誠關心與穩定力量。",
            "守護家人同時照顧自身界線。",
            "練習肌力與心靈韌性。",
        ],
        reflections: [
            "我如何用柔性力量影響他人？",
            "我是否願意以耐心取代批判？",
            "我能否同時堅定又溫柔？",
            "支持他人時，我照顧好自己了嗎？",
            "哪些練習讓我更有韌性？",
        ],
    },
    TarotCard {
        id: "wheel",
        name: "命運之輪",
        keywords: [
            "轉折、機會、變動",
            "關係新階段、重要節點",
            "命定相遇、突發事件",
            "家庭角色轉換",
            "起伏變化、需預防",
        ],
        actions: [
            "把握突如其來的邀約並做風險管理。",
            "討論未來計畫與責任分工。",
            "敞開心胸迎接未知緣分。",
            "為可能的生活變化做準備。",
            "提早健檢與建立備援方案。",
        ],
        reflections: [
            "有哪些變化正在敲門？",
            "我們準備好迎接新的階段嗎？",
            "我願意接受命運帶來的驚喜嗎？",
            "家人的節奏需如何重新協調？",
            "我是否忽略了生活節奏的變化？",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tarot::SpreadId;
    use std::collections::BTreeSet;

    #[test]
    fn test_deck_covers_largest_spread() {
        let largest = SpreadId::ALL.iter().map(|id| id.spread().count).max().unwrap();
        assert!(DECK.len() >= largest);
    }

    #[test]
    fn test_card_names_unique() {
        let names: BTreeSet<_> = DECK.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), DECK.len());
    }

    #[test]
    fn test_text_banks_are_filled() {
        for card in DECK {
            for topic in Topic::ALL {
                assert!(!card.keyword(topic).is_empty(), "{} {}", card.id, topic);
                assert!(!card.action(topic).is_empty(), "{} {}", card.id, topic);
                assert!(!card.reflection(topic).is_empty(), "{} {}", card.id, topic);
            }
        }
    }
}
