//! Core types for the reading kernel.

pub mod topic;
pub mod profile;
pub mod report;
pub mod tarot;
pub mod record;

pub use topic::{Topic, Element};
pub use profile::{Gender, CalendarSystem, BirthProfileInput};
pub use report::{
    TimelineEntry, PalaceDetail, StarPolarity, StarInfluence, QuarterTrend, CycleInfo,
    RelationHints, StarAlertKind, StarAlert, AnnualTrend, TopicResult, FiveElementState,
    ZiweiReport, ScoreComparison, compare_scores,
    MIN_TOPIC_SCORE, MAX_TOPIC_SCORE, MAX_ELEMENT_VALUE,
};
pub use tarot::{Orientation, TarotCardResult, TarotDraw, parse_cards};
pub use record::{ZiweiProfile, TarotRecord, new_record_id, now_millis};
