//! Remote chart API payload.
//!
//! The remote service is duck-typed: any field may be missing, `null`, or an
//! empty string. Every field here is optional, and [`present`] treats empty
//! strings as absent so merge code checks presence exactly once.

use serde::{Deserialize, Serialize};

/// Star as reported by the remote chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStar {
    /// Star name.
    pub name: Option<String>,
    /// Brightness grade.
    pub brightness: Option<String>,
    /// Transformation (化祿, 化忌, ...).
    pub mutagen: Option<String>,
}

/// Palace as reported by the remote chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiPalace {
    /// Palace name, simplified or traditional.
    pub name: Option<String>,
    /// Earthly branch.
    pub earthly_branch: Option<String>,
    /// Heavenly stem.
    pub heavenly_stem: Option<String>,
    /// Major stars; the first is the palace's primary star.
    pub major_stars: Option<Vec<ApiStar>>,
    /// Minor stars.
    pub minor_stars: Option<Vec<ApiStar>>,
}

/// Basic chart facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicInfo {
    /// Birth date echoed back.
    pub birth_date: Option<String>,
    /// Birth time echoed back.
    pub birth_time: Option<String>,
    /// Solar date.
    pub solar_date: Option<String>,
    /// Lunar date.
    pub lunar_date: Option<String>,
    /// Double-hour name.
    pub time_chen: Option<String>,
    /// Double-hour range.
    pub time_range: Option<String>,
    /// Five-element class (e.g. 水二局).
    pub five_elements_class: Option<String>,
    /// Zodiac animal.
    pub zodiac: Option<String>,
    /// Star sign.
    pub sign: Option<String>,
    /// Soul star.
    pub soul: Option<String>,
    /// Body star.
    pub body: Option<String>,
}

/// Remote summary block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSummary {
    /// Free-text description.
    pub description: Option<String>,
    /// Time information.
    pub time_info: Option<String>,
    /// Soul palace.
    pub soul_palace: Option<String>,
    /// Body palace.
    pub body_palace: Option<String>,
}

/// The `result` object of a successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartResult {
    /// Basic chart facts.
    pub basic_info: Option<BasicInfo>,
    /// All palaces.
    pub palaces: Option<Vec<ApiPalace>>,
    /// Summary block.
    pub summary: Option<ChartSummary>,
}

/// Full response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartPayload {
    /// Success flag; anything but `true` is a failure.
    pub success: Option<bool>,
    /// Chart, present on success.
    pub result: Option<ChartResult>,
    /// Informational message.
    pub message: Option<String>,
    /// Error message.
    pub error: Option<String>,
}

impl ChartPayload {
    /// The chart if the envelope reports success and carries a result.
    pub fn into_result(self) -> Result<ChartResult, String> {
        match (self.success, self.result) {
            (Some(true), Some(result)) => Ok(result),
            _ => Err(present(&self.error)
                .or_else(|| present(&self.message))
                .unwrap_or("API 回傳資料異常")
                .to_string()),
        }
    }
}

/// Request body for `POST {base}/calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    /// `YYYY-MM-DD HH:mm`.
    pub birth_datetime: String,
    /// `male` or `female`.
    pub gender: String,
}

/// Borrow a string field when it is present and non-empty.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
