//! Share codec and share links.
//!
//! A result payload travels inside a single query parameter:
//!
//! ```text
//! payload → JSON → UTF-8 bytes → base64 (URL-safe, no padding) → ?ziwei=<token>
//! ```
//!
//! Decoding accepts both alphabets with or without padding, so tokens minted
//! by the browser front end (standard base64) still open. Decode never fails
//! past this boundary: a bad token is logged and reads as "no shared payload".

use base64::{engine::general_purpose, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::tarot::SpreadId;
use crate::types::{
    new_record_id, now_millis, parse_cards, BirthProfileInput, FiveElementState, TarotRecord,
    TopicResult, ZiweiProfile, ZiweiReport,
};

/// Internal decode failure, surfaced only through logs.
#[derive(Debug, thiserror::Error)]
enum ShareError {
    #[error("token is not valid base64")]
    Base64,
    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("payload is not the expected JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode any serializable payload into a URL-safe token.
pub fn encode<T: Serialize>(payload: &T) -> String {
    let json = crate::canonical::to_canonical_bytes(payload);
    general_purpose::URL_SAFE_NO_PAD.encode(json)
}

/// Decode a token into a typed payload. `None` on any failure.
pub fn decode<T: DeserializeOwned>(token: &str) -> Option<T> {
    match try_decode(token) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, token_len = token.len(), "Failed to decode share payload");
            None
        }
    }
}

/// Decode a token into untyped JSON. `None` on any failure.
pub fn decode_value(token: &str) -> Option<serde_json::Value> {
    decode(token)
}

fn try_decode<T: DeserializeOwned>(token: &str) -> Result<T, ShareError> {
    let bytes = base64_decode(token.trim())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ShareError> {
    let engines = [
        &general_purpose::URL_SAFE_NO_PAD,
        &general_purpose::URL_SAFE,
        &general_purpose::STANDARD,
        &general_purpose::STANDARD_NO_PAD,
    ];
    engines
        .iter()
        .find_map(|engine| engine.decode(input).ok())
        .ok_or(ShareError::Base64)
}

// ============================================================================
// Share links
// ============================================================================

/// Which reading a share link carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    /// Ziwei report.
    Ziwei,
    /// Tarot draw.
    Tarot,
}

impl ShareKind {
    /// Query parameter name.
    pub fn param(&self) -> &'static str {
        match self {
            Self::Ziwei => "ziwei",
            Self::Tarot => "tarot",
        }
    }
}

/// Token extracted from a page URL, plus the URL to show afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareIngest {
    /// Raw token.
    pub token: String,
    /// Page URL with its query string removed, so a reload does not re-ingest.
    pub cleaned_url: String,
}

/// Set the share parameter for `kind` on a page URL.
///
/// Other query parameters are kept; an existing parameter of the same kind
/// is replaced.
pub fn build_share_url(page_url: &str, kind: ShareKind, token: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(page_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != kind.param())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(kind.param(), token);
    }
    Ok(url.to_string())
}

/// Pull a share token of `kind` out of a page URL.
///
/// Returns `None` when the URL does not parse or carries no token.
pub fn take_share_token(page_url: &str, kind: ShareKind) -> Option<ShareIngest> {
    let mut url = Url::parse(page_url).ok()?;
    let token = url
        .query_pairs()
        .find(|(k, v)| k == kind.param() && !v.is_empty())
        .map(|(_, v)| v.into_owned())?;
    url.set_query(None);
    Some(ShareIngest {
        token,
        cleaned_url: url.to_string(),
    })
}

// ============================================================================
// Typed payloads
// ============================================================================

/// Shared Ziwei reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZiweiSharePayload {
    /// Form input.
    pub input: BirthProfileInput,
    /// Report summary.
    pub summary: String,
    /// Topic results.
    pub results: Vec<TopicResult>,
    /// Element rows; older links omit them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_elements: Option<Vec<FiveElementState>>,
}

impl ZiweiSharePayload {
    /// Payload for an input and its report.
    pub fn new(input: BirthProfileInput, report: ZiweiReport) -> Self {
        Self {
            input,
            summary: report.summary,
            results: report.results,
            five_elements: Some(report.five_elements),
        }
    }
}

impl ZiweiProfile {
    /// New local profile from an ingested share payload.
    ///
    /// Name falls back to 朋友分享; missing element rows use the neutral table.
    pub fn from_share(payload: ZiweiSharePayload) -> Self {
        let name = if payload.input.name.is_empty() {
            "朋友分享".to_string()
        } else {
            payload.input.name.clone()
        };
        Self {
            id: new_record_id(),
            name,
            input: payload.input,
            results: payload.results,
            summary: payload.summary,
            five_elements: payload
                .five_elements
                .unwrap_or_else(FiveElementState::neutral_table),
            notes: Default::default(),
            updated_at: now_millis(),
        }
    }
}

/// Shared tarot draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TarotSharePayload {
    /// Topic label.
    pub topic: String,
    /// Spread used.
    pub spread: SpreadId,
    /// Whether reversal was allowed.
    #[serde(default)]
    pub allow_reverse: bool,
    /// Draw summary.
    pub summary: String,
    /// Cards; incomplete entries are dropped on ingestion.
    #[serde(default)]
    pub cards: Vec<serde_json::Value>,
}

impl TarotSharePayload {
    /// Payload for a saved record.
    pub fn from_record(record: &TarotRecord) -> Self {
        Self {
            topic: record.topic.clone(),
            spread: record.spread,
            allow_reverse: record.allow_reverse,
            summary: record.summary.clone(),
            cards: record
                .cards
                .iter()
                .filter_map(|c| serde_json::to_value(c).ok())
                .collect(),
        }
    }
}

impl TarotRecord {
    /// New local record from an ingested share payload.
    ///
    /// Cards that fail to parse or lack a name/focus are dropped; `None` when
    /// nothing usable remains.
    pub fn from_share(payload: TarotSharePayload) -> Option<Self> {
        Self {
            id: new_record_id(),
            topic: payload.topic,
            spread: payload.spread,
            allow_reverse: payload.allow_reverse,
            cards: parse_cards(payload.cards),
            summary: payload.summary,
            created_at: now_millis(),
        }
        .sanitized()
    }
}
