//! Axum routes for the reading service.

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::client::ReportSource;
use crate::share::{
    self, build_share_url, take_share_token, ShareKind, TarotSharePayload, ZiweiSharePayload,
};
use crate::store::{AnyBackend, KeyValueBackend, StoreError};
use crate::tarot::DrawRequest;
use crate::types::{
    compare_scores, BirthProfileInput, ScoreComparison, TarotRecord, ZiweiProfile,
};
use crate::READING_KERNEL_SCHEMA_VERSION;

use super::middleware::{record_draw_metric, record_report_metric, record_share_metric};
use super::state::ServiceState;

/// Type alias for the service state over the configured backend.
pub type AppState = ServiceState<AnyBackend>;

type Shared<B> = State<Arc<ServiceState<B>>>;
type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to generate (or regenerate) a Ziwei report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Birth form.
    pub input: BirthProfileInput,
    /// Existing profile to overwrite; its notes are kept.
    #[serde(default)]
    pub profile_id: Option<String>,
}

/// Generated report, saved as a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Saved profile.
    pub profile: ZiweiProfile,
    /// Report fingerprint.
    pub fingerprint: String,
    /// Data source.
    pub source: ReportSource,
    /// Why the remote chart was not used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Completed draw, saved as a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResponse {
    /// Saved record.
    pub record: TarotRecord,
    /// Seed the draw used.
    pub seed: i64,
}

/// Saved profiles, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<ZiweiProfile>,
}

/// Saved draws, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub records: Vec<TarotRecord>,
}

/// Note edit for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteUpdate {
    /// Topic label.
    pub topic: String,
    /// Note text.
    pub text: String,
}

/// Profile edit: rename, note, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub note: Option<NoteUpdate>,
}

/// Draw record edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// New topic label (the record's tag).
    pub topic: String,
}

/// Score comparison between two profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    pub mine: String,
    pub other: String,
    pub scores: Vec<ScoreComparison>,
}

/// Request to mint a share token for a saved profile or draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEncodeRequest {
    pub kind: ShareKind,
    /// Profile or record id.
    pub id: String,
    /// Page to attach the token to.
    #[serde(default)]
    pub page_url: Option<String>,
}

/// Minted share token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareEncodeResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Request to ingest a shared reading, by token or by full page URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareDecodeRequest {
    pub kind: ShareKind,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Ingested reading, saved locally under a fresh id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareDecodeResponse {
    pub kind: ShareKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ZiweiProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<TarotRecord>,
    /// Page URL without the token, when a URL was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_url: Option<String>,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub remote_configured: bool,
    pub store_attached: bool,
    pub profile_count: usize,
    pub record_count: usize,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(code, error)))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    tracing::warn!(status = %rejection.status(), error = %rejection.body_text(), "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(
            ErrorResponse::new("INVALID_REQUEST", "Request body is not valid")
                .with_details(rejection.body_text()),
        ),
    )
}

fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound { .. } => api_error(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        StoreError::EmptyLabel => api_error(StatusCode::BAD_REQUEST, "EMPTY_LABEL", e.to_string()),
        _ => {
            tracing::error!(error = %e, "Record store failure");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "STORE_FAILED", e.to_string())
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Generate a report and save it as a profile.
async fn report_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    request: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Json(request) = request.map_err(invalid_body)?;
    let outcome = state.client.fetch_report(&request.input).await;
    record_report_metric(outcome.source, outcome.error.is_some());
    let fingerprint = outcome.report.fingerprint();

    let profile = match request.profile_id {
        Some(id) => {
            let notes = state
                .store
                .get::<ZiweiProfile>(&id)
                .map(|p| p.notes)
                .unwrap_or_default();
            ZiweiProfile::with_id(id, request.input, outcome.report).with_notes(notes)
        }
        None => ZiweiProfile::new(request.input, outcome.report),
    };
    state.store.upsert(profile.clone()).map_err(store_error)?;

    Ok(Json(ReportResponse {
        profile,
        fingerprint,
        source: outcome.source,
        error: outcome.error,
    }))
}

/// Draw cards and save the draw as a record.
async fn draw_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    request: Result<Json<DrawRequest>, JsonRejection>,
) -> Result<Json<DrawResponse>, ApiError> {
    let Json(request) = request.map_err(invalid_body)?;
    let seed = request.effective_seed();
    let request = DrawRequest {
        seed: Some(seed),
        ..request
    };
    let result = state.client.draw(&request).await;
    record_draw_metric(request.spread, result.cards.len());
    if result.cards.is_empty() {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DRAW_FAILED",
            "Draw produced no cards",
        ));
    }

    let record = TarotRecord::new(request.topic, request.spread, request.allow_reverse, result);
    state.store.upsert(record.clone()).map_err(store_error)?;
    Ok(Json(DrawResponse { record, seed }))
}

/// List saved profiles.
async fn list_profiles_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
) -> Json<ProfileListResponse> {
    Json(ProfileListResponse {
        profiles: state.store.load(),
    })
}

/// Rename a profile and/or edit one of its notes.
async fn update_profile_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    Path(id): Path<String>,
    update: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ZiweiProfile>, ApiError> {
    let Json(update) = update.map_err(invalid_body)?;
    if update.name.is_none() && update.note.is_none() {
        return Err(api_error(StatusCode::BAD_REQUEST, "EMPTY_UPDATE", "Nothing to update"));
    }
    let mut profile = state
        .store
        .get::<ZiweiProfile>(&id)
        .ok_or_else(|| store_error(StoreError::not_found::<ZiweiProfile>(&id)))?;
    if let Some(note) = &update.note {
        profile = state
            .store
            .set_note(&id, &note.topic, &note.text)
            .map_err(store_error)?;
    }
    if let Some(name) = &update.name {
        profile = state
            .store
            .rename::<ZiweiProfile>(&id, name)
            .map_err(store_error)?;
    }
    Ok(Json(profile))
}

/// Delete a profile.
async fn delete_profile_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete::<ZiweiProfile>(&id).map_err(store_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(store_error(StoreError::not_found::<ZiweiProfile>(&id))),
    }
}

/// Compare topic scores of two saved profiles.
async fn compare_profiles_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    Path((mine, other)): Path<(String, String)>,
) -> Result<Json<CompareResponse>, ApiError> {
    let find = |id: &str| {
        state.store.get::<ZiweiProfile>(id).ok_or_else(|| {
            store_error(StoreError::not_found::<ZiweiProfile>(id))
        })
    };
    let scores = compare_scores(&find(&mine)?.results, &find(&other)?.results);
    Ok(Json(CompareResponse { mine, other, scores }))
}

/// List saved draws.
async fn list_records_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
) -> Json<RecordListResponse> {
    Json(RecordListResponse {
        records: state.store.load(),
    })
}

/// Relabel a draw record.
async fn update_record_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    Path(id): Path<String>,
    update: Result<Json<RecordUpdate>, JsonRejection>,
) -> Result<Json<TarotRecord>, ApiError> {
    let Json(update) = update.map_err(invalid_body)?;
    state
        .store
        .rename::<TarotRecord>(&id, &update.topic)
        .map(Json)
        .map_err(store_error)
}

/// Delete a draw record.
async fn delete_record_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete::<TarotRecord>(&id).map_err(store_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(store_error(StoreError::not_found::<TarotRecord>(&id))),
    }
}

/// Mint a share token for a saved profile or draw.
async fn share_encode_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    request: Result<Json<ShareEncodeRequest>, JsonRejection>,
) -> Result<Json<ShareEncodeResponse>, ApiError> {
    let Json(request) = request.map_err(invalid_body)?;
    let token = match request.kind {
        ShareKind::Ziwei => {
            let profile = state.store.get::<ZiweiProfile>(&request.id).ok_or_else(|| {
                store_error(StoreError::not_found::<ZiweiProfile>(&request.id))
            })?;
            share::encode(&ZiweiSharePayload::new(profile.input.clone(), profile.report()))
        }
        ShareKind::Tarot => {
            let record = state.store.get::<TarotRecord>(&request.id).ok_or_else(|| {
                store_error(StoreError::not_found::<TarotRecord>(&request.id))
            })?;
            share::encode(&TarotSharePayload::from_record(&record))
        }
    };

    let url = request
        .page_url
        .as_deref()
        .map(|page| build_share_url(page, request.kind, &token))
        .transpose()
        .map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, "INVALID_URL", format!("Invalid page URL: {}", e))
        })?;

    Ok(Json(ShareEncodeResponse { token, url }))
}

/// Ingest a shared reading and save it locally.
async fn share_decode_handler<B: KeyValueBackend + 'static>(
    State(state): Shared<B>,
    request: Result<Json<ShareDecodeRequest>, JsonRejection>,
) -> Result<Json<ShareDecodeResponse>, ApiError> {
    let Json(request) = request.map_err(invalid_body)?;
    let (token, cleaned_url) = match (&request.token, &request.url) {
        (Some(token), _) => (token.clone(), None),
        (None, Some(url)) => {
            let ingest = take_share_token(url, request.kind).ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "MISSING_SHARE_TOKEN",
                    format!("URL carries no '{}' parameter", request.kind.param()),
                )
            })?;
            (ingest.token, Some(ingest.cleaned_url))
        }
        (None, None) => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "MISSING_SHARE_TOKEN",
                "Provide a token or a URL",
            ))
        }
    };

    let invalid = || {
        (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::new("INVALID_SHARE_TOKEN", "Share token could not be decoded")
                    .with_details(request.kind.param()),
            ),
        )
    };

    let mut response = ShareDecodeResponse {
        kind: request.kind,
        profile: None,
        record: None,
        cleaned_url,
    };
    match request.kind {
        ShareKind::Ziwei => {
            let payload = share::decode::<ZiweiSharePayload>(&token);
            record_share_metric(request.kind, payload.is_some());
            let profile = ZiweiProfile::from_share(payload.ok_or_else(invalid)?);
            state.store.upsert(profile.clone()).map_err(store_error)?;
            response.profile = Some(profile);
        }
        ShareKind::Tarot => {
            let payload = share::decode::<TarotSharePayload>(&token);
            record_share_metric(request.kind, payload.is_some());
            let record = TarotRecord::from_share(payload.ok_or_else(invalid)?).ok_or_else(|| {
                api_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_SHARE",
                    "Shared draw has no usable cards",
                )
            })?;
            state.store.upsert(record.clone()).map_err(store_error)?;
            response.record = Some(record);
        }
    }
    Ok(Json(response))
}

/// Health check endpoint (detailed).
async fn health_handler<B: KeyValueBackend + 'static>(State(state): Shared<B>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: READING_KERNEL_SCHEMA_VERSION.to_string(),
        remote_configured: state.client.is_online(),
        store_attached: state.store.is_attached(),
        profile_count: state.store.load::<ZiweiProfile>().len(),
        record_count: state.store.load::<TarotRecord>().len(),
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 if the process is alive. Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the reading service.
pub fn create_router<B: KeyValueBackend + 'static>(state: ServiceState<B>) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Readings
        .route("/api/ziwei/report", post(report_handler::<B>))
        .route("/api/tarot/draw", post(draw_handler::<B>))
        // Saved profiles
        .route("/api/profiles", get(list_profiles_handler::<B>))
        .route(
            "/api/profiles/:id",
            patch(update_profile_handler::<B>).delete(delete_profile_handler::<B>),
        )
        .route("/api/profiles/:id/compare/:other", get(compare_profiles_handler::<B>))
        // Saved draws
        .route("/api/tarot/records", get(list_records_handler::<B>))
        .route(
            "/api/tarot/records/:id",
            patch(update_record_handler::<B>).delete(delete_record_handler::<B>),
        )
        // Share links
        .route("/api/share/encode", post(share_encode_handler::<B>))
        .route("/api/share/decode", post(share_decode_handler::<B>))
        // Health checks
        .route("/health", get(health_handler::<B>))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}
