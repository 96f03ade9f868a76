//! Remote chart client and fallback orchestration.
//!
//! ```text
//! input ─→ generate (template) ─────────────────────────┐
//!       └→ ChartSource::calculate ─ ok ─→ merge(template, chart) → source: api
//!                                  └ err ─→ template + reason   → source: mock
//! ```
//!
//! The local template is always produced; the remote chart can only enrich
//! it. A report fetch never fails.
//!
//! Two overlapping fetches race freely; the caller keeps whichever result it
//! considers latest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::KernelConfig;
use crate::enrichment::{self, ChartPayload, ChartRequest, ChartResult, EnrichmentError};
use crate::generator::ReportGenerator;
use crate::tarot::{self, DrawRequest};
use crate::types::{BirthProfileInput, TarotDraw, ZiweiReport};

/// Remote chart calculator.
#[async_trait]
pub trait ChartSource: Send + Sync {
    /// Compute a chart for one birth moment.
    async fn calculate(&self, request: &ChartRequest) -> Result<ChartResult, EnrichmentError>;
}

/// Map a free-form gender value to what the chart service accepts.
///
/// `male`/`female` pass through, `other` becomes `female`, anything else is
/// `male` when it starts with "m" and `female` otherwise.
pub fn normalize_gender(raw: &str) -> &'static str {
    match raw {
        "male" => "male",
        "female" | "other" => "female",
        _ if raw.to_lowercase().starts_with('m') => "male",
        _ => "female",
    }
}

impl ChartRequest {
    /// Request body for a form input.
    pub fn for_input(input: &BirthProfileInput) -> Self {
        Self {
            birth_datetime: format!("{} {}", input.date, input.time),
            gender: normalize_gender(&input.gender.to_string()).to_string(),
        }
    }
}

/// Chart source calling `POST {base}/calculate` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChartSource {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpChartSource {
    /// Create a source for a base URL (no trailing slash) with a request timeout.
    ///
    /// Fails if the HTTP client cannot be built (for example, no TLS backend).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reading-kernel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            http_client,
        })
    }

    /// Base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChartSource for HttpChartSource {
    async fn calculate(&self, request: &ChartRequest) -> Result<ChartResult, EnrichmentError> {
        let url = format!("{}/calculate", self.base_url);
        tracing::debug!(url = %url, "Requesting remote chart");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let payload: ChartPayload = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Decode(e.to_string()))?;

        payload.into_result().map_err(EnrichmentError::Rejected)
    }
}

/// Simulated latency before results are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Pause before a report.
    pub report: Duration,
    /// Pause before a draw.
    pub draw: Duration,
}

impl Latency {
    /// No pauses.
    pub fn none() -> Self {
        Self {
            report: Duration::ZERO,
            draw: Duration::ZERO,
        }
    }

    async fn pause(duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            report: Duration::from_millis(crate::config::DEFAULT_REPORT_LATENCY_MS),
            draw: Duration::from_millis(crate::config::DEFAULT_DRAW_LATENCY_MS),
        }
    }
}

/// Where a report's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    /// Template merged with the remote chart.
    Api,
    /// Local template only.
    Mock,
}

/// Result of a report fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// The report.
    pub report: ZiweiReport,
    /// Data source.
    pub source: ReportSource,
    /// Why the remote chart was not used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report and draw client.
#[derive(Clone)]
pub struct ReadingClient {
    source: Option<Arc<dyn ChartSource>>,
    generator: ReportGenerator,
    latency: Latency,
}

impl ReadingClient {
    /// Offline client: template reports only.
    pub fn offline(generator: ReportGenerator) -> Self {
        Self {
            source: None,
            generator,
            latency: Latency::default(),
        }
    }

    /// Client enriching reports from a chart source.
    pub fn with_source(source: Arc<dyn ChartSource>, generator: ReportGenerator) -> Self {
        Self {
            source: Some(source),
            generator,
            latency: Latency::default(),
        }
    }

    /// Client built from configuration, for the current year.
    ///
    /// Stays offline if the HTTP client for the configured base URL cannot
    /// be built.
    pub fn from_config(config: &KernelConfig) -> Self {
        let generator = ReportGenerator::for_current_year();
        let source = config.api_base_url.as_ref().and_then(|base| {
            match HttpChartSource::new(base.clone(), config.api_timeout()) {
                Ok(source) => Some(source),
                Err(e) => {
                    tracing::warn!(base_url = %base, error = %e, "Failed to build chart client, staying offline");
                    None
                }
            }
        });
        let client = match source {
            Some(source) => Self::with_source(Arc::new(source), generator),
            None => Self::offline(generator),
        };
        client.with_latency(Latency {
            report: Duration::from_millis(config.report_latency_ms),
            draw: Duration::from_millis(config.draw_latency_ms),
        })
    }

    /// Replace the simulated latency.
    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    /// Whether a chart source is configured.
    pub fn is_online(&self) -> bool {
        self.source.is_some()
    }

    /// Generator in use.
    pub fn generator(&self) -> ReportGenerator {
        self.generator
    }

    /// Generate a report, enriching it from the chart source when possible.
    pub async fn fetch_report(&self, input: &BirthProfileInput) -> ReportOutcome {
        Latency::pause(self.latency.report).await;
        let template = self.generator.generate(input);

        let Some(source) = &self.source else {
            tracing::debug!("No chart source configured, using template report");
            return ReportOutcome {
                report: template,
                source: ReportSource::Mock,
                error: Some(EnrichmentError::NotConfigured.to_string()),
            };
        };

        let request = ChartRequest::for_input(input);
        match source.calculate(&request).await {
            Ok(chart) => ReportOutcome {
                report: enrichment::merge(&template, Some(&chart)),
                source: ReportSource::Api,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Chart enrichment failed, using template report");
                ReportOutcome {
                    report: template,
                    source: ReportSource::Mock,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Draw cards after the simulated draw latency.
    pub async fn draw(&self, request: &DrawRequest) -> TarotDraw {
        Latency::pause(self.latency.draw).await;
        tarot::draw(request)
    }
}

impl std::fmt::Debug for ReadingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadingClient")
            .field("online", &self.is_online())
            .field("generator", &self.generator)
            .field("latency", &self.latency)
            .finish()
    }
}
