//! Service middleware and reading metrics.
//!
//! ## Metrics Exposed
//!
//! Emitted as structured log events under the `reading_kernel::metrics` target:
//!
//! - `request` - path pattern, method, status, latency
//! - `report` - report source (api/mock) and whether the remote chart failed
//! - `draw` - spread and card count
//! - `share` - share kind and whether the token decoded

use std::sync::OnceLock;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use regex_lite::Regex;
use tracing::info;

use crate::client::ReportSource;
use crate::share::ShareKind;
use crate::tarot::SpreadId;

/// Metrics middleware that records request counts and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "reading_kernel::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("uuid pattern is valid")
    })
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Record ids are UUIDs; they become `:id`.
pub(crate) fn normalize_path(path: &str) -> String {
    uuid_pattern().replace_all(path, ":id").to_string()
}

/// Record a completed report fetch.
pub fn record_report_metric(source: ReportSource, remote_failed: bool) {
    let source = match source {
        ReportSource::Api => "api",
        ReportSource::Mock => "mock",
    };
    info!(
        target: "reading_kernel::metrics",
        metric_type = "report",
        source = source,
        remote_failed = remote_failed,
        "report_metric"
    );
}

/// Record a completed draw.
pub fn record_draw_metric(spread: SpreadId, card_count: usize) {
    info!(
        target: "reading_kernel::metrics",
        metric_type = "draw",
        spread = spread.as_str(),
        card_count = card_count,
        "draw_metric"
    );
}

/// Record a share token decode attempt.
pub fn record_share_metric(kind: ShareKind, decoded: bool) {
    let result = if decoded { "decoded" } else { "rejected" };
    info!(
        target: "reading_kernel::metrics",
        metric_type = "share",
        kind = kind.param(),
        result = result,
        "share_metric"
    );
}
