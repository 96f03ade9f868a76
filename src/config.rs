//! Runtime configuration.
//!
//! All settings can be configured via environment variables:
//! - `ZIWEI_API_BASE_URL`: remote chart service (unset or empty: offline, mock reports)
//! - `ZIWEI_API_TIMEOUT_MS`: remote request timeout (default: 8000)
//! - `READING_STORE_DIR`: directory for saved records (unset: in-memory)
//! - `REPORT_LATENCY_MS`: simulated latency before a report (default: 400)
//! - `DRAW_LATENCY_MS`: simulated latency before a draw (default: 350)

use std::path::PathBuf;
use std::time::Duration;

use crate::store::{AnyBackend, FileBackend, FileBackendError, InMemoryBackend, RecordStore};

/// Default remote timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 8000;
/// Default report latency in milliseconds.
pub const DEFAULT_REPORT_LATENCY_MS: u64 = 400;
/// Default draw latency in milliseconds.
pub const DEFAULT_DRAW_LATENCY_MS: u64 = 350;

/// Kernel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Remote chart base URL, without trailing slash.
    pub api_base_url: Option<String>,
    /// Remote request timeout in milliseconds.
    pub api_timeout_ms: u64,
    /// Directory for the file backend.
    pub store_dir: Option<PathBuf>,
    /// Simulated report latency in milliseconds.
    pub report_latency_ms: u64,
    /// Simulated draw latency in milliseconds.
    pub draw_latency_ms: u64,
}

impl KernelConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_base_url: lookup("ZIWEI_API_BASE_URL").and_then(|s| normalize_base_url(&s)),
            api_timeout_ms: lookup("ZIWEI_API_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_API_TIMEOUT_MS),
            store_dir: lookup("READING_STORE_DIR")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            report_latency_ms: lookup("REPORT_LATENCY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REPORT_LATENCY_MS),
            draw_latency_ms: lookup("DRAW_LATENCY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DRAW_LATENCY_MS),
        }
    }

    /// Remote request timeout.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    /// Open the configured record store.
    pub fn open_store(&self) -> Result<RecordStore<AnyBackend>, FileBackendError> {
        let backend = match &self.store_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "Using file record store");
                AnyBackend::File(FileBackend::open(dir)?)
            }
            None => {
                tracing::info!("Using in-memory record store");
                AnyBackend::Memory(InMemoryBackend::new())
            }
        };
        Ok(RecordStore::new(backend))
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Trim a base URL and drop one trailing slash. Empty means offline.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> KernelConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        KernelConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.api_base_url, None);
        assert_eq!(config.api_timeout_ms, 8000);
        assert_eq!(config.store_dir, None);
        assert_eq!(config.report_latency_ms, 400);
        assert_eq!(config.draw_latency_ms, 350);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("ZIWEI_API_BASE_URL", "  https://chart.example.com/v1/ "),
            ("ZIWEI_API_TIMEOUT_MS", "1500"),
            ("READING_STORE_DIR", "/var/lib/readings"),
            ("REPORT_LATENCY_MS", "0"),
            ("DRAW_LATENCY_MS", "nope"),
        ]);
        assert_eq!(config.api_base_url.as_deref(), Some("https://chart.example.com/v1"));
        assert_eq!(config.api_timeout(), Duration::from_millis(1500));
        assert_eq!(config.store_dir, Some(PathBuf::from("/var/lib/readings")));
        assert_eq!(config.report_latency_ms, 0);
        assert_eq!(config.draw_latency_ms, 350);
    }

    #[test]
    fn test_blank_base_url_is_offline() {
        assert_eq!(config(&[("ZIWEI_API_BASE_URL", "   ")]).api_base_url, None);
        assert_eq!(config(&[("ZIWEI_API_BASE_URL", "/")]).api_base_url, None);
    }

    #[test]
    fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = KernelConfig {
            store_dir: Some(dir.path().to_path_buf()),
            ..KernelConfig::default()
        };
        assert!(config.open_store().unwrap().is_attached());
    }
}
