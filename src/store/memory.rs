//! In-memory key-value backend.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::KeyValueBackend;

/// Error type for the in-memory backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Value exceeds the configured quota.
    #[error("Value for {key} is {len} bytes, quota is {quota}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Value length in bytes.
        len: usize,
        /// Quota in bytes.
        quota: usize,
    },
}

/// Process-local backend, used for tests and as the service default.
///
/// Uses a BTreeMap for deterministic iteration order.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    values: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values longer than `bytes`, like a full browser storage.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Stored keys.
    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl KeyValueBackend for InMemoryBackend {
    type Error = InMemoryError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(InMemoryError::QuotaExceeded {
                    key: key.to_string(),
                    len: value.len(),
                    quota,
                });
            }
        }
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
