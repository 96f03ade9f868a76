//! Local record storage.
//!
//! Saved profiles and draws live in two capped buckets of a key-value
//! backend, each holding one JSON array:
//!
//! | bucket          | record          | cap |
//! |-----------------|-----------------|-----|
//! | `ziweiProfiles` | [`ZiweiProfile`] | 6   |
//! | `tarotRecords`  | [`TarotRecord`]  | 8   |
//!
//! Loading never fails: a missing key, non-JSON text or a non-array value
//! reads as an empty list, and malformed entries are dropped one by one.
//!
//! ## Concurrency
//!
//! Every mutation is load → modify → save of the whole bucket. Two writers
//! racing on the same bucket are last-writer-wins; nothing is merged.

pub mod file;
pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{now_millis, TarotRecord, ZiweiProfile};

pub use file::{FileBackend, FileBackendError};
pub use memory::{InMemoryBackend, InMemoryError};

/// String key-value storage backend.
///
/// Mirrors browser local storage: values are opaque strings, and a missing
/// key is `Ok(None)`.
pub trait KeyValueBackend: Send + Sync {
    /// Error type for backend operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// A record type persisted in its own capped bucket.
pub trait StoredRecord: Serialize + DeserializeOwned + Clone {
    /// Bucket key.
    const KEY: &'static str;

    /// Maximum number of records kept; extra records are cut from the tail.
    const CAP: usize;

    /// Whether a rename moves the record to the front of its bucket.
    const PROMOTE_ON_RENAME: bool;

    /// Record id.
    fn id(&self) -> &str;

    /// Replace the user-visible label.
    fn relabel(&mut self, label: String);

    /// Repair or reject a freshly loaded record.
    fn sanitize(self) -> Option<Self> {
        Some(self)
    }
}

impl StoredRecord for ZiweiProfile {
    const KEY: &'static str = "ziweiProfiles";
    const CAP: usize = 6;
    const PROMOTE_ON_RENAME: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn relabel(&mut self, label: String) {
        self.name = label;
        self.updated_at = now_millis();
    }
}

impl StoredRecord for TarotRecord {
    const KEY: &'static str = "tarotRecords";
    const CAP: usize = 8;
    const PROMOTE_ON_RENAME: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn relabel(&mut self, label: String) {
        self.topic = label;
    }

    fn sanitize(self) -> Option<Self> {
        self.sanitized()
    }
}

/// Errors from record store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend read or write failed.
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Records could not be serialized.
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No record with this id in the bucket.
    #[error("Record not found in {bucket}: {id}")]
    NotFound {
        /// Bucket key.
        bucket: &'static str,
        /// Requested id.
        id: String,
    },

    /// Rename to an empty label.
    #[error("Label must not be empty")]
    EmptyLabel,
}

impl StoreError {
    fn backend<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        Self::Backend(Box::new(e))
    }

    /// Not-found error for a record type's bucket.
    pub fn not_found<R: StoredRecord>(id: &str) -> Self {
        Self::NotFound {
            bucket: R::KEY,
            id: id.to_string(),
        }
    }
}

/// Backend chosen at startup.
#[derive(Debug)]
pub enum AnyBackend {
    /// Process-local map.
    Memory(InMemoryBackend),
    /// JSON files in a directory.
    File(FileBackend),
}

/// Error of an [`AnyBackend`].
#[derive(Debug, thiserror::Error)]
pub enum AnyBackendError {
    /// In-memory backend error.
    #[error(transparent)]
    Memory(#[from] InMemoryError),
    /// File backend error.
    #[error(transparent)]
    File(#[from] FileBackendError),
}

impl KeyValueBackend for AnyBackend {
    type Error = AnyBackendError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        match self {
            Self::Memory(b) => Ok(b.get(key)?),
            Self::File(b) => Ok(b.get(key)?),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        match self {
            Self::Memory(b) => Ok(b.set(key, value)?),
            Self::File(b) => Ok(b.set(key, value)?),
        }
    }
}

/// Capped record buckets over an optional backend.
///
/// Without a backend (no storage available) loads are empty and saves are
/// no-ops.
#[derive(Debug)]
pub struct RecordStore<B> {
    backend: Option<B>,
}

impl<B> Default for RecordStore<B> {
    fn default() -> Self {
        Self { backend: None }
    }
}

impl<B: KeyValueBackend> RecordStore<B> {
    /// Store over a backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Store with no backend.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Whether a backend is attached.
    pub fn is_attached(&self) -> bool {
        self.backend.is_some()
    }

    /// Load a bucket, dropping anything that does not parse.
    pub fn load<R: StoredRecord>(&self) -> Vec<R> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };
        let raw = match backend.get(R::KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(bucket = R::KEY, error = %e, "Failed to read bucket");
                return Vec::new();
            }
        };
        let entries = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(bucket = R::KEY, "Bucket is not a JSON array, ignoring");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(bucket = R::KEY, error = %e, "Bucket is not valid JSON, ignoring");
                return Vec::new();
            }
        };

        let total = entries.len();
        let records: Vec<R> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<R>(entry).ok())
            .filter_map(R::sanitize)
            .collect();
        if records.len() < total {
            tracing::debug!(
                bucket = R::KEY,
                dropped = total - records.len(),
                "Dropped malformed records"
            );
        }
        records
    }

    /// Save a bucket, keeping at most `R::CAP` records from the front.
    pub fn save<R: StoredRecord>(&self, records: &[R]) -> Result<(), StoreError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        let kept = &records[..records.len().min(R::CAP)];
        let json = serde_json::to_string(kept)?;
        backend.set(R::KEY, &json).map_err(StoreError::backend)
    }

    /// Record by id.
    pub fn get<R: StoredRecord>(&self, id: &str) -> Option<R> {
        self.load::<R>().into_iter().find(|r| r.id() == id)
    }

    /// Put a record at the front, replacing any record with the same id.
    ///
    /// A record that does not survive sanitizing is not saved. Returns the
    /// bucket as saved.
    pub fn upsert<R: StoredRecord>(&self, record: R) -> Result<Vec<R>, StoreError> {
        let mut records = self.load::<R>();
        let Some(record) = record.sanitize() else {
            tracing::debug!(bucket = R::KEY, "Skipping record with no usable content");
            return Ok(records);
        };
        records.retain(|r| r.id() != record.id());
        records.insert(0, record);
        records.truncate(R::CAP);
        self.save(&records)?;
        Ok(records)
    }

    /// Change a record's label.
    ///
    /// Profiles move to the front; draw records stay in place.
    pub fn rename<R: StoredRecord>(&self, id: &str, label: &str) -> Result<R, StoreError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StoreError::EmptyLabel);
        }
        let mut records = self.load::<R>();
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found::<R>(id))?;
        records[index].relabel(label.to_string());
        let renamed = records[index].clone();
        if R::PROMOTE_ON_RENAME {
            self.upsert(renamed.clone())?;
        } else {
            self.save(&records)?;
        }
        Ok(renamed)
    }

    /// Remove a record. Returns whether anything was removed.
    pub fn delete<R: StoredRecord>(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.load::<R>();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }

    /// Set the note for one topic of a profile, in place.
    pub fn set_note(&self, id: &str, topic: &str, note: &str) -> Result<ZiweiProfile, StoreError> {
        let mut profiles = self.load::<ZiweiProfile>();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found::<ZiweiProfile>(id))?;
        profile.notes.insert(topic.to_string(), note.to_string());
        let updated = profile.clone();
        self.save(&profiles)?;
        Ok(updated)
    }
}
