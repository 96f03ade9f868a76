//! # reading-kernel
//!
//! Deterministic Ziwei reports and tarot draws, with share links and
//! bounded local records.
//!
//! The kernel answers one question:
//!
//! > Given a birth profile (or a topic and a spread), what reading does it
//! > produce, **every time**?
//!
//! ## Core Contract
//!
//! 1. Given a birth profile, derive a seed from its identity fields and
//!    generate a five-topic report plus a five-element table
//! 2. Optionally overlay a remote chart onto that report; the local report
//!    is always the fallback
//! 3. Given a topic, a spread and a seed, draw cards without replacement
//! 4. Serialize any reading into a URL-safe share token, and keep a capped
//!    history of saved readings
//!
//! ## Architecture
//!
//! ```text
//! BirthProfileInput → Seed → ReportGenerator → ZiweiReport ─┬→ share token
//!                                  ↓                         └→ RecordStore
//!                     ChartSource → merge (api / mock)
//!
//! DrawRequest → tarot::draw → TarotDraw → TarotRecord → RecordStore
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same identity fields + same reference year → identical report
//! - Same topic + spread + reverse flag + seed → identical draw
//! - `merge(report, None) == report`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod seed;
pub mod canonical;
pub mod generator;
pub mod tarot;
pub mod enrichment;
pub mod share;
pub mod store;
pub mod config;

#[cfg(feature = "remote")]
pub mod client;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    Topic, Element, Gender, CalendarSystem, BirthProfileInput,
    TopicResult, FiveElementState, ZiweiReport, ScoreComparison, compare_scores,
    Orientation, TarotCardResult, TarotDraw, ZiweiProfile, TarotRecord,
};
pub use seed::{Seed, seeded_fraction, seeded_index};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use generator::{ReportGenerator, generate_report};
pub use tarot::{DrawRequest, Spread, SpreadId, TarotError, draw, draw_from, resolve_topic};
pub use enrichment::{merge, ChartRequest, ChartResult, EnrichmentError};
pub use share::{
    ShareKind, ShareIngest, ZiweiSharePayload, TarotSharePayload,
    build_share_url, take_share_token,
};
pub use store::{
    KeyValueBackend, StoredRecord, RecordStore, StoreError,
    InMemoryBackend, FileBackend, AnyBackend,
};
pub use config::KernelConfig;

#[cfg(feature = "remote")]
pub use client::{ChartSource, HttpChartSource, Latency, ReadingClient, ReportOutcome, ReportSource};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version for all persisted and shared types.
/// Increment on breaking changes to any schema type.
pub const READING_KERNEL_SCHEMA_VERSION: &str = "1.0.0";
