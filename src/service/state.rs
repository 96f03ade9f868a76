//! Service state management.
//!
//! Holds the reading client and the record store shared by all handlers.

use std::sync::Arc;

use crate::client::ReadingClient;
use crate::config::KernelConfig;
use crate::store::{AnyBackend, FileBackendError, KeyValueBackend, RecordStore};

/// Shared service state.
pub struct ServiceState<B: KeyValueBackend + 'static> {
    /// Report and draw client.
    pub client: ReadingClient,
    /// Saved profiles and draws.
    pub store: Arc<RecordStore<B>>,
}

impl<B: KeyValueBackend + 'static> ServiceState<B> {
    /// Create service state from a client and a store.
    pub fn new(client: ReadingClient, store: RecordStore<B>) -> Self {
        Self {
            client,
            store: Arc::new(store),
        }
    }
}

impl ServiceState<AnyBackend> {
    /// Create service state from configuration.
    pub fn from_config(config: &KernelConfig) -> Result<Self, FileBackendError> {
        let store = config.open_store()?;
        let client = ReadingClient::from_config(config);
        tracing::info!(
            online = client.is_online(),
            reference_year = client.generator().reference_year(),
            "Reading client initialized"
        );
        Ok(Self::new(client, store))
    }
}

impl<B: KeyValueBackend + 'static> Clone for ServiceState<B> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: Arc::clone(&self.store),
        }
    }
}
