//! Debounced availability checks
//!
//! Every keystroke issues a check. A check waits out the debounce window and
//! gives up if a newer one was issued meanwhile; a backend answer that arrives
//! after a newer check was issued is dropped. Only the last-issued check ever
//! produces a result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::rules::CheckField;
use crate::config::ValidationSettings;
use crate::error::{PlatformError, Result};
use crate::ledger::DirectoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
}

#[async_trait]
pub trait AvailabilityBackend: Send + Sync {
    async fn is_available(&self, field: CheckField, value: &str) -> Result<bool>;
}

/// Looks identifiers up in a [`DirectoryStore`]
pub struct StoreAvailability<S> {
    store: Arc<S>,
}

impl<S> StoreAvailability<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: DirectoryStore + 'static> AvailabilityBackend for StoreAvailability<S> {
    async fn is_available(&self, field: CheckField, value: &str) -> Result<bool> {
        let store = Arc::clone(&self.store);
        let value = value.to_string();
        let taken = tokio::task::spawn_blocking(move || match field {
            CheckField::Username => store.username_taken(&value),
            CheckField::Slug => store.slug_taken(&value),
        })
        .await
        .map_err(|e| PlatformError::Server(format!("availability task failed: {}", e)))??;
        Ok(!taken)
    }
}

pub struct DebouncedChecker<B> {
    backend: B,
    field: CheckField,
    window: Duration,
    generation: AtomicU64,
}

impl<B: AvailabilityBackend> DebouncedChecker<B> {
    pub fn new(backend: B, field: CheckField, window: Duration) -> Self {
        Self {
            backend,
            field,
            window,
            generation: AtomicU64::new(0),
        }
    }

    /// Checker using the configured debounce window
    pub fn from_settings(backend: B, field: CheckField, settings: &ValidationSettings) -> Self {
        Self::new(backend, field, Duration::from_millis(settings.debounce_ms))
    }

    pub fn field(&self) -> CheckField {
        self.field
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Check `value` once the input settles.
    ///
    /// `Ok(None)` means a newer check superseded this one. A value that fails
    /// the format rules is rejected without contacting the backend.
    pub async fn check(&self, value: &str) -> Result<Option<Availability>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.field.validate(value)?;

        tokio::time::sleep(self.window).await;
        if !self.is_current(ticket) {
            debug!(field = self.field.as_str(), value, "Check superseded before request");
            return Ok(None);
        }

        let available = self.backend.is_available(self.field, value).await?;
        if !self.is_current(ticket) {
            debug!(field = self.field.as_str(), value, "Stale availability response dropped");
            return Ok(None);
        }

        Ok(Some(if available {
            Availability::Available
        } else {
            Availability::Taken
        }))
    }
}
