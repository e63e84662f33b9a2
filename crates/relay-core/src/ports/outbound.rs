//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define the dependencies the ingest pipeline needs: a secret
//! store to resolve signing secrets and a delivery sink that durably
//! accepts verified events.

use thiserror::Error;

use crate::domain::entities::{SigningSecret, SinkAttributes};

/// Error from secret store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretStoreError {
    /// No secret exists under the requested identifier
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
}

/// Gateway to the secret store.
///
/// The pipeline depends only on this fetch-by-id capability. A store may
/// return more than one secret to support rotation; callers must try every
/// returned secret when verifying and must not mutate the fetched set.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the signing secret(s) stored under `id`.
    ///
    /// The returned order is the store's preference order (current secret
    /// first during rotation), though verification treats all members as
    /// equally valid.
    ///
    /// # Errors
    /// * `SecretStoreError::NotFound` - no secret under this identifier
    /// * `SecretStoreError::Unavailable` - the store could not be reached
    async fn fetch_secret(&self, id: &str) -> Result<Vec<SigningSecret>, SecretStoreError>;
}

/// Error from delivery sink operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The sink has no attached consumer or has shut down
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    /// The sink refused the payload
    #[error("payload rejected: {reason}")]
    Rejected { reason: String },

    /// The delivery call exceeded its bounded timeout
    #[error("delivery timed out")]
    Timeout,
}

/// Gateway to the downstream delivery sink (queue or event bus).
///
/// Forwarding is a single call with no local retry; once `submit` returns
/// `Ok`, the sink is responsible for durability. A cancelled delivery must
/// never be reported as success. Retries on failure belong to the sender's
/// retry-on-5xx behavior, not this port.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// Submit an opaque payload with its routing attributes.
    ///
    /// # Errors
    /// * `SinkError` - the sink is unreachable, full, or rejected the
    ///   payload; the pipeline maps this to a server-error status so the
    ///   sender re-delivers later
    async fn submit(&self, payload: Vec<u8>, attributes: SinkAttributes) -> Result<(), SinkError>;
}

#[async_trait::async_trait]
impl<T: SecretStore + ?Sized> SecretStore for std::sync::Arc<T> {
    async fn fetch_secret(&self, id: &str) -> Result<Vec<SigningSecret>, SecretStoreError> {
        (**self).fetch_secret(id).await
    }
}

#[async_trait::async_trait]
impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    async fn submit(&self, payload: Vec<u8>, attributes: SinkAttributes) -> Result<(), SinkError> {
        (**self).submit(payload, attributes).await
    }
}
