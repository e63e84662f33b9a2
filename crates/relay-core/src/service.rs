//! # Ingest Service
//!
//! Application service layer that implements the `WebhookIngestApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`WebhookIngestApi`)
//! - Uses the outbound ports (`SecretStore`, `EventSink`)
//! - Delegates signature verification to the domain layer
//!
//! ## Pipeline
//!
//! ```text
//! RawRequest ──→ header present? ──→ fetch secrets ──→ verify ──→ forward ──→ 200
//!                     │ no                │ fault         │ reject    │ fault
//!                     ↓                   ↓               ↓           ↓
//!                    400                 500             400         500
//! ```
//!
//! A strict linear pipeline: each stage either proceeds or terminates with
//! a final status. Rejection reasons are logged but never distinguished in
//! the response code, so the sender cannot use the endpoint as a
//! verification oracle.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::domain::config::RelayConfig;
use crate::domain::entities::{
    IngestResponse, RawRequest, RejectReason, SigningSecret, SinkAttributes, VerificationOutcome,
};
use crate::domain::signature;
use crate::ports::inbound::WebhookIngestApi;
use crate::ports::outbound::{EventSink, SecretStore, SecretStoreError};

/// Name of the request header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Webhook ingest service.
///
/// Holds the only shared mutable state in the pipeline: the cached signing
/// secret set, fetched at most once per process. `tokio::sync::OnceCell`
/// gives single-flight behavior under concurrent first use, so a burst of
/// requests arriving before the first fetch completes performs exactly one
/// store round trip. A failed fetch leaves the cell empty; the next
/// request retries.
pub struct IngestService<S: SecretStore, K: EventSink> {
    config: RelayConfig,
    secrets: S,
    sink: K,
    cache: OnceCell<Vec<SigningSecret>>,
}

impl<S: SecretStore, K: EventSink> IngestService<S, K> {
    /// Create a new ingest service.
    ///
    /// # Arguments
    /// * `config` - validated relay configuration
    /// * `secrets` - the secret store gateway
    /// * `sink` - the delivery sink gateway
    pub fn new(config: RelayConfig, secrets: S, sink: K) -> Self {
        Self {
            config,
            secrets,
            sink,
            cache: OnceCell::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Resolve the signing secret set, fetching on first use.
    ///
    /// Cached secrets are immutable for the process lifetime.
    async fn signing_secrets(&self) -> Result<&[SigningSecret], SecretStoreError> {
        self.cache
            .get_or_try_init(|| async {
                debug!(secret_id = %self.config.secret_id, "Fetching signing secrets");
                self.secrets.fetch_secret(&self.config.secret_id).await
            })
            .await
            .map(Vec::as_slice)
    }
}

#[async_trait::async_trait]
impl<S: SecretStore, K: EventSink> WebhookIngestApi for IngestService<S, K> {
    async fn handle(&self, request: RawRequest) -> IngestResponse {
        // Stage 1: the signature header must be present.
        let Some(header_value) = request.header(SIGNATURE_HEADER) else {
            warn!(reason = %RejectReason::MissingHeader, "Webhook rejected");
            return IngestResponse::BAD_REQUEST;
        };

        // Stage 2: resolve secrets. An unreachable store is an operational
        // fault, not a client error.
        let secrets = match self.signing_secrets().await {
            Ok(secrets) => secrets,
            Err(e) => {
                error!(error = %e, "Signing secret unavailable");
                return IngestResponse::SERVER_ERROR;
            }
        };

        // Stage 3: verify signature and freshness.
        let event = match signature::verify(
            request.body(),
            header_value,
            secrets,
            unix_now(),
            self.config.tolerance(),
        ) {
            VerificationOutcome::Verified(event) => event,
            VerificationOutcome::Rejected(reason) => {
                // Logged with full detail; the response stays an opaque 400.
                warn!(reason = %reason, "Webhook rejected");
                return IngestResponse::BAD_REQUEST;
            }
        };

        // Stage 4: forward the verbatim payload. A delivery fault maps to
        // 500 so the sender's retry policy re-delivers the webhook later.
        let attributes = SinkAttributes {
            source: self.config.origin.clone(),
            detail_type: event.event_type.clone(),
        };

        if let Err(e) = self.sink.submit(event.payload, attributes).await {
            error!(error = %e, "Event delivery failed");
            return IngestResponse::SERVER_ERROR;
        }

        info!(
            event_type = event.event_type.as_deref().unwrap_or("unknown"),
            destination = %self.config.sink_destination,
            "Webhook verified and forwarded"
        );
        IngestResponse::OK
    }
}

/// Receiver clock, seconds since the Unix epoch.
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

// =============================================================================
// TESTS
// =============================================================================
