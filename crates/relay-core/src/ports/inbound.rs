//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of the ingest pipeline.

use crate::domain::entities::{IngestResponse, RawRequest};

/// Primary webhook ingest API.
///
/// This is the single entry point the surrounding transport (HTTP handler,
/// lambda shim, test harness) calls per inbound request. Implementations
/// must be thread-safe (`Send + Sync`); each request is handled
/// independently with no ordering guarantees across requests.
#[async_trait::async_trait]
pub trait WebhookIngestApi: Send + Sync {
    /// Handle one inbound webhook request end to end.
    ///
    /// Runs the linear pipeline: extract header, fetch secrets, verify,
    /// forward, and map every outcome to a protocol status code. This
    /// never fails as a Rust call; every fault becomes a status code.
    async fn handle(&self, request: RawRequest) -> IngestResponse;
}
