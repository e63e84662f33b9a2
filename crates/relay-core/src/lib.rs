//! # Webhook Ingestion Core
//!
//! Authenticates inbound webhook notifications and forwards each verified
//! event to a downstream delivery sink.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure verification logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//! - **Adapters** (`adapters/`): In-process implementations of outbound ports
//!
//! ## Security Notes
//!
//! - **Timing Safety**: Signature comparison is constant time (`subtle`);
//!   a mismatching byte must not change how long verification takes
//! - **Replay Window**: Timestamps outside the configured tolerance are
//!   rejected even when the signature itself is valid
//! - **Rotation**: Every offered secret is tried against every signature
//!   candidate, so old and new secrets can be valid simultaneously
//! - **Oracle Resistance**: Callers only ever observe a status code; the
//!   specific rejection reason is logged, never returned

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::config::{ConfigError, RelayConfig};
pub use domain::entities::{
    IngestResponse, RawRequest, RejectReason, SignatureHeader, SigningSecret, SinkAttributes,
    VerificationOutcome, VerifiedEvent,
};
pub use domain::errors::HeaderParseError;
pub use domain::header::parse_signature_header;
pub use domain::signature::{compute_signature, verify};
pub use ports::inbound::WebhookIngestApi;
pub use ports::outbound::{EventSink, SecretStore, SecretStoreError, SinkError};
pub use service::{IngestService, SIGNATURE_HEADER};
