//! # Domain Entities
//!
//! Core data structures for webhook verification and forwarding.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::HeaderParseError;

// =============================================================================
// Inbound Request
// =============================================================================

/// An inbound webhook request, reduced to what verification needs.
///
/// The body is an uninterpreted byte sequence and must be used verbatim:
/// re-serializing it would change the bytes the signature was computed over.
#[derive(Clone, Debug)]
pub struct RawRequest {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawRequest {
    /// Create a request from raw header pairs and the verbatim body bytes.
    #[must_use]
    pub fn new(headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Look up a header value, case-insensitively.
    ///
    /// Returns the first matching header when duplicates are present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The verbatim request body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

// =============================================================================
// Signing Secrets
// =============================================================================

/// An opaque signing secret plus its identifier.
///
/// Held in memory for the process lifetime, zeroized on drop, and never
/// written to disk or logs. `Debug` redacts the material.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret {
    #[zeroize(skip)]
    id: String,
    material: Vec<u8>,
}

impl SigningSecret {
    /// Create a secret from its identifier and key material.
    #[must_use]
    pub fn new(id: impl Into<String>, material: impl AsRef<[u8]>) -> Self {
        Self {
            id: id.into(),
            material: material.as_ref().to_vec(),
        }
    }

    /// The secret's identifier (safe to log).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw key material.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.material
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("id", &self.id)
            .field("material", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Signature Header
// =============================================================================

/// Parsed form of the webhook signature header.
///
/// Wire format: `t=<unix-seconds>,v1=<hex>[,v1=<hex>...]`. Multiple `v1`
/// entries are valid and represent rotation candidates; unrecognized keys
/// are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Sender-asserted signing time, seconds since the Unix epoch.
    pub timestamp: i64,
    /// Hex-encoded `v1` signature candidates, in header order.
    pub candidates: Vec<String>,
}

// =============================================================================
// Verification Outcome
// =============================================================================

/// The outcome of successful verification.
///
/// Created by the verifier, consumed exactly once by the forwarder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedEvent {
    /// The original raw body, the canonical payload to forward.
    pub payload: Vec<u8>,
    /// Event-type label pulled from the decoded payload, for routing and
    /// observability only. Absent when the body is not decodable JSON.
    pub event_type: Option<String>,
    /// When verification happened, seconds since the Unix epoch.
    pub verified_at: i64,
}

/// Why a request was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The signature header is absent from the request.
    MissingHeader,
    /// The signature header could not be parsed.
    MalformedHeader(HeaderParseError),
    /// No (secret, signature) pair agreed with the body.
    NoMatchingSignature,
    /// The asserted timestamp falls outside the replay window.
    TimestampOutOfTolerance {
        /// Sender-asserted timestamp from the header.
        timestamp: i64,
        /// Receiver clock at verification time.
        now: i64,
    },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "signature header missing"),
            Self::MalformedHeader(e) => write!(f, "malformed signature header: {e}"),
            Self::NoMatchingSignature => write!(f, "no matching signature"),
            Self::TimestampOutOfTolerance { timestamp, now } => {
                write!(f, "timestamp {timestamp} outside tolerance at {now}")
            }
        }
    }
}

/// Tagged verification result. No partial or ambiguous states exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The request is authentic and fresh.
    Verified(VerifiedEvent),
    /// The request failed verification for the given reason.
    Rejected(RejectReason),
}

// =============================================================================
// Forwarding Attributes
// =============================================================================

/// Routing attributes attached to a forwarded payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkAttributes {
    /// Origin label identifying the webhook source (e.g. `stripe`).
    pub source: String,
    /// Event-type label for downstream routing, when one was extracted.
    pub detail_type: Option<String>,
}

// =============================================================================
// Protocol Response
// =============================================================================

/// Protocol-visible outcome of handling a request: a status code only.
///
/// The sender treats 5xx as "retry later" and 4xx as "do not retry"; no
/// response body semantics are defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestResponse {
    /// HTTP-like status code.
    pub status: u16,
}

impl IngestResponse {
    /// Event verified and durably accepted by the sink.
    pub const OK: Self = Self { status: 200 };
    /// Verification failed; the sender must not retry.
    pub const BAD_REQUEST: Self = Self { status: 400 };
    /// Operational fault; the sender should retry later.
    pub const SERVER_ERROR: Self = Self { status: 500 };

    /// Whether this is a success response.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 200
    }
}
