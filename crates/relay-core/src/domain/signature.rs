//! # Signature Verification
//!
//! Recomputes the keyed hash over `timestamp + "." + body` and compares it
//! against every offered signature candidate with every available secret.
//!
//! ## Security Notes
//!
//! - Comparison is constant time via `subtle`; no short-circuiting byte
//!   equality is used anywhere on the signature path
//! - All (secret, candidate) pairs are folded into one match flag without
//!   early return, so rotation candidates do not change timing shape
//! - The replay-window check runs unconditionally, on both the match and
//!   mismatch paths

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::entities::{
    RejectReason, SignatureHeader, SigningSecret, VerificationOutcome, VerifiedEvent,
};
use super::header::parse_signature_header;

type HmacSha256 = Hmac<Sha256>;

/// Compute the expected signature for a payload: lowercase hex of
/// HMAC-SHA256 over `"{timestamp}.{body}"`.
///
/// Exposed for adapters and tests that need to forge validly signed
/// requests.
#[must_use]
pub fn compute_signature(secret: &SigningSecret, timestamp: i64, body: &[u8]) -> String {
    // HMAC-SHA256 accepts keys of any size per RFC 2104, so new_from_slice
    // cannot fail on real inputs.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts any key size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a webhook body against its signature header.
///
/// Every secret is tried against every `v1` candidate so that secret
/// rotation stays transparent: during a rotation window the sender may
/// still sign with the old secret while the receiver already holds both.
///
/// The freshness check on `header.timestamp` is independent of which
/// secret matched; its purpose is solely to block replay of a previously
/// captured, validly signed request.
#[must_use]
pub fn verify(
    raw_body: &[u8],
    header_value: &str,
    secrets: &[SigningSecret],
    now: i64,
    tolerance: Duration,
) -> VerificationOutcome {
    let header = match parse_signature_header(header_value) {
        Ok(header) => header,
        Err(e) => return VerificationOutcome::Rejected(RejectReason::MalformedHeader(e)),
    };

    let matched = signature_matches(raw_body, &header, secrets);
    let fresh = within_tolerance(header.timestamp, now, tolerance);

    if !matched {
        return VerificationOutcome::Rejected(RejectReason::NoMatchingSignature);
    }

    if !fresh {
        return VerificationOutcome::Rejected(RejectReason::TimestampOutOfTolerance {
            timestamp: header.timestamp,
            now,
        });
    }

    VerificationOutcome::Verified(VerifiedEvent {
        payload: raw_body.to_vec(),
        event_type: extract_event_type(raw_body),
        verified_at: now,
    })
}

/// Compare every (secret, candidate) pair in constant time.
fn signature_matches(raw_body: &[u8], header: &SignatureHeader, secrets: &[SigningSecret]) -> bool {
    let mut matched = false;

    for secret in secrets {
        let expected = compute_signature(secret, header.timestamp, raw_body);
        for candidate in &header.candidates {
            // subtle returns an all-zero Choice for length mismatches, so
            // uneven hex strings fall through without an early exit.
            matched |= bool::from(expected.as_bytes().ct_eq(candidate.as_bytes()));
        }
    }

    matched
}

/// Check `|now - timestamp| <= tolerance`.
fn within_tolerance(timestamp: i64, now: i64, tolerance: Duration) -> bool {
    let skew = now.saturating_sub(timestamp).saturating_abs();
    u64::try_from(skew).is_ok_and(|s| s <= tolerance.as_secs())
}

/// Best-effort event-type extraction for routing labels.
///
/// Decoding failure is non-fatal: the event is still forwarded verbatim
/// with the label left absent. The label is never used for security
/// decisions.
fn extract_event_type(raw_body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(raw_body)
        .ok()?
        .get("type")?
        .as_str()
        .map(str::to_owned)
}
