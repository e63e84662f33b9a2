//! # Signature Header Parsing
//!
//! Parses the `t=<unix-seconds>,v1=<hex>[,v1=<hex>...]` header format into
//! its structured form. Parsing never touches the secret material; a
//! malformed header is rejected before any hash computation happens.

use super::entities::SignatureHeader;
use super::errors::HeaderParseError;

/// Parse a signature header value.
///
/// The header is a comma-separated list of `key=value` pairs. Recognized
/// keys are `t` (timestamp, seconds since epoch) and `v1` (hex signature,
/// repeatable for rotation candidates); unrecognized keys are ignored per
/// the sender's forward-compatibility contract.
///
/// # Errors
///
/// - [`HeaderParseError::MissingTimestamp`] when no `t` field is present
/// - [`HeaderParseError::InvalidTimestamp`] when `t` is not an integer
/// - [`HeaderParseError::MissingSignature`] when no `v1` entries are present
pub fn parse_signature_header(value: &str) -> Result<SignatureHeader, HeaderParseError> {
    let mut timestamp: Option<Result<i64, HeaderParseError>> = None;
    let mut candidates = Vec::new();

    for pair in value.split(',') {
        let Some((key, item)) = pair.split_once('=') else {
            // Stray token without '='; ignored like any unrecognized key.
            continue;
        };

        match key.trim() {
            "t" => {
                if timestamp.is_none() {
                    timestamp = Some(
                        item.trim()
                            .parse::<i64>()
                            .map_err(|_| HeaderParseError::InvalidTimestamp(item.trim().into())),
                    );
                }
            }
            "v1" => candidates.push(item.trim().to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(HeaderParseError::MissingTimestamp)??;

    if candidates.is_empty() {
        return Err(HeaderParseError::MissingSignature);
    }

    Ok(SignatureHeader {
        timestamp,
        candidates,
    })
}
