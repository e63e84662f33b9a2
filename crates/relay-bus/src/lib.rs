//! # Relay Bus
//!
//! In-memory delivery sinks for the ingest pipeline. Two shapes are
//! provided, both satisfying the core's `EventSink` port:
//!
//! - [`BroadcastBus`]: bus-style fan-out over `tokio::sync::broadcast`;
//!   every attached subscriber sees every event
//! - [`QueueSink`]: point-to-point over a bounded `tokio::sync::mpsc`
//!   channel; exactly one consumer drains the queue
//!
//! Both are suitable for single-process operation; distributed deployments
//! substitute a different `EventSink` implementation behind the same port.
//! Neither sink retries internally: a full or consumer-less sink surfaces
//! a `SinkError` and the sender's retry-on-5xx behavior handles
//! re-delivery.

pub mod bus;
pub mod queue;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::BroadcastBus;
pub use queue::QueueSink;

use relay_core::SinkAttributes;

/// Default broadcast/queue channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// The envelope a sink delivers to consumers: the verbatim payload plus
/// routing attributes and delivery metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique delivery identifier. Identifies this delivery attempt, not
    /// the upstream event; duplicate webhooks get distinct ids.
    pub id: Uuid,
    /// Origin label (e.g. `stripe`).
    pub source: String,
    /// Event-type label for consumer routing, when one was extracted.
    pub detail_type: Option<String>,
    /// When the event was accepted, seconds since the Unix epoch.
    pub time: i64,
    /// The verbatim webhook body.
    pub payload: Vec<u8>,
}

impl EventEnvelope {
    /// Build an envelope for a payload being submitted now.
    #[must_use]
    pub fn new(payload: Vec<u8>, attributes: SinkAttributes) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: attributes.source,
            detail_type: attributes.detail_type,
            time: unix_now(),
            payload,
        }
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}
