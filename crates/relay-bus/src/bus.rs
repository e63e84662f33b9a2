//! # Broadcast Bus
//!
//! Bus-style sink over `tokio::sync::broadcast`: every attached subscriber
//! receives every envelope. Submission fails when no subscriber is
//! attached, so a successful submit implies at least one live consumer.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use relay_core::{EventSink, SinkAttributes, SinkError};

use crate::{EventEnvelope, DEFAULT_CHANNEL_CAPACITY};

/// In-memory broadcast event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. A subscriber that falls behind past the channel capacity
/// loses its oldest envelopes (broadcast lag), so consumers that need
/// strict at-least-once delivery should use [`crate::QueueSink`] instead.
pub struct BroadcastBus {
    sender: broadcast::Sender<EventEnvelope>,
    submitted: AtomicU64,
    capacity: usize,
}

impl BroadcastBus {
    /// Create a bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            submitted: AtomicU64::new(0),
            capacity,
        }
    }

    /// Attach a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Number of attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total envelopes accepted by the bus.
    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// The channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for BroadcastBus {
    async fn submit(&self, payload: Vec<u8>, attributes: SinkAttributes) -> Result<(), SinkError> {
        let envelope = EventEnvelope::new(payload, attributes);
        let detail_type = envelope.detail_type.clone();

        match self.sender.send(envelope) {
            Ok(receivers) => {
                self.submitted.fetch_add(1, Ordering::Relaxed);
                debug!(
                    detail_type = detail_type.as_deref().unwrap_or("unknown"),
                    receivers, "Envelope broadcast"
                );
                Ok(())
            }
            // send only fails when every receiver has been dropped; the
            // event would vanish, which must not look like success.
            Err(_) => Err(SinkError::Unavailable("no subscribers attached".into())),
        }
    }
}
