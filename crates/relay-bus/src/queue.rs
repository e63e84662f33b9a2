//! # Queue Sink
//!
//! Point-to-point sink over a bounded `tokio::sync::mpsc` channel. One
//! consumer drains the queue; a full or closed queue fails the submission
//! immediately rather than blocking, keeping delivery bounded in time.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use relay_core::{EventSink, SinkAttributes, SinkError};

use crate::{EventEnvelope, DEFAULT_CHANNEL_CAPACITY};

/// Bounded in-memory queue sink.
pub struct QueueSink {
    sender: mpsc::Sender<EventEnvelope>,
}

impl QueueSink {
    /// Create a queue with default capacity, returning the sink and the
    /// consumer half.
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<EventEnvelope>) {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a queue with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<EventEnvelope>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventSink for QueueSink {
    async fn submit(&self, payload: Vec<u8>, attributes: SinkAttributes) -> Result<(), SinkError> {
        let envelope = EventEnvelope::new(payload, attributes);
        let detail_type = envelope.detail_type.clone();

        match self.sender.try_send(envelope) {
            Ok(()) => {
                debug!(
                    detail_type = detail_type.as_deref().unwrap_or("unknown"),
                    "Envelope enqueued"
                );
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(SinkError::Rejected {
                reason: "queue full".into(),
            }),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(SinkError::Unavailable("queue consumer gone".into()))
            }
        }
    }
}
