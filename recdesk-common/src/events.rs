//! Ingest lifecycle events and the broadcast event bus
//!
//! Services emit events as they process recordings; subscribers (ledger
//! writers, progress UIs, tests) receive them over a tokio broadcast
//! channel. Emission never blocks processing: a bus with no subscribers
//! drops the event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted while processing one recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IngestEvent {
    /// A recording notification entered the pipeline
    RecordingReceived {
        recording_id: Uuid,
        topic: String,
        timestamp: DateTime<Utc>,
    },
    /// An evidence source was absent or unreadable; processing continues
    EvidenceUnavailable {
        recording_id: Uuid,
        source: String,
        reason: String,
    },
    /// Final confidence fell below the manual-review gate
    ReviewFlagged {
        recording_id: Uuid,
        coach_confidence: f32,
        student_confidence: f32,
    },
    /// Canonical filenames were derived for the recording's media files
    FilesNamed {
        recording_id: Uuid,
        filenames: Vec<String>,
    },
}

/// Broadcast bus for ingest events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IngestEvent>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// Old events are dropped once the buffer fills; subscribers that lag
    /// observe a `Lagged` error rather than stalling emitters.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<IngestEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the no-subscriber case.
    pub fn emit_lossy(&self, event: IngestEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event dropped: no subscribers");
        }
    }

    /// Current subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit_lossy(IngestEvent::RecordingReceived {
            recording_id: Uuid::new_v4(),
            topic: "Jenny_John_Smith_Week_1".to_string(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, IngestEvent::RecordingReceived { .. }));
    }

    #[test]
    fn emit_without_subscribers_is_lossy() {
        let bus = EventBus::new(4);
        // Must not panic or error
        bus.emit_lossy(IngestEvent::FilesNamed {
            recording_id: Uuid::new_v4(),
            filenames: vec![],
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
