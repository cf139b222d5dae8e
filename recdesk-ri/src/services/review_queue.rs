//! Manual-review notifications
//!
//! Low-confidence records are flagged for a human, fire-and-forget: the
//! notification never blocks or fails recording processing.

use crate::types::FinalizedMetadataRecord;
use async_trait::async_trait;
use recdesk_common::events::{EventBus, IngestEvent};
use tracing::warn;
use uuid::Uuid;

/// Side-effecting review notification sink
#[async_trait]
pub trait ReviewQueue: Send + Sync {
    /// Flag a recording for manual review.
    async fn flag(&self, recording_id: Uuid, record: &FinalizedMetadataRecord);
}

/// Review queue that broadcasts over the ingest event bus (the ledger
/// writer subscribes and annotates its row).
pub struct EventBusReviewQueue {
    bus: EventBus,
}

impl EventBusReviewQueue {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ReviewQueue for EventBusReviewQueue {
    async fn flag(&self, recording_id: Uuid, record: &FinalizedMetadataRecord) {
        warn!(
            recording_id = %recording_id,
            coach_confidence = record.coach.confidence(),
            student_confidence = record.student.confidence(),
            "Recording flagged for manual review"
        );
        self.bus.emit_lossy(IngestEvent::ReviewFlagged {
            recording_id,
            coach_confidence: record.coach.confidence(),
            student_confidence: record.student.confidence(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractedField, SessionCategory};

    #[tokio::test]
    async fn flag_emits_review_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let queue = EventBusReviewQueue::new(bus);

        let record = FinalizedMetadataRecord {
            coach: ExtractedField::absent(),
            student: ExtractedField::absent(),
            week_number: ExtractedField::absent(),
            has_game_plan: false,
            category: SessionCategory::Normal,
            misc_context: None,
        };
        queue.flag(Uuid::new_v4(), &record).await;

        let event = rx.recv().await.unwrap();
        match event {
            IngestEvent::ReviewFlagged {
                coach_confidence, ..
            } => assert_eq!(coach_confidence, 0.0),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
