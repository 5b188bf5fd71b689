//! Port for structured transcript persistence.
//!
//! Defines the [`TranscriptSink`] trait for recording session events
//! (session open/close, every appended message, exclusions) to a structured
//! log. This is separate from `tracing`-based operation logs: tracing
//! handles human-readable diagnostics, while this port captures the
//! machine-readable transcript stream (e.g. JSONL).

use circle_domain::{CircleId, EntityId, Message, TerminationReason};
use serde::Serialize;

/// A structured session event for persistence.
///
/// Serializes with a `type` tag so each event is self-describing on the
/// wire.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    SessionStarted {
        circle_id: CircleId,
        topic: String,
        participants: Vec<EntityId>,
        policy: String,
    },
    MessageAppended {
        message: Message,
    },
    EntityDegraded {
        circle_id: CircleId,
        entity: EntityId,
        reason: String,
    },
    SessionEnded {
        circle_id: CircleId,
        reason: TerminationReason,
        rounds_completed: usize,
        messages: usize,
    },
}

/// Port for recording transcript events.
///
/// `record` is intentionally synchronous and non-fallible so persistence
/// problems never disturb a running session — implementations swallow and
/// log their own errors.
pub trait TranscriptSink: Send + Sync {
    fn record(&self, event: TranscriptEvent);
}

/// No-op implementation for tests and when persistence is disabled.
pub struct NoTranscriptSink;

impl TranscriptSink for NoTranscriptSink {
    fn record(&self, _event: TranscriptEvent) {}
}
