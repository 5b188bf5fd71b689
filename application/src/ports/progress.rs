//! Progress notification port
//!
//! Defines the interface for reporting session progress. Implementations
//! live in the presentation layer and can display progress in various ways
//! (console, progress bars, etc.)

use circle_domain::{CircleId, EntityId, MessageKind, TerminationReason};

/// Callback for progress updates while a circle runs
pub trait CircleProgress: Send + Sync {
    /// Called once the session is initialized
    fn on_session_start(&self, circle_id: &CircleId, participants: usize);

    /// Called when a round's speakers have been chosen
    fn on_round_start(&self, round: usize, speakers: usize);

    /// Called for each message appended to the transcript
    fn on_turn_complete(&self, round: usize, entity: &EntityId, kind: MessageKind);

    /// Called when a round's messages have all been collected
    fn on_round_complete(&self, round: usize);

    /// Called when an entity is excluded from future rounds
    fn on_entity_degraded(&self, _entity: &EntityId) {}

    /// Called once the session reaches its terminal state
    fn on_session_end(&self, reason: &TerminationReason, messages: usize);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl CircleProgress for NoProgress {
    fn on_session_start(&self, _circle_id: &CircleId, _participants: usize) {}
    fn on_round_start(&self, _round: usize, _speakers: usize) {}
    fn on_turn_complete(&self, _round: usize, _entity: &EntityId, _kind: MessageKind) {}
    fn on_round_complete(&self, _round: usize) {}
    fn on_session_end(&self, _reason: &TerminationReason, _messages: usize) {}
}
