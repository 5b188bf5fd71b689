//! Circle request
//!
//! The validated input that opens one dialogue session. Validation runs
//! before any session object exists; a malformed request is rejected
//! outright and never retried.

use crate::core::ids::EntityId;
use crate::policy::spec::PolicySpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Reasons a request is rejected before a session is created
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("participant list is empty")]
    NoParticipants,

    #[error("participant listed twice: {0}")]
    DuplicateParticipant(EntityId),

    #[error("the reserved orchestrator id cannot participate")]
    ReservedParticipant,

    #[error("topic is empty")]
    EmptyTopic,

    #[error("max_turns must be positive")]
    ZeroMaxTurns,

    #[error("{0} must be positive")]
    ZeroTimeout(&'static str),

    #[error("min_quorum {min_quorum} unreachable with {participants} participants")]
    UnreachableQuorum {
        min_quorum: usize,
        participants: usize,
    },

    #[error("unknown policy: {0}")]
    UnknownPolicy(String),

    #[error("consensus policy requires a threshold")]
    MissingThreshold,

    #[error("consensus threshold must be in [0, 1), got {0}")]
    InvalidThreshold(f64),

    #[error("moderator_led policy requires a moderator")]
    MissingModerator,

    #[error("moderator is not a participant: {0}")]
    ModeratorNotAParticipant(EntityId),

    #[error("moderator lacks the moderate capability: {0}")]
    ModeratorCannotModerate(EntityId),
}

/// Input for one dialogue session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleRequest {
    /// Ordered set of participant ids; order fixes the round-robin order
    pub participants: Vec<EntityId>,
    pub policy: PolicySpec,
    /// Topic or seed content opening the dialogue
    pub topic: String,
    /// Hard cap on completed rounds
    pub max_turns: usize,
    /// Deadline for each individual adapter invocation
    pub per_turn_timeout: Duration,
    /// Deadline for the whole session
    pub session_timeout: Duration,
    /// Minimum active entities required to continue
    pub min_quorum: usize,
    /// Retries per invocation beyond the first attempt, before an entity
    /// is marked degraded
    pub max_invoke_retries: usize,
    /// Close the session with a summarization turn when it ends normally
    pub want_summary: bool,
}

impl CircleRequest {
    pub fn new(
        participants: impl IntoIterator<Item = EntityId>,
        policy: PolicySpec,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            participants: participants.into_iter().collect(),
            policy,
            topic: topic.into(),
            max_turns: 8,
            per_turn_timeout: Duration::from_secs(30),
            session_timeout: Duration::from_secs(300),
            min_quorum: 1,
            max_invoke_retries: 2,
            want_summary: false,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_per_turn_timeout(mut self, timeout: Duration) -> Self {
        self.per_turn_timeout = timeout;
        self
    }

    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn with_min_quorum(mut self, min_quorum: usize) -> Self {
        self.min_quorum = min_quorum;
        self
    }

    pub fn with_max_invoke_retries(mut self, retries: usize) -> Self {
        self.max_invoke_retries = retries;
        self
    }

    pub fn with_summary(mut self) -> Self {
        self.want_summary = true;
        self
    }

    /// Validate everything checkable without the registry.
    ///
    /// Policy parameters are checked here; resolution against the actual
    /// roster (moderator membership, capabilities) happens at session
    /// initialization via [`PolicySpec::resolve`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.participants.is_empty() {
            return Err(ValidationError::NoParticipants);
        }
        let mut seen = HashSet::new();
        for id in &self.participants {
            if id.is_orchestrator() {
                return Err(ValidationError::ReservedParticipant);
            }
            if !seen.insert(id) {
                return Err(ValidationError::DuplicateParticipant(id.clone()));
            }
        }
        if self.topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        if self.max_turns == 0 {
            return Err(ValidationError::ZeroMaxTurns);
        }
        if self.per_turn_timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout("per_turn_timeout"));
        }
        if self.session_timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout("session_timeout"));
        }
        if self.min_quorum == 0 || self.min_quorum > self.participants.len() {
            return Err(ValidationError::UnreachableQuorum {
                min_quorum: self.min_quorum,
                participants: self.participants.len(),
            });
        }
        match self.policy.name.as_str() {
            "round_robin" => {}
            "consensus" => {
                let threshold = self
                    .policy
                    .threshold
                    .ok_or(ValidationError::MissingThreshold)?;
                if !(0.0..1.0).contains(&threshold) {
                    return Err(ValidationError::InvalidThreshold(threshold));
                }
            }
            "moderator_led" => {
                let moderator = self
                    .policy
                    .moderator
                    .as_ref()
                    .ok_or(ValidationError::MissingModerator)?;
                if !self.participants.contains(moderator) {
                    return Err(ValidationError::ModeratorNotAParticipant(moderator.clone()));
                }
            }
            other => return Err(ValidationError::UnknownPolicy(other.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<EntityId> {
        names.iter().map(|n| EntityId::new(*n)).collect()
    }

    fn valid() -> CircleRequest {
        CircleRequest::new(
            ids(&["ember", "oak", "sage"]),
            PolicySpec::round_robin(),
            "how should we split the work",
        )
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_empty_participants_rejected() {
        let request = CircleRequest::new([], PolicySpec::round_robin(), "topic");
        assert_eq!(request.validate().unwrap_err(), ValidationError::NoParticipants);
    }

    #[test]
    fn test_duplicate_participant_rejected() {
        let request = CircleRequest::new(
            ids(&["ember", "ember"]),
            PolicySpec::round_robin(),
            "topic",
        );
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::DuplicateParticipant(EntityId::new("ember"))
        );
    }

    #[test]
    fn test_zero_max_turns_rejected() {
        let request = valid().with_max_turns(0);
        assert_eq!(request.validate().unwrap_err(), ValidationError::ZeroMaxTurns);
    }

    #[test]
    fn test_empty_topic_rejected() {
        let request = CircleRequest::new(ids(&["ember"]), PolicySpec::round_robin(), "  ");
        assert_eq!(request.validate().unwrap_err(), ValidationError::EmptyTopic);
    }

    #[test]
    fn test_unreachable_quorum_rejected() {
        let request = valid().with_min_quorum(4);
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::UnreachableQuorum {
                min_quorum: 4,
                participants: 3,
            }
        );
        let request = valid().with_min_quorum(0);
        assert!(matches!(
            request.validate().unwrap_err(),
            ValidationError::UnreachableQuorum { .. }
        ));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let mut request = valid();
        request.policy.name = "anarchy".to_string();
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::UnknownPolicy("anarchy".to_string())
        );
    }

    #[test]
    fn test_moderator_must_be_listed() {
        let mut request = valid();
        request.policy = PolicySpec::moderator_led(EntityId::new("ghost"));
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::ModeratorNotAParticipant(EntityId::new("ghost"))
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let request = valid().with_per_turn_timeout(Duration::ZERO);
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::ZeroTimeout("per_turn_timeout")
        );
    }
}
