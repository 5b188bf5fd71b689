//! Circle response
//!
//! The envelope every caller receives once a session exists, whatever the
//! outcome. The transcript carries exactly the messages that were durably
//! appended — completed turns are never silently dropped.

use crate::core::ids::CircleId;
use crate::message::entities::Message;
use serde::{Deserialize, Serialize};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The policy decided the dialogue is done
    PolicyComplete,
    /// The round cap was reached
    MaxTurnsReached,
    /// The session deadline expired
    Timeout,
    /// An external cancel signal arrived
    Cancelled,
    /// Active entities fell below the quorum
    QuorumLost,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::PolicyComplete => "policy_complete",
            TerminationReason::MaxTurnsReached => "max_turns_reached",
            TerminationReason::Timeout => "timeout",
            TerminationReason::Cancelled => "cancelled",
            TerminationReason::QuorumLost => "quorum_lost",
        }
    }

    /// Whether the session ran to a normal end (eligible for a summary turn)
    pub fn is_orderly(&self) -> bool {
        matches!(
            self,
            TerminationReason::PolicyComplete
                | TerminationReason::MaxTurnsReached
                | TerminationReason::QuorumLost
        )
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one dialogue session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleResponse {
    pub circle_id: CircleId,
    /// Messages in sequence order
    pub transcript: Vec<Message>,
    pub reason: TerminationReason,
    pub rounds_completed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
