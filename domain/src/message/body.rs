//! Message payload types
//!
//! The payload of a message is a tagged enum, so type-specific required
//! fields are enforced at construction: a `vote` always carries its verdict,
//! `silence` and `control` carry no free-form content.

use crate::core::ids::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing an invalid message payload
#[derive(Error, Debug, PartialEq)]
pub enum MessageError {
    #[error("{kind} message requires non-empty content")]
    EmptyContent { kind: MessageKind },

    #[error("control directive names no speakers")]
    NoSpeakersNamed,
}

/// Discriminant of a message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Proposal,
    Response,
    Vote,
    Observation,
    Silence,
    Control,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Proposal => "proposal",
            MessageKind::Response => "response",
            MessageKind::Vote => "vote",
            MessageKind::Observation => "observation",
            MessageKind::Silence => "silence",
            MessageKind::Control => "control",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Steering instruction carried by a `control` message
///
/// Emitted either by a moderator entity (naming speakers, concluding) or by
/// the orchestrator itself (excluding a degraded entity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlDirective {
    /// Name the entities that should speak next round
    NameSpeakers { speakers: Vec<EntityId> },
    /// End the dialogue
    Conclude,
    /// Record that an entity was excluded from further rounds
    ExcludeEntity { entity: EntityId, reason: String },
}

/// Payload of one message (tagged by kind)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Proposal { content: String },
    Response { content: String },
    Vote { approve: bool, rationale: String },
    Observation { content: String },
    Silence,
    Control { directive: ControlDirective },
}

impl MessageBody {
    /// Create a proposal payload
    pub fn proposal(content: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_content(MessageKind::Proposal, content.into())
    }

    /// Create a response payload
    pub fn response(content: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_content(MessageKind::Response, content.into())
    }

    /// Create an observation payload
    pub fn observation(content: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_content(MessageKind::Observation, content.into())
    }

    /// Create a vote payload
    ///
    /// The rationale may be empty; the verdict is the required field.
    pub fn vote(approve: bool, rationale: impl Into<String>) -> Self {
        MessageBody::Vote {
            approve,
            rationale: rationale.into(),
        }
    }

    /// Create a silence payload
    pub fn silence() -> Self {
        MessageBody::Silence
    }

    /// Create a control payload
    pub fn control(directive: ControlDirective) -> Result<Self, MessageError> {
        if let ControlDirective::NameSpeakers { speakers } = &directive
            && speakers.is_empty()
        {
            return Err(MessageError::NoSpeakersNamed);
        }
        Ok(MessageBody::Control { directive })
    }

    fn with_content(kind: MessageKind, content: String) -> Result<Self, MessageError> {
        if content.trim().is_empty() {
            return Err(MessageError::EmptyContent { kind });
        }
        Ok(match kind {
            MessageKind::Proposal => MessageBody::Proposal { content },
            MessageKind::Response => MessageBody::Response { content },
            MessageKind::Observation => MessageBody::Observation { content },
            _ => unreachable!("with_content is only used for content-bearing kinds"),
        })
    }

    /// Discriminant of this payload
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::Proposal { .. } => MessageKind::Proposal,
            MessageBody::Response { .. } => MessageKind::Response,
            MessageBody::Vote { .. } => MessageKind::Vote,
            MessageBody::Observation { .. } => MessageKind::Observation,
            MessageBody::Silence => MessageKind::Silence,
            MessageBody::Control { .. } => MessageKind::Control,
        }
    }

    /// Free-form text content, if this kind carries any
    pub fn content(&self) -> Option<&str> {
        match self {
            MessageBody::Proposal { content }
            | MessageBody::Response { content }
            | MessageBody::Observation { content } => Some(content),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_required_for_proposal() {
        assert_eq!(
            MessageBody::proposal("   "),
            Err(MessageError::EmptyContent {
                kind: MessageKind::Proposal
            })
        );
        assert!(MessageBody::proposal("let's begin").is_ok());
    }

    #[test]
    fn test_vote_carries_verdict() {
        let body = MessageBody::vote(true, "sound plan");
        assert_eq!(body.kind(), MessageKind::Vote);
        assert!(matches!(body, MessageBody::Vote { approve: true, .. }));
    }

    #[test]
    fn test_silence_carries_nothing() {
        let body = MessageBody::silence();
        assert_eq!(body.kind(), MessageKind::Silence);
        assert!(body.content().is_none());
    }

    #[test]
    fn test_name_speakers_rejects_empty_list() {
        let result = MessageBody::control(ControlDirective::NameSpeakers { speakers: vec![] });
        assert_eq!(result, Err(MessageError::NoSpeakersNamed));
    }

    #[test]
    fn test_body_serde_tagging() {
        let body = MessageBody::vote(false, "too risky");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "vote");
        assert_eq!(json["approve"], false);

        let back: MessageBody = serde_json::from_value(json).unwrap();
        assert_eq!(back, body);
    }
}
