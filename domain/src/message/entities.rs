//! Message entities
//!
//! A [`DraftMessage`] is what an adapter produces: sender, payload, and an
//! optional reply reference, but no sequence id yet. Sealing a draft into a
//! [`Message`] happens at transcript append and is what assigns the id and
//! timestamp — this keeps inter-round ordering deterministic while intra-round
//! ordering reflects arrival time.

use crate::core::ids::{CircleId, EntityId, MessageId};
use crate::message::body::{MessageBody, MessageKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// An utterance produced by an adapter, not yet appended to a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMessage {
    pub sender: EntityId,
    pub body: MessageBody,
    pub in_reply_to: Option<MessageId>,
}

impl DraftMessage {
    pub fn new(sender: EntityId, body: MessageBody) -> Self {
        Self {
            sender,
            body,
            in_reply_to: None,
        }
    }

    pub fn in_reply_to(mut self, id: MessageId) -> Self {
        self.in_reply_to = Some(id);
        self
    }

    /// The implicit message recorded when an entity stays silent past its
    /// per-turn deadline.
    pub fn silence(sender: EntityId) -> Self {
        Self::new(sender, MessageBody::silence())
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }
}

/// One sealed utterance in a circle's transcript (Entity)
///
/// Immutable once appended. The id is strictly increasing within a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub circle_id: CircleId,
    pub sender: EntityId,
    pub body: MessageBody,
    /// Milliseconds since the Unix epoch, taken at append time
    pub created_at: u64,
    pub in_reply_to: Option<MessageId>,
}

impl Message {
    /// Seal a draft with its assigned sequence id
    pub(crate) fn seal(draft: DraftMessage, id: MessageId, circle_id: CircleId) -> Self {
        Self {
            id,
            circle_id,
            sender: draft.sender,
            body: draft.body,
            created_at: now_ms(),
            in_reply_to: draft.in_reply_to,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    /// Free-form text content, if this kind carries any
    pub fn content(&self) -> Option<&str> {
        self.body.content()
    }
}
