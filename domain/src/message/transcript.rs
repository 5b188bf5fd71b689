//! Append-only transcript of one circle
//!
//! The transcript is owned exclusively by the session driving the circle.
//! Appends are the single point where sequence ids are assigned, so ids are
//! strictly increasing and never reused even across rounds.

use crate::core::ids::{CircleId, MessageId};
use crate::message::entities::{DraftMessage, Message};
use serde::{Deserialize, Serialize};

/// Ordered sequence of sealed messages for one circle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    circle_id: CircleId,
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Transcript {
    pub fn new(circle_id: CircleId) -> Self {
        Self {
            circle_id,
            messages: Vec::new(),
            next_id: MessageId(1),
        }
    }

    pub fn circle_id(&self) -> &CircleId {
        &self.circle_id
    }

    /// Seal a draft and append it, returning the sealed message.
    ///
    /// This is the only way a message enters the transcript.
    pub fn append(&mut self, draft: DraftMessage) -> &Message {
        let id = self.next_id;
        self.next_id = self.next_id.next();
        let message = Message::seal(draft, id, self.circle_id.clone());
        self.messages.push(message);
        self.messages.last().expect("just pushed")
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Consume the transcript, yielding the sealed messages in order
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
