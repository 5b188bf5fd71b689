//! Offline deterministic adapter
//!
//! Produces dialogue from the topic text alone, so a circle can run end to
//! end with no provider behind it. First speaker opens with a proposal,
//! voters vote, everyone else observes, and the closing turn summarizes the
//! transcript.

use async_trait::async_trait;
use circle_application::{AdapterError, EntityAdapter, TurnCall, TurnPurpose};
use circle_domain::{DraftMessage, EntityCapability, MessageBody, MessageKind};

#[derive(Default)]
pub struct LoopbackAdapter;

impl LoopbackAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EntityAdapter for LoopbackAdapter {
    async fn invoke(&self, call: TurnCall) -> Result<DraftMessage, AdapterError> {
        let entity = &call.entity;
        let prompt = &call.prompt;

        let body = if prompt.purpose == TurnPurpose::Summary {
            MessageBody::response(format!(
                "Circle on \"{}\" closed after {} messages across {} rounds.",
                prompt.topic,
                prompt.history.len(),
                prompt.round,
            ))
        } else if !prompt
            .history
            .iter()
            .any(|m| m.kind() == MessageKind::Proposal)
        {
            MessageBody::proposal(format!(
                "{} opens the circle: {}",
                entity.display_name(),
                prompt.topic,
            ))
        } else if entity.has_capability(EntityCapability::Vote) {
            Ok(MessageBody::vote(
                true,
                format!("{} supports the standing proposal", entity.display_name()),
            ))
        } else {
            MessageBody::observation(format!(
                "{} notes round {} with {} messages so far.",
                entity.display_name(),
                prompt.round,
                prompt.history.len(),
            ))
        }
        .map_err(|e| AdapterError::InvocationFailed(e.to_string()))?;

        Ok(DraftMessage::new(entity.id().clone(), body))
    }
}
