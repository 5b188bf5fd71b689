//! Scripted adapter
//!
//! Plays back a fixed per-entity script, one step per turn, repeating the
//! final step once the script runs out. Used by demos and tests that need
//! exact control over what each participant does, including misbehavior
//! (delays, failures, hanging past the deadline).

use async_trait::async_trait;
use circle_application::{AdapterError, EntityAdapter, TurnCall};
use circle_domain::{ControlDirective, DraftMessage, EntityId, MessageBody};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted turn
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Respond with the given text
    Say(String),
    /// Open with a proposal
    Propose(String),
    /// Cast a vote
    Vote { approve: bool, rationale: String },
    /// Emit a steering directive
    Control(ControlDirective),
    /// Wait, then perform the wrapped step
    Delay(Duration, Box<ScriptStep>),
    /// Fail the invocation (exercises the retry path)
    Fail(String),
    /// Never return (exercises the per-turn timeout path)
    Hang,
}

impl ScriptStep {
    pub fn say(text: impl Into<String>) -> Self {
        ScriptStep::Say(text.into())
    }

    pub fn propose(text: impl Into<String>) -> Self {
        ScriptStep::Propose(text.into())
    }

    pub fn vote(approve: bool, rationale: impl Into<String>) -> Self {
        ScriptStep::Vote {
            approve,
            rationale: rationale.into(),
        }
    }

    pub fn after(delay: Duration, step: ScriptStep) -> Self {
        ScriptStep::Delay(delay, Box::new(step))
    }
}

#[derive(Default)]
pub struct ScriptedAdapter {
    scripts: Mutex<HashMap<EntityId, VecDeque<ScriptStep>>>,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a script to an entity, replacing any previous one
    pub fn script(self, id: impl Into<String>, steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(EntityId::new(id), steps.into_iter().collect());
        }
        self
    }

    /// Pop the entity's next step; the final step repeats forever
    fn next_step(&self, id: &EntityId) -> Result<ScriptStep, AdapterError> {
        let mut scripts = self
            .scripts
            .lock()
            .map_err(|_| AdapterError::Unavailable("script table poisoned".to_string()))?;
        let queue = scripts
            .get_mut(id)
            .ok_or_else(|| AdapterError::Unavailable(format!("no script for {id}")))?;
        if queue.len() > 1 {
            queue
                .pop_front()
                .ok_or_else(|| AdapterError::Unavailable(format!("script exhausted for {id}")))
        } else {
            queue
                .front()
                .cloned()
                .ok_or_else(|| AdapterError::Unavailable(format!("empty script for {id}")))
        }
    }
}

#[async_trait]
impl EntityAdapter for ScriptedAdapter {
    async fn invoke(&self, call: TurnCall) -> Result<DraftMessage, AdapterError> {
        let id = call.entity.id().clone();
        let mut step = self.next_step(&id)?;

        loop {
            let body = match step {
                ScriptStep::Delay(delay, then) => {
                    tokio::time::sleep(delay).await;
                    step = *then;
                    continue;
                }
                ScriptStep::Say(text) => MessageBody::response(text),
                ScriptStep::Propose(text) => MessageBody::proposal(text),
                ScriptStep::Vote { approve, rationale } => {
                    Ok(MessageBody::vote(approve, rationale))
                }
                ScriptStep::Control(directive) => MessageBody::control(directive),
                ScriptStep::Fail(reason) => return Err(AdapterError::InvocationFailed(reason)),
                ScriptStep::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!("pending future never resolves")
                }
            }
            .map_err(|e| AdapterError::InvocationFailed(e.to_string()))?;
            return Ok(DraftMessage::new(id, body));
        }
    }
}
