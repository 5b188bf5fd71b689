//! Entity adapter port
//!
//! The orchestrator's only boundary with the providers behind the
//! participants. An adapter translates one [`TurnCall`] into whatever its
//! provider needs (LLM API, scripted test double, human bridge) and returns
//! a draft message. The orchestrator treats the call as opaque and
//! cancellable: it bounds every invocation with the per-turn deadline and
//! may drop the future at any await point.

use async_trait::async_trait;
use circle_domain::{CircleContext, CircleId, DraftMessage, Message};
use std::sync::Arc;
use thiserror::Error;

/// Errors an adapter invocation can surface
///
/// Any of these triggers the bounded retry loop; exhausted retries degrade
/// the entity rather than aborting the session.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("adapter unavailable: {0}")]
    Unavailable(String),

    #[error("invocation failed: {0}")]
    InvocationFailed(String),

    #[error("no adapter bound for ref: {0}")]
    NoRoute(String),
}

/// Why the entity is being asked to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPurpose {
    /// A regular turn within a round
    Dialogue,
    /// The closing summarization turn
    Summary,
}

/// Everything an adapter may read when producing a turn
#[derive(Clone)]
pub struct PromptContext {
    pub circle_id: CircleId,
    pub topic: String,
    pub round: usize,
    pub purpose: TurnPurpose,
    /// Transcript snapshot at dispatch time, shared across the round
    pub history: Arc<Vec<Message>>,
    /// Shared session context; writes go through optimistic versioning
    pub context: Arc<CircleContext>,
}

/// One bounded invocation of an entity's adapter
#[derive(Clone)]
pub struct TurnCall {
    pub entity: circle_domain::Entity,
    pub prompt: PromptContext,
    /// Absolute deadline for this attempt
    pub deadline: tokio::time::Instant,
}

/// Port translating protocol turns into provider calls
///
/// Implementations must be cancellation-safe: the orchestrator drops the
/// returned future on timeout, session deadline, or external cancel.
#[async_trait]
pub trait EntityAdapter: Send + Sync {
    async fn invoke(&self, call: TurnCall) -> Result<DraftMessage, AdapterError>;
}
