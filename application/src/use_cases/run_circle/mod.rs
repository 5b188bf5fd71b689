//! Run Circle use case
//!
//! Orchestrates one full dialogue session: validation, participant
//! resolution, the round loop, and response assembly. Synchronous from the
//! caller's view, internally asynchronous.

mod dispatch;
mod session;


use crate::config::DispatchParams;
use crate::ports::adapter::EntityAdapter;
use crate::ports::progress::{CircleProgress, NoProgress};
use crate::ports::transcript_sink::{NoTranscriptSink, TranscriptEvent, TranscriptSink};
use crate::use_cases::run_circle::session::CircleSession;
use circle_domain::{
    AccessMode, CircleContext, CircleId, CircleRequest, CircleResponse, EntityId, EntityRegistry,
    RegistryError, ValidationError,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Errors surfaced before a session exists.
///
/// Once a session is created the caller always receives a
/// [`CircleResponse`], whatever happens inside.
#[derive(Error, Debug)]
pub enum RunCircleError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Use case for running one circle
pub struct RunCircleUseCase<A: EntityAdapter + 'static> {
    adapter: Arc<A>,
    registry: Arc<EntityRegistry>,
    params: DispatchParams,
    sink: Arc<dyn TranscriptSink>,
}

impl<A: EntityAdapter + 'static> RunCircleUseCase<A> {
    pub fn new(adapter: Arc<A>, registry: Arc<EntityRegistry>) -> Self {
        Self {
            adapter,
            registry,
            params: DispatchParams::default(),
            sink: Arc::new(NoTranscriptSink),
        }
    }

    pub fn with_params(mut self, params: DispatchParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn TranscriptSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Execute with default (no-op) progress and no external cancel signal
    pub async fn execute(&self, request: CircleRequest) -> Result<CircleResponse, RunCircleError> {
        self.execute_with(request, &NoProgress, CancellationToken::new())
            .await
    }

    /// Execute with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: CircleRequest,
        progress: &dyn CircleProgress,
    ) -> Result<CircleResponse, RunCircleError> {
        self.execute_with(request, progress, CancellationToken::new())
            .await
    }

    /// Execute with progress callbacks and an external cancel signal
    pub async fn execute_with(
        &self,
        request: CircleRequest,
        progress: &dyn CircleProgress,
        cancel: CancellationToken,
    ) -> Result<CircleResponse, RunCircleError> {
        // INITIALIZING: everything here fails fast, before any session
        // object exists
        request.validate()?;
        let (lease, roster) = self.registry.lease(&request.participants)?;
        let policy = request.policy.resolve(&roster)?;

        let circle_id = CircleId::generate();
        let context = Arc::new(CircleContext::new());
        context
            .define(
                "circle.topic",
                serde_json::json!(request.topic),
                EntityId::orchestrator(),
                AccessMode::OwnerOnly,
            )
            .expect("fresh context has no variables");
        context
            .define(
                "circle.round",
                serde_json::json!(0),
                EntityId::orchestrator(),
                AccessMode::OwnerOnly,
            )
            .expect("fresh context has no variables");

        info!(
            circle = %circle_id,
            participants = roster.len(),
            policy = %policy,
            "opening circle"
        );
        progress.on_session_start(&circle_id, roster.len());
        self.sink.record(TranscriptEvent::SessionStarted {
            circle_id: circle_id.clone(),
            topic: request.topic.clone(),
            participants: request.participants.clone(),
            policy: policy.name().to_string(),
        });

        let deadline = tokio::time::Instant::now() + request.session_timeout;
        let session = CircleSession::new(
            circle_id,
            request,
            policy,
            roster,
            context,
            Arc::clone(&self.adapter),
            self.params.clone(),
            cancel,
            deadline,
            lease,
        );
        Ok(session.run(progress, self.sink.as_ref()).await)
    }
}
