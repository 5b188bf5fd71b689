//! Session state machine
//!
//! One [`CircleSession`] drives one dialogue end to end:
//!
//! ```text
//! AWAITING_TURN -> DISPATCHING -> COLLECTING -> EVALUATING -+-> AWAITING_TURN
//!                                                           `-> TERMINATED
//! ```
//!
//! Rounds are strictly sequential; within a round the chosen speakers run
//! in parallel on a `JoinSet` and their results are appended in arrival
//! order. The session object is created per request and never shared, so it
//! needs no locking beyond the context and registry contracts it uses.

use crate::config::DispatchParams;
use crate::ports::adapter::{EntityAdapter, PromptContext, TurnCall, TurnPurpose};
use crate::ports::progress::CircleProgress;
use crate::ports::transcript_sink::{TranscriptEvent, TranscriptSink};
use crate::use_cases::run_circle::dispatch::{TurnOutcome, TurnResult, dispatch_turn};
use circle_domain::{
    CircleContext, CircleId, CircleRequest, CircleResponse, ControlDirective, DraftMessage,
    EntityCapability, EntityId, MessageBody, Roster, SessionLease, TerminationReason, Transcript,
    TurnDecision, TurnPolicy,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

enum SessionState {
    AwaitingTurn,
    Dispatching(Vec<EntityId>),
    Collecting(JoinSet<TurnResult>),
    Evaluating,
    Terminated(TerminationReason),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::AwaitingTurn => "AWAITING_TURN",
            SessionState::Dispatching(_) => "DISPATCHING",
            SessionState::Collecting(_) => "COLLECTING",
            SessionState::Evaluating => "EVALUATING",
            SessionState::Terminated(_) => "TERMINATED",
        }
    }
}

/// Session-local orchestrator for one circle
pub(crate) struct CircleSession<A: EntityAdapter + 'static> {
    circle_id: CircleId,
    request: CircleRequest,
    policy: TurnPolicy,
    roster: Roster,
    context: Arc<CircleContext>,
    transcript: Transcript,
    round: usize,
    adapter: Arc<A>,
    params: DispatchParams,
    cancel: CancellationToken,
    deadline: tokio::time::Instant,
    /// Pins the participants in the registry until the session is dropped
    _lease: SessionLease,
}

impl<A: EntityAdapter + 'static> CircleSession<A> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        circle_id: CircleId,
        request: CircleRequest,
        policy: TurnPolicy,
        roster: Roster,
        context: Arc<CircleContext>,
        adapter: Arc<A>,
        params: DispatchParams,
        cancel: CancellationToken,
        deadline: tokio::time::Instant,
        lease: SessionLease,
    ) -> Self {
        let transcript = Transcript::new(circle_id.clone());
        Self {
            circle_id,
            request,
            policy,
            roster,
            context,
            transcript,
            round: 0,
            adapter,
            params,
            cancel,
            deadline,
            _lease: lease,
        }
    }

    /// Drive the state machine to its terminal state and build the response.
    pub(crate) async fn run(
        mut self,
        progress: &dyn CircleProgress,
        sink: &dyn TranscriptSink,
    ) -> CircleResponse {
        let mut state = SessionState::AwaitingTurn;
        let reason = loop {
            state = match state {
                SessionState::AwaitingTurn => self.await_turn(),
                SessionState::Dispatching(speakers) => self.dispatch(speakers, progress),
                SessionState::Collecting(join_set) => {
                    self.collect(join_set, progress, sink).await
                }
                SessionState::Evaluating => self.evaluate(progress),
                SessionState::Terminated(reason) => break reason,
            };
            debug!(circle = %self.circle_id, state = state.name(), "state transition");
        };

        let summary = if self.request.want_summary && reason.is_orderly() {
            self.summary_turn(progress, sink).await
        } else {
            None
        };

        info!(
            circle = %self.circle_id,
            reason = %reason,
            rounds = self.round,
            messages = self.transcript.len(),
            "circle terminated"
        );
        progress.on_session_end(&reason, self.transcript.len());
        sink.record(TranscriptEvent::SessionEnded {
            circle_id: self.circle_id.clone(),
            reason,
            rounds_completed: self.round,
            messages: self.transcript.len(),
        });

        CircleResponse {
            circle_id: self.circle_id,
            transcript: self.transcript.into_messages(),
            reason,
            rounds_completed: self.round,
            summary,
        }
    }

    /// AWAITING_TURN: consult the policy, or stop at the session boundary.
    fn await_turn(&self) -> SessionState {
        if self.cancel.is_cancelled() {
            return SessionState::Terminated(TerminationReason::Cancelled);
        }
        if tokio::time::Instant::now() >= self.deadline {
            return SessionState::Terminated(TerminationReason::Timeout);
        }
        match self
            .policy
            .decide(self.transcript.messages(), &self.roster, self.round)
        {
            TurnDecision::Terminate(reason) => SessionState::Terminated(reason),
            TurnDecision::Speakers(speakers) => {
                let speakers = speakers
                    .into_iter()
                    .filter(|id| self.roster.is_active(id))
                    .collect();
                SessionState::Dispatching(speakers)
            }
        }
    }

    /// DISPATCHING: fan the round's speakers out onto a `JoinSet`.
    fn dispatch(&self, speakers: Vec<EntityId>, progress: &dyn CircleProgress) -> SessionState {
        debug!(round = self.round, speakers = speakers.len(), "dispatching round");
        progress.on_round_start(self.round, speakers.len());

        // Everyone in the round sees the same transcript snapshot
        let history = Arc::new(self.transcript.messages().to_vec());
        let mut join_set = JoinSet::new();
        for id in speakers {
            let Some(participant) = self.roster.get(&id) else {
                continue;
            };
            let call = TurnCall {
                entity: participant.entity().clone(),
                prompt: PromptContext {
                    circle_id: self.circle_id.clone(),
                    topic: self.request.topic.clone(),
                    round: self.round,
                    purpose: TurnPurpose::Dialogue,
                    history: Arc::clone(&history),
                    context: Arc::clone(&self.context),
                },
                deadline: tokio::time::Instant::now() + self.request.per_turn_timeout,
            };
            join_set.spawn(dispatch_turn(
                Arc::clone(&self.adapter),
                call,
                self.request.per_turn_timeout,
                self.request.max_invoke_retries,
                self.params.clone(),
            ));
        }
        SessionState::Collecting(join_set)
    }

    /// COLLECTING: append results in arrival order, racing the cancel
    /// signal and the session deadline. Aborting the set drops all
    /// in-flight invocations, so a cancelled round contributes exactly the
    /// messages appended before the signal.
    async fn collect(
        &mut self,
        mut join_set: JoinSet<TurnResult>,
        progress: &dyn CircleProgress,
        sink: &dyn TranscriptSink,
    ) -> SessionState {
        let cancel = self.cancel.clone();
        let deadline = self.deadline;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(circle = %self.circle_id, "cancel signal received, aborting round");
                    join_set.abort_all();
                    return SessionState::Terminated(TerminationReason::Cancelled);
                }
                _ = tokio::time::sleep_until(deadline) => {
                    warn!(circle = %self.circle_id, "session deadline exceeded, aborting round");
                    join_set.abort_all();
                    return SessionState::Terminated(TerminationReason::Timeout);
                }
                joined = join_set.join_next() => match joined {
                    None => return SessionState::Evaluating,
                    Some(Ok(result)) => self.absorb(result, progress, sink),
                    Some(Err(e)) => warn!("Turn task join error: {}", e),
                }
            }
        }
    }

    /// Fold one turn result into transcript and roster.
    fn absorb(
        &mut self,
        result: TurnResult,
        progress: &dyn CircleProgress,
        sink: &dyn TranscriptSink,
    ) {
        match result.outcome {
            TurnOutcome::Spoke(draft) => {
                self.append(draft, progress, sink);
            }
            TurnOutcome::Silent => {
                self.append(DraftMessage::silence(result.entity), progress, sink);
            }
            TurnOutcome::Failed(e) => {
                warn!(
                    "Entity {} degraded after exhausted retries: {}",
                    result.entity, e
                );
                self.roster.mark_degraded(&result.entity);
                progress.on_entity_degraded(&result.entity);
                sink.record(TranscriptEvent::EntityDegraded {
                    circle_id: self.circle_id.clone(),
                    entity: result.entity.clone(),
                    reason: e.to_string(),
                });
                let body = MessageBody::control(ControlDirective::ExcludeEntity {
                    entity: result.entity,
                    reason: e.to_string(),
                })
                .expect("exclusion directive is always constructible");
                self.append(DraftMessage::new(EntityId::orchestrator(), body), progress, sink);
            }
        }
    }

    /// EVALUATING: close the round, then check turn cap and quorum.
    fn evaluate(&mut self, progress: &dyn CircleProgress) -> SessionState {
        self.round += 1;
        let round = self.round;
        if let Err(e) = self.context.update(
            "circle.round",
            &EntityId::orchestrator(),
            self.params.context_write_attempts,
            |_| serde_json::json!(round),
        ) {
            warn!("Round counter write failed: {}", e);
        }
        progress.on_round_complete(self.round);

        if self.round >= self.request.max_turns {
            return SessionState::Terminated(TerminationReason::MaxTurnsReached);
        }
        if self.roster.active_count() < self.request.min_quorum {
            return SessionState::Terminated(TerminationReason::QuorumLost);
        }
        SessionState::AwaitingTurn
    }

    /// Closing summarization turn: just another dispatched turn, against
    /// the first active summarizer. A failed or silent summary degrades to
    /// `None`, never to an error.
    async fn summary_turn(
        &mut self,
        progress: &dyn CircleProgress,
        sink: &dyn TranscriptSink,
    ) -> Option<String> {
        let entity = match self.roster.first_active_with(EntityCapability::Summarize) {
            Some(participant) => participant.entity().clone(),
            None => {
                debug!(circle = %self.circle_id, "no active summarizer, skipping summary");
                return None;
            }
        };

        let call = TurnCall {
            entity,
            prompt: PromptContext {
                circle_id: self.circle_id.clone(),
                topic: self.request.topic.clone(),
                round: self.round,
                purpose: TurnPurpose::Summary,
                history: Arc::new(self.transcript.messages().to_vec()),
                context: Arc::clone(&self.context),
            },
            deadline: tokio::time::Instant::now() + self.request.per_turn_timeout,
        };
        let result = dispatch_turn(
            Arc::clone(&self.adapter),
            call,
            self.request.per_turn_timeout,
            self.request.max_invoke_retries,
            self.params.clone(),
        )
        .await;

        match result.outcome {
            TurnOutcome::Spoke(draft) => {
                let summary = draft.body.content().map(str::to_string);
                self.append(draft, progress, sink);
                summary
            }
            TurnOutcome::Silent => {
                warn!("Summary turn timed out");
                None
            }
            TurnOutcome::Failed(e) => {
                warn!("Summary turn failed: {}", e);
                None
            }
        }
    }

    /// The single append point: seals the draft, assigns its sequence id,
    /// and notifies the collaborators.
    fn append(
        &mut self,
        draft: DraftMessage,
        progress: &dyn CircleProgress,
        sink: &dyn TranscriptSink,
    ) {
        let message = self.transcript.append(draft).clone();
        progress.on_turn_complete(self.round, &message.sender, message.kind());
        sink.record(TranscriptEvent::MessageAppended { message });
    }
}
