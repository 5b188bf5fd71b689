//! Per-entity turn dispatch
//!
//! One invocation of one entity's adapter, bounded by the per-turn timeout
//! and wrapped in the bounded retry loop. A timeout is not an error: the
//! entity is recorded as silent for the turn. An error is retried with
//! doubling backoff until the retry budget is spent, at which point the
//! failure is surfaced so the session can degrade the entity.

use crate::config::DispatchParams;
use crate::ports::adapter::{AdapterError, EntityAdapter, TurnCall};
use circle_domain::{DraftMessage, EntityId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What one dispatched turn produced
pub(crate) enum TurnOutcome {
    /// The adapter returned a draft within the deadline
    Spoke(DraftMessage),
    /// The per-turn deadline passed; recorded as implicit silence
    Silent,
    /// Retries exhausted; the entity should be degraded
    Failed(AdapterError),
}

pub(crate) struct TurnResult {
    pub entity: EntityId,
    pub outcome: TurnOutcome,
}

pub(crate) async fn dispatch_turn<A: EntityAdapter + ?Sized>(
    adapter: Arc<A>,
    mut call: TurnCall,
    per_turn_timeout: Duration,
    max_retries: usize,
    params: DispatchParams,
) -> TurnResult {
    let entity = call.entity.id().clone();
    let mut backoff = params.retry_backoff;

    for attempt in 0..=max_retries {
        // Each attempt gets a fresh deadline
        call.deadline = tokio::time::Instant::now() + per_turn_timeout;

        match tokio::time::timeout(per_turn_timeout, adapter.invoke(call.clone())).await {
            Ok(Ok(draft)) => {
                return TurnResult {
                    entity,
                    outcome: TurnOutcome::Spoke(draft),
                };
            }
            Ok(Err(e)) => {
                if attempt == max_retries {
                    return TurnResult {
                        entity,
                        outcome: TurnOutcome::Failed(e),
                    };
                }
                warn!(
                    "Entity {} invocation attempt {} failed, retrying: {}",
                    entity,
                    attempt + 1,
                    e
                );
                tokio::time::sleep(backoff).await;
                backoff = params.next_backoff(backoff);
            }
            Err(_) => {
                debug!("Entity {} silent past per-turn deadline", entity);
                return TurnResult {
                    entity,
                    outcome: TurnOutcome::Silent,
                };
            }
        }
    }

    unreachable!("retry loop returns on its final attempt")
}
