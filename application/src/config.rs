//! Dispatch tuning parameters
//!
//! Knobs for the retry/backoff behavior of per-entity dispatch and for
//! context write retries. Separate from [`CircleRequest`] because these
//! tune the runtime, not the dialogue: a caller describes the session, the
//! host process decides how aggressively to retry.
//!
//! [`CircleRequest`]: circle_domain::CircleRequest

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime tuning for per-entity dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchParams {
    /// Initial backoff between invocation retries; doubles per attempt
    pub retry_backoff: Duration,
    /// Upper bound for the doubling backoff
    pub retry_backoff_cap: Duration,
    /// Bounded attempts for optimistic context writes
    pub context_write_attempts: usize,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_millis(250),
            retry_backoff_cap: Duration::from_secs(2),
            context_write_attempts: 3,
        }
    }
}

impl DispatchParams {
    /// Next backoff step: doubled, capped
    pub fn next_backoff(&self, current: Duration) -> Duration {
        (current * 2).min(self.retry_backoff_cap)
    }
}
