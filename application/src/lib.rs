//! Application layer for fire-circle
//!
//! This crate drives one dialogue session end to end: it owns the
//! orchestrator state machine and the ports through which adapters,
//! progress reporting, and transcript persistence plug in. Adapter
//! implementations live in the infrastructure layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DispatchParams;
pub use ports::adapter::{AdapterError, EntityAdapter, PromptContext, TurnCall, TurnPurpose};
pub use ports::progress::{CircleProgress, NoProgress};
pub use ports::transcript_sink::{NoTranscriptSink, TranscriptEvent, TranscriptSink};
pub use use_cases::run_circle::{RunCircleError, RunCircleUseCase};
