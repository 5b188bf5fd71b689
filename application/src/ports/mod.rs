//! Ports (interfaces) for external dependencies
//!
//! These traits define what the orchestrator consumes. Implementations
//! (adapters) live in the infrastructure and presentation layers.

pub mod adapter;
pub mod progress;
pub mod transcript_sink;
