//! Transcript persistence implementations

mod jsonl;

pub use jsonl::JsonlTranscriptWriter;
