//! Message protocol
//!
//! Immutable records describing one utterance in a circle, plus the
//! append-only transcript that sequences them.

pub mod body;
pub mod entities;
pub mod transcript;

pub use body::{ControlDirective, MessageBody, MessageError, MessageKind};
pub use entities::{DraftMessage, Message};
pub use transcript::Transcript;
