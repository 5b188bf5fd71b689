//! Domain layer for fire-circle
//!
//! This crate contains the core protocol types and pure decision logic.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Circle
//!
//! A Circle is one orchestrated multi-entity dialogue session: several
//! independently fallible participants take structured turns and produce
//! a deterministic, auditable transcript.
//!
//! - **Entity**: a participant, backed by an adapter outside this crate
//! - **Round**: one full pass of turn-taking, as decided by a policy
//! - **Quorum**: minimum count of active entities required to continue

pub mod circle;
pub mod context;
pub mod core;
pub mod entity;
pub mod message;
pub mod policy;
pub mod registry;

// Re-export commonly used types
pub use circle::{
    request::{CircleRequest, ValidationError},
    response::{CircleResponse, TerminationReason},
};
pub use context::{AccessMode, CircleContext, ContextError, ContextVariable};
pub use crate::core::ids::{CircleId, EntityId, MessageId};
pub use entity::{
    capability::EntityCapability,
    entities::{AdapterRef, Entity, EntityStatus},
    roster::{Participant, Roster},
};
pub use message::{
    body::{ControlDirective, MessageBody, MessageError, MessageKind},
    entities::{DraftMessage, Message},
    transcript::Transcript,
};
pub use policy::{PolicySpec, TurnDecision, TurnPolicy};
pub use registry::{EntityRegistry, RegistryError, RegistrySnapshot, SessionLease};
