//! Participant entities and their capabilities

pub mod capability;
pub mod entities;
pub mod roster;

pub use capability::EntityCapability;
pub use entities::{AdapterRef, Entity, EntityStatus};
pub use roster::{Participant, Roster};
