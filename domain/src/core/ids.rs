//! Identifier value objects
//!
//! Newtypes for the three identifier spaces of the protocol: circles,
//! entities, and messages. Keeping them distinct prevents mixing a sender
//! id with a session id at compile time.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Reserved entity id for protocol-generated messages (exclusion notices).
const ORCHESTRATOR_ID: &str = "__circle__";

/// Identifier of a participant (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new entity id
    ///
    /// # Panics
    /// Panics if the id is empty or only whitespace
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(!id.trim().is_empty(), "EntityId cannot be empty");
        Self(id)
    }

    /// Try to create an entity id, returning None if invalid
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() { None } else { Some(Self(id)) }
    }

    /// The reserved sender id for messages authored by the orchestrator
    /// itself (e.g. `control` exclusion notices).
    pub fn orchestrator() -> Self {
        Self(ORCHESTRATOR_ID.to_string())
    }

    /// Whether this is the reserved orchestrator id
    pub fn is_orchestrator(&self) -> bool {
        self.0 == ORCHESTRATOR_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::new(s)
    }
}

/// Identifier of one dialogue session (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircleId(String);

impl CircleId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(!id.trim().is_empty(), "CircleId cannot be empty");
        Self(id)
    }

    /// Generate a fresh circle id from wall clock + process-local counter.
    ///
    /// Unique within a process and readable in logs; global uniqueness is
    /// not a protocol requirement.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self(format!("circle-{millis:x}-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CircleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence number of a message within one circle (Value Object)
///
/// Assigned only at transcript append, strictly increasing per circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
