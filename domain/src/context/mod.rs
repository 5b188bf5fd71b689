//! Session context store
//!
//! Shared, versioned key/value state scoped to one circle. Writers within a
//! round run concurrently, so writes are guarded by optimistic versioning:
//! a `set` carries the version the writer last read, and a stale version
//! fails with [`ContextError::VersionConflict`] instead of blocking.
//!
//! The interior lock is held only for the duration of one read or one
//! compare-and-set, never across an await point.

use crate::core::ids::EntityId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors raised by context operations
#[derive(Error, Debug, PartialEq)]
pub enum ContextError {
    #[error("context variable not found: {0}")]
    NotFound(String),

    #[error("context variable already defined: {0}")]
    AlreadyDefined(String),

    #[error("stale write to {name}: expected version {expected}, current {current}")]
    VersionConflict {
        name: String,
        expected: u64,
        current: u64,
    },

    #[error("{writer} may not write {name} (owned by {owner})")]
    AccessDenied {
        name: String,
        writer: EntityId,
        owner: EntityId,
    },
}

/// Who may write a context variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Only the owning entity may write
    #[default]
    OwnerOnly,
    /// Any entity may write (versioning still applies)
    Shared,
}

/// One versioned variable
#[derive(Debug, Clone)]
pub struct ContextVariable {
    pub value: Value,
    pub owner: EntityId,
    pub version: u64,
    pub access: AccessMode,
}

/// Versioned key/value state of one circle
///
/// Destroyed with the session unless a collaborator persists it.
#[derive(Debug, Default)]
pub struct CircleContext {
    vars: RwLock<HashMap<String, ContextVariable>>,
}

impl CircleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new variable at version 1.
    pub fn define(
        &self,
        name: impl Into<String>,
        value: Value,
        owner: EntityId,
        access: AccessMode,
    ) -> Result<(), ContextError> {
        let name = name.into();
        let mut vars = self.vars.write().expect("context lock poisoned");
        if vars.contains_key(&name) {
            return Err(ContextError::AlreadyDefined(name));
        }
        vars.insert(
            name,
            ContextVariable {
                value,
                owner,
                version: 1,
                access,
            },
        );
        Ok(())
    }

    /// Current value and version of a variable.
    pub fn get(&self, name: &str) -> Result<(Value, u64), ContextError> {
        let vars = self.vars.read().expect("context lock poisoned");
        vars.get(name)
            .map(|v| (v.value.clone(), v.version))
            .ok_or_else(|| ContextError::NotFound(name.to_string()))
    }

    /// Compare-and-set write.
    ///
    /// Succeeds only if `expected_version` matches the current version and
    /// the writer is the owner or the variable is shared-write. Returns the
    /// new version.
    pub fn set(
        &self,
        name: &str,
        value: Value,
        expected_version: u64,
        writer: &EntityId,
    ) -> Result<u64, ContextError> {
        let mut vars = self.vars.write().expect("context lock poisoned");
        let var = vars
            .get_mut(name)
            .ok_or_else(|| ContextError::NotFound(name.to_string()))?;

        if var.access == AccessMode::OwnerOnly && &var.owner != writer {
            return Err(ContextError::AccessDenied {
                name: name.to_string(),
                writer: writer.clone(),
                owner: var.owner.clone(),
            });
        }
        if var.version != expected_version {
            return Err(ContextError::VersionConflict {
                name: name.to_string(),
                expected: expected_version,
                current: var.version,
            });
        }

        var.value = value;
        var.version += 1;
        Ok(var.version)
    }

    /// Read-modify-write with bounded retries.
    ///
    /// Re-reads and recomputes on each version conflict, surfacing
    /// `VersionConflict` only once `attempts` are exhausted. Other errors
    /// are surfaced immediately.
    pub fn update(
        &self,
        name: &str,
        writer: &EntityId,
        attempts: usize,
        f: impl Fn(&Value) -> Value,
    ) -> Result<u64, ContextError> {
        let mut last_conflict = None;
        for _ in 0..attempts.max(1) {
            let (value, version) = self.get(name)?;
            match self.set(name, f(&value), version, writer) {
                Ok(new_version) => return Ok(new_version),
                Err(e @ ContextError::VersionConflict { .. }) => last_conflict = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_conflict.expect("at least one attempt was made"))
    }

    /// Names of all defined variables (unordered)
    pub fn names(&self) -> Vec<String> {
        let vars = self.vars.read().expect("context lock poisoned");
        vars.keys().cloned().collect()
    }
}
