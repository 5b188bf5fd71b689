//! Entity domain types

use crate::core::ids::EntityId;
use crate::entity::capability::EntityCapability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque routing key linking an entity to the external adapter that
/// produces its messages. Resolved by infrastructure; the core never looks
/// inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdapterRef(String);

impl AdapterRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AdapterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health of a participant
///
/// DEGRADED entities are excluded from speaker selection; the flag is the
/// only mutable part of an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityStatus {
    #[default]
    Active,
    Degraded,
}

impl EntityStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, EntityStatus::Active)
    }
}

/// A registered participant (Entity)
///
/// Immutable after registration except for `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    display_name: String,
    capabilities: BTreeSet<EntityCapability>,
    adapter_ref: AdapterRef,
    status: EntityStatus,
}

impl Entity {
    pub fn new(
        id: EntityId,
        display_name: impl Into<String>,
        capabilities: impl IntoIterator<Item = EntityCapability>,
        adapter_ref: AdapterRef,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            capabilities: capabilities.into_iter().collect(),
            adapter_ref,
            status: EntityStatus::Active,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn capabilities(&self) -> impl Iterator<Item = EntityCapability> + '_ {
        self.capabilities.iter().copied()
    }

    pub fn has_capability(&self, cap: EntityCapability) -> bool {
        self.capabilities.contains(&cap)
    }

    pub fn adapter_ref(&self) -> &AdapterRef {
        &self.adapter_ref
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn set_status(&mut self, status: EntityStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_defaults_to_active() {
        let entity = Entity::new(
            EntityId::new("ember"),
            "Ember",
            [EntityCapability::Generate, EntityCapability::Vote],
            AdapterRef::new("loopback"),
        );
        assert!(entity.status().is_active());
        assert!(entity.has_capability(EntityCapability::Vote));
        assert!(!entity.has_capability(EntityCapability::Moderate));
    }

    #[test]
    fn test_capability_set_deduplicates() {
        let entity = Entity::new(
            EntityId::new("oak"),
            "Oak",
            [EntityCapability::Generate, EntityCapability::Generate],
            AdapterRef::new("loopback"),
        );
        assert_eq!(entity.capabilities().count(), 1);
    }
}
