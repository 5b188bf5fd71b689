//! Entity registry
//!
//! Process-wide store of registered participants. Registration is append-only
//! under a single writer lock; readers take immutable [`RegistrySnapshot`]s so
//! concurrent sessions never block each other. A [`SessionLease`] pins the
//! entities of one running session, blocking `unregister` for its duration.
//!
//! The registry is an explicit value shared via `Arc` — there is no
//! process-wide singleton.

use crate::core::ids::EntityId;
use crate::entity::capability::EntityCapability;
use crate::entity::entities::{Entity, EntityStatus};
use crate::entity::roster::Roster;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors raised by registry operations
#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("entity already registered: {0}")]
    DuplicateEntity(EntityId),

    #[error("entity not found: {0}")]
    NotFound(EntityId),

    #[error("entity is referenced by an active session: {0}")]
    EntityLeased(EntityId),

    #[error("the reserved orchestrator id cannot be registered")]
    ReservedId,
}

#[derive(Default)]
struct RegistryInner {
    /// Registration order, the order every capability lookup preserves
    entities: Arc<Vec<Entity>>,
    by_capability: Arc<HashMap<EntityCapability, Vec<EntityId>>>,
    /// Active-session refcount per entity
    leases: HashMap<EntityId, usize>,
}

impl RegistryInner {
    fn position(&self, id: &EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    fn rebuild_index(entities: &[Entity]) -> HashMap<EntityCapability, Vec<EntityId>> {
        let mut index: HashMap<EntityCapability, Vec<EntityId>> = HashMap::new();
        for entity in entities {
            for cap in entity.capabilities() {
                index.entry(cap).or_default().push(entity.id().clone());
            }
        }
        index
    }

    /// Replace the entity list via copy-on-write so outstanding snapshots
    /// stay valid.
    fn replace(&mut self, entities: Vec<Entity>) {
        self.by_capability = Arc::new(Self::rebuild_index(&entities));
        self.entities = Arc::new(entities);
    }
}

/// Shared registry of participants
pub struct EntityRegistry {
    inner: RwLock<RegistryInner>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Register a new entity with status ACTIVE.
    pub fn register(&self, entity: Entity) -> Result<(), RegistryError> {
        if entity.id().is_orchestrator() {
            return Err(RegistryError::ReservedId);
        }
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if inner.position(entity.id()).is_some() {
            return Err(RegistryError::DuplicateEntity(entity.id().clone()));
        }
        let mut entities = inner.entities.as_ref().clone();
        entities.push(entity);
        inner.replace(entities);
        Ok(())
    }

    /// Look up one entity by id.
    pub fn lookup(&self, id: &EntityId) -> Result<Entity, RegistryError> {
        let inner = self.inner.read().expect("registry lock poisoned");
        inner
            .position(id)
            .map(|i| inner.entities[i].clone())
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Entities carrying the given capability, in registration order.
    ///
    /// Deterministic against an unchanged registry, which reproducible
    /// policies rely on.
    pub fn find_by_capability(&self, cap: EntityCapability) -> Vec<Entity> {
        self.snapshot().find_by_capability(cap)
    }

    /// Remove an entity that is not referenced by any active session.
    pub fn unregister(&self, id: &EntityId) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        let position = inner
            .position(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        if inner.leases.get(id).copied().unwrap_or(0) > 0 {
            return Err(RegistryError::EntityLeased(id.clone()));
        }
        let mut entities = inner.entities.as_ref().clone();
        entities.remove(position);
        inner.replace(entities);
        inner.leases.remove(id);
        Ok(())
    }

    /// Operator-level status flip, picked up by leases taken afterwards.
    /// Sessions already running keep their roster view.
    pub fn set_status(&self, id: &EntityId, status: EntityStatus) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        let position = inner
            .position(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        let mut entities = inner.entities.as_ref().clone();
        entities[position].set_status(status);
        inner.replace(entities);
        Ok(())
    }

    /// Immutable point-in-time view for lock-free reads.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let inner = self.inner.read().expect("registry lock poisoned");
        RegistrySnapshot {
            entities: Arc::clone(&inner.entities),
            by_capability: Arc::clone(&inner.by_capability),
        }
    }

    /// Resolve all requested participants and pin them for the lifetime of
    /// the returned lease.
    ///
    /// Fails with `NotFound` if any id is unknown; on failure no refcounts
    /// are touched. The [`Roster`] reflects entity statuses at lease time.
    pub fn lease(
        self: &Arc<Self>,
        ids: &[EntityId],
    ) -> Result<(SessionLease, Roster), RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            let position = inner
                .position(id)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            resolved.push(inner.entities[position].clone());
        }
        for id in ids {
            *inner.leases.entry(id.clone()).or_insert(0) += 1;
        }
        drop(inner);

        let lease = SessionLease {
            registry: Arc::clone(self),
            ids: ids.to_vec(),
        };
        Ok((lease, Roster::new(resolved)))
    }

    fn release(&self, ids: &[EntityId]) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        for id in ids {
            if let Some(count) = inner.leases.get_mut(id) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    inner.leases.remove(id);
                }
            }
        }
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable point-in-time view of the registry
#[derive(Clone)]
pub struct RegistrySnapshot {
    entities: Arc<Vec<Entity>>,
    by_capability: Arc<HashMap<EntityCapability, Vec<EntityId>>>,
}

impl RegistrySnapshot {
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn lookup(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Entities carrying the given capability, in registration order.
    pub fn find_by_capability(&self, cap: EntityCapability) -> Vec<Entity> {
        let Some(ids) = self.by_capability.get(&cap) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.lookup(id).cloned())
            .collect()
    }
}

/// RAII guard pinning the entities of one running session.
///
/// Dropping the lease releases the refcounts, which re-enables
/// `unregister` for entities no other session holds.
pub struct SessionLease {
    registry: Arc<EntityRegistry>,
    ids: Vec<EntityId>,
}

impl std::fmt::Debug for SessionLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLease")
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

impl SessionLease {
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.registry.release(&self.ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::entities::AdapterRef;

    fn entity(id: &str, caps: &[EntityCapability]) -> Entity {
        Entity::new(
            EntityId::new(id),
            id.to_uppercase(),
            caps.iter().copied(),
            AdapterRef::new("loopback"),
        )
    }

    fn registry_with(ids: &[&str]) -> Arc<EntityRegistry> {
        let registry = Arc::new(EntityRegistry::new());
        for id in ids {
            registry
                .register(entity(id, &[EntityCapability::Generate, EntityCapability::Vote]))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_register_duplicate_refused() {
        let registry = EntityRegistry::new();
        registry
            .register(entity("ember", &[EntityCapability::Generate]))
            .unwrap();
        let err = registry
            .register(entity("ember", &[EntityCapability::Vote]))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateEntity(EntityId::new("ember")));
    }

    #[test]
    fn test_reserved_id_refused() {
        let registry = EntityRegistry::new();
        let err = registry
            .register(Entity::new(
                EntityId::orchestrator(),
                "impostor",
                [EntityCapability::Generate],
                AdapterRef::new("loopback"),
            ))
            .unwrap_err();
        assert_eq!(err, RegistryError::ReservedId);
    }

    #[test]
    fn test_lookup_missing() {
        let registry = EntityRegistry::new();
        let err = registry.lookup(&EntityId::new("ghost")).unwrap_err();
        assert_eq!(err, RegistryError::NotFound(EntityId::new("ghost")));
    }

    #[test]
    fn test_find_by_capability_registration_order() {
        let registry = EntityRegistry::new();
        registry
            .register(entity("sage", &[EntityCapability::Vote]))
            .unwrap();
        registry
            .register(entity("ember", &[EntityCapability::Vote]))
            .unwrap();
        registry
            .register(entity("oak", &[EntityCapability::Generate]))
            .unwrap();

        let voters: Vec<String> = registry
            .find_by_capability(EntityCapability::Vote)
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        assert_eq!(voters, vec!["sage", "ember"]);
    }

    #[test]
    fn test_find_by_capability_idempotent() {
        let registry = registry_with(&["ember", "oak", "sage"]);
        let first = registry.find_by_capability(EntityCapability::Vote);
        let second = registry.find_by_capability(EntityCapability::Vote);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unregister_leased_entity_refused() {
        let registry = registry_with(&["ember", "oak"]);
        let (lease, _roster) = registry
            .lease(&[EntityId::new("ember"), EntityId::new("oak")])
            .unwrap();

        let err = registry.unregister(&EntityId::new("ember")).unwrap_err();
        assert_eq!(err, RegistryError::EntityLeased(EntityId::new("ember")));

        drop(lease);
        assert!(registry.unregister(&EntityId::new("ember")).is_ok());
    }

    #[test]
    fn test_lease_unknown_participant_touches_nothing() {
        let registry = registry_with(&["ember"]);
        let err = registry
            .lease(&[EntityId::new("ember"), EntityId::new("ghost")])
            .unwrap_err();
        assert_eq!(err, RegistryError::NotFound(EntityId::new("ghost")));
        // No refcount leaked from the failed lease
        assert!(registry.unregister(&EntityId::new("ember")).is_ok());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_registration() {
        let registry = registry_with(&["ember"]);
        let snapshot = registry.snapshot();
        registry
            .register(entity("oak", &[EntityCapability::Generate]))
            .unwrap();
        assert_eq!(snapshot.entities().len(), 1);
        assert_eq!(registry.snapshot().entities().len(), 2);
    }

    #[test]
    fn test_set_status_seen_by_new_leases_only() {
        let registry = registry_with(&["ember", "oak"]);
        let ids = [EntityId::new("ember"), EntityId::new("oak")];
        let (_lease_before, roster_before) = registry.lease(&ids).unwrap();

        registry
            .set_status(&EntityId::new("oak"), EntityStatus::Degraded)
            .unwrap();

        let (_lease_after, roster_after) = registry.lease(&ids).unwrap();
        assert!(roster_before.is_active(&EntityId::new("oak")));
        assert!(!roster_after.is_active(&EntityId::new("oak")));
    }
}
