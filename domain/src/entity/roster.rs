//! Session-local participant roster
//!
//! A [`Roster`] is the session's private view of its resolved participants,
//! in registration order. Degrading an entity here affects only the owning
//! session; the shared registry is untouched.

use crate::core::ids::EntityId;
use crate::entity::capability::EntityCapability;
use crate::entity::entities::{Entity, EntityStatus};

/// One participant as seen by a single session
#[derive(Debug, Clone)]
pub struct Participant {
    entity: Entity,
    status: EntityStatus,
}

impl Participant {
    pub fn new(entity: Entity) -> Self {
        let status = entity.status();
        Self { entity, status }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn id(&self) -> &EntityId {
        self.entity.id()
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// The resolved participants of one circle, in registration order
#[derive(Debug, Clone)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            participants: entities.into_iter().map(Participant::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn get(&self, id: &EntityId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_active(&self, id: &EntityId) -> bool {
        self.get(id).is_some_and(|p| p.is_active())
    }

    /// Active participants in registration order
    pub fn active(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// First active participant with the given capability, in registration
    /// order
    pub fn first_active_with(&self, cap: EntityCapability) -> Option<&Participant> {
        self.active().find(|p| p.entity().has_capability(cap))
    }

    /// Mark a participant degraded for the rest of this session.
    ///
    /// Returns false if the id is not part of the roster.
    pub fn mark_degraded(&mut self, id: &EntityId) -> bool {
        match self.participants.iter_mut().find(|p| p.id() == id) {
            Some(p) => {
                p.status = EntityStatus::Degraded;
                true
            }
            None => false,
        }
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

    #[test]
    fn test_roster_keeps_registration_order() {
        let roster = Roster::new([
            entity("ember", &[EntityCapability::Generate]),
            entity("oak", &[EntityCapability::Generate]),
            entity("sage", &[EntityCapability::Generate]),
        ]);
        let ids: Vec<&str> = roster.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["ember", "oak", "sage"]);
    }

    #[test]
    fn test_mark_degraded_is_session_local() {
        let mut roster = Roster::new([
            entity("ember", &[EntityCapability::Generate]),
            entity("oak", &[EntityCapability::Generate]),
        ]);
        assert!(roster.mark_degraded(&EntityId::new("oak")));
        assert_eq!(roster.active_count(), 1);
        assert!(!roster.is_active(&EntityId::new("oak")));
        assert!(!roster.mark_degraded(&EntityId::new("unknown")));
    }

    #[test]
    fn test_first_active_with_capability() {
        let mut roster = Roster::new([
            entity("ember", &[EntityCapability::Summarize]),
            entity("oak", &[EntityCapability::Summarize]),
        ]);
        roster.mark_degraded(&EntityId::new("ember"));
        let found = roster.first_active_with(EntityCapability::Summarize);
        assert_eq!(found.map(|p| p.id().as_str()), Some("oak"));
    }
}
