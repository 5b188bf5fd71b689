//! Policy wire form
//!
//! [`PolicySpec`] is the name-plus-parameters shape carried by a
//! [`CircleRequest`](crate::circle::request::CircleRequest). Resolution
//! against the session roster happens once, before any session exists, so an
//! unknown name or invalid parameter is a validation failure, never a
//! mid-session surprise.

use crate::circle::request::ValidationError;
use crate::core::ids::EntityId;
use crate::entity::capability::EntityCapability;
use crate::entity::roster::Roster;
use crate::policy::TurnPolicy;
use serde::{Deserialize, Serialize};

/// Named turn policy with its parameters, as submitted by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    /// "round_robin" | "consensus" | "moderator_led"
    pub name: String,
    /// Consensus approve-ratio threshold in [0, 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Designated moderator for moderator_led
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator: Option<EntityId>,
}

impl PolicySpec {
    pub fn round_robin() -> Self {
        Self {
            name: "round_robin".to_string(),
            threshold: None,
            moderator: None,
        }
    }

    pub fn consensus(threshold: f64) -> Self {
        Self {
            name: "consensus".to_string(),
            threshold: Some(threshold),
            moderator: None,
        }
    }

    pub fn moderator_led(moderator: EntityId) -> Self {
        Self {
            name: "moderator_led".to_string(),
            threshold: None,
            moderator: Some(moderator),
        }
    }

    /// Resolve the wire form into a runnable policy for the given roster.
    pub fn resolve(&self, roster: &Roster) -> Result<TurnPolicy, ValidationError> {
        match self.name.as_str() {
            "round_robin" => Ok(TurnPolicy::RoundRobin),
            "consensus" => {
                let threshold = self.threshold.ok_or(ValidationError::MissingThreshold)?;
                if !(0.0..1.0).contains(&threshold) {
                    return Err(ValidationError::InvalidThreshold(threshold));
                }
                Ok(TurnPolicy::Consensus { threshold })
            }
            "moderator_led" => {
                let moderator = self
                    .moderator
                    .clone()
                    .ok_or(ValidationError::MissingModerator)?;
                let participant = roster
                    .get(&moderator)
                    .ok_or_else(|| ValidationError::ModeratorNotAParticipant(moderator.clone()))?;
                if !participant.entity().has_capability(EntityCapability::Moderate) {
                    return Err(ValidationError::ModeratorCannotModerate(moderator));
                }
                Ok(TurnPolicy::ModeratorLed { moderator })
            }
            other => Err(ValidationError::UnknownPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{entity, roster};
    use super::*;
    use crate::entity::roster::Roster;

    #[test]
    fn test_resolve_round_robin() {
        let roster = roster(&["ember"]);
        assert_eq!(
            PolicySpec::round_robin().resolve(&roster).unwrap(),
            TurnPolicy::RoundRobin
        );
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let roster = roster(&["ember"]);
        let spec = PolicySpec {
            name: "free_for_all".to_string(),
            threshold: None,
            moderator: None,
        };
        assert_eq!(
            spec.resolve(&roster).unwrap_err(),
            ValidationError::UnknownPolicy("free_for_all".to_string())
        );
    }

    #[test]
    fn test_consensus_threshold_range() {
        let roster = roster(&["ember"]);
        assert!(PolicySpec::consensus(0.5).resolve(&roster).is_ok());
        assert_eq!(
            PolicySpec::consensus(1.5).resolve(&roster).unwrap_err(),
            ValidationError::InvalidThreshold(1.5)
        );
        let missing = PolicySpec {
            name: "consensus".to_string(),
            threshold: None,
            moderator: None,
        };
        assert_eq!(
            missing.resolve(&roster).unwrap_err(),
            ValidationError::MissingThreshold
        );
    }

    #[test]
    fn test_moderator_must_be_capable_participant() {
        let roster = roster(&["ember", "oak"]);
        assert!(
            PolicySpec::moderator_led(EntityId::new("ember"))
                .resolve(&roster)
                .is_ok()
        );
        assert_eq!(
            PolicySpec::moderator_led(EntityId::new("ghost"))
                .resolve(&roster)
                .unwrap_err(),
            ValidationError::ModeratorNotAParticipant(EntityId::new("ghost"))
        );

        // A participant without the moderate capability is rejected too
        let plain = Roster::new([entity("ember", &[EntityCapability::Generate])]);
        assert_eq!(
            PolicySpec::moderator_led(EntityId::new("ember"))
                .resolve(&plain)
                .unwrap_err(),
            ValidationError::ModeratorCannotModerate(EntityId::new("ember"))
        );
    }

    #[test]
    fn test_spec_serde_shape() {
        let spec = PolicySpec::consensus(0.66);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["name"], "consensus");
        assert_eq!(json["threshold"], 0.66);
        assert!(json.get("moderator").is_none());
    }
}
