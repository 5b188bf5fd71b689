//! Turn-taking policies
//!
//! A policy is a pure function from (history, roster, round) to the next
//! speakers or a termination decision. Policies are tagged variants, not
//! trait objects, so each variant stays independently property-testable
//! without mocking adapters. All variants are deterministic given identical
//! history and roster.

mod consensus;
mod moderator;
mod round_robin;
pub mod spec;

pub use spec::PolicySpec;

use crate::circle::response::TerminationReason;
use crate::core::ids::EntityId;
use crate::entity::roster::Roster;
use crate::message::entities::Message;

/// Outcome of one policy consultation
#[derive(Debug, Clone, PartialEq)]
pub enum TurnDecision {
    /// The entities that should speak this round, in order, no duplicates
    Speakers(Vec<EntityId>),
    /// End the session with the given reason
    Terminate(TerminationReason),
}

/// Resolved turn-taking policy for one session
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPolicy {
    /// Every active entity speaks each round, in registration order
    RoundRobin,
    /// Rounds continue until the approve-ratio of cast votes strictly
    /// exceeds the threshold
    Consensus { threshold: f64 },
    /// A designated moderator names each round's speakers via `control`
    /// messages; falls back to round-robin if the moderator degrades
    ModeratorLed { moderator: EntityId },
}

impl TurnPolicy {
    /// Decide the next round.
    ///
    /// Pure: no clock, no randomness, no I/O. Turn caps and quorum are the
    /// orchestrator's concern, so `RoundRobin` never self-terminates.
    pub fn decide(&self, history: &[Message], roster: &Roster, round: usize) -> TurnDecision {
        let _ = round;
        match self {
            TurnPolicy::RoundRobin => round_robin::decide(roster),
            TurnPolicy::Consensus { threshold } => consensus::decide(history, roster, *threshold),
            TurnPolicy::ModeratorLed { moderator } => {
                moderator::decide(history, roster, moderator)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TurnPolicy::RoundRobin => "round_robin",
            TurnPolicy::Consensus { .. } => "consensus",
            TurnPolicy::ModeratorLed { .. } => "moderator_led",
        }
    }
}

impl std::fmt::Display for TurnPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPolicy::Consensus { threshold } => write!(f, "consensus(threshold={threshold})"),
            TurnPolicy::ModeratorLed { moderator } => write!(f, "moderator_led({moderator})"),
            TurnPolicy::RoundRobin => write!(f, "round_robin"),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::ids::CircleId;
    use crate::entity::capability::EntityCapability;
    use crate::entity::entities::{AdapterRef, Entity};
    use crate::message::body::MessageBody;
    use crate::message::entities::DraftMessage;
    use crate::message::transcript::Transcript;

    pub fn entity(id: &str, caps: &[EntityCapability]) -> Entity {
        Entity::new(
            EntityId::new(id),
            id.to_uppercase(),
            caps.iter().copied(),
            AdapterRef::new("loopback"),
        )
    }

    pub fn roster(ids: &[&str]) -> Roster {
        Roster::new(ids.iter().map(|id| {
            entity(
                id,
                &[
                    EntityCapability::Generate,
                    EntityCapability::Vote,
                    EntityCapability::Moderate,
                ],
            )
        }))
    }

    pub fn seal_all(drafts: Vec<DraftMessage>) -> Vec<Message> {
        let mut transcript = Transcript::new(CircleId::new("policy-test"));
        for draft in drafts {
            transcript.append(draft);
        }
        transcript.into_messages()
    }

    pub fn vote(sender: &str, approve: bool) -> DraftMessage {
        DraftMessage::new(EntityId::new(sender), MessageBody::vote(approve, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_decide_is_deterministic() {
        let roster = roster(&["ember", "oak", "sage"]);
        let history = seal_all(vec![vote("ember", true), vote("oak", false)]);

        for policy in [
            TurnPolicy::RoundRobin,
            TurnPolicy::Consensus { threshold: 0.5 },
            TurnPolicy::ModeratorLed {
                moderator: EntityId::new("ember"),
            },
        ] {
            let first = policy.decide(&history, &roster, 1);
            let second = policy.decide(&history, &roster, 1);
            assert_eq!(first, second, "{policy} must be deterministic");
        }
    }

    #[test]
    fn test_no_duplicate_speakers_in_a_round() {
        let roster = roster(&["ember", "oak", "sage"]);
        for policy in [
            TurnPolicy::RoundRobin,
            TurnPolicy::Consensus { threshold: 0.9 },
            TurnPolicy::ModeratorLed {
                moderator: EntityId::new("oak"),
            },
        ] {
            if let TurnDecision::Speakers(speakers) = policy.decide(&[], &roster, 0) {
                let mut unique = speakers.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), speakers.len(), "{policy} repeated a speaker");
            }
        }
    }
}
