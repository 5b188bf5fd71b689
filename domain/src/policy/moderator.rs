//! Moderator-led turn policy
//!
//! A designated `moderate`-capable entity opens every round and steers
//! turn-taking through `control` messages: its most recent `name_speakers`
//! directive picks who joins it next round, and `conclude` ends the session.
//! If the moderator has degraded, the policy falls back to round-robin for
//! the remaining rounds.

use super::{TurnDecision, round_robin};
use crate::circle::response::TerminationReason;
use crate::core::ids::EntityId;
use crate::entity::roster::Roster;
use crate::message::body::{ControlDirective, MessageBody};
use crate::message::entities::Message;

pub(super) fn decide(history: &[Message], roster: &Roster, moderator: &EntityId) -> TurnDecision {
    if !roster.is_active(moderator) {
        return round_robin::decide(roster);
    }

    // Latest steering directive from the moderator, if any
    let mut named: &[EntityId] = &[];
    for message in history.iter().rev() {
        if message.sender != *moderator {
            continue;
        }
        if let MessageBody::Control { directive } = &message.body {
            match directive {
                ControlDirective::Conclude => {
                    return TurnDecision::Terminate(TerminationReason::PolicyComplete);
                }
                ControlDirective::NameSpeakers { speakers } => {
                    named = speakers;
                    break;
                }
                // Exclusions are orchestrator bookkeeping, not steering
                ControlDirective::ExcludeEntity { .. } => continue,
            }
        }
    }

    let mut speakers = vec![moderator.clone()];
    for id in named {
        if id != moderator && roster.is_active(id) && !speakers.contains(id) {
            speakers.push(id.clone());
        }
    }
    TurnDecision::Speakers(speakers)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{roster, seal_all};
    use super::*;
    use crate::message::entities::DraftMessage;

    fn control(sender: &str, directive: ControlDirective) -> DraftMessage {
        DraftMessage::new(
            EntityId::new(sender),
            MessageBody::control(directive).unwrap(),
        )
    }

    #[test]
    fn test_moderator_opens_without_directive() {
        let roster = roster(&["ember", "oak", "sage"]);
        let decision = decide(&[], &roster, &EntityId::new("oak"));
        assert_eq!(
            decision,
            TurnDecision::Speakers(vec![EntityId::new("oak")])
        );
    }

    #[test]
    fn test_named_speakers_join_the_moderator() {
        let roster = roster(&["ember", "oak", "sage"]);
        let history = seal_all(vec![control(
            "ember",
            ControlDirective::NameSpeakers {
                speakers: vec![EntityId::new("sage"), EntityId::new("oak")],
            },
        )]);
        let decision = decide(&history, &roster, &EntityId::new("ember"));
        assert_eq!(
            decision,
            TurnDecision::Speakers(vec![
                EntityId::new("ember"),
                EntityId::new("sage"),
                EntityId::new("oak"),
            ])
        );
    }

    #[test]
    fn test_unknown_or_degraded_named_speakers_dropped() {
        let mut roster = roster(&["ember", "oak", "sage"]);
        roster.mark_degraded(&EntityId::new("sage"));
        let history = seal_all(vec![control(
            "ember",
            ControlDirective::NameSpeakers {
                speakers: vec![
                    EntityId::new("sage"),
                    EntityId::new("ghost"),
                    EntityId::new("oak"),
                ],
            },
        )]);
        let decision = decide(&history, &roster, &EntityId::new("ember"));
        assert_eq!(
            decision,
            TurnDecision::Speakers(vec![EntityId::new("ember"), EntityId::new("oak")])
        );
    }

    #[test]
    fn test_conclude_terminates() {
        let roster = roster(&["ember", "oak"]);
        let history = seal_all(vec![control("ember", ControlDirective::Conclude)]);
        assert_eq!(
            decide(&history, &roster, &EntityId::new("ember")),
            TurnDecision::Terminate(TerminationReason::PolicyComplete)
        );
    }

    #[test]
    fn test_conclude_from_non_moderator_ignored() {
        let roster = roster(&["ember", "oak"]);
        let history = seal_all(vec![control("oak", ControlDirective::Conclude)]);
        assert!(matches!(
            decide(&history, &roster, &EntityId::new("ember")),
            TurnDecision::Speakers(_)
        ));
    }

    #[test]
    fn test_degraded_moderator_falls_back_to_round_robin() {
        let mut roster = roster(&["ember", "oak", "sage"]);
        roster.mark_degraded(&EntityId::new("ember"));
        let decision = decide(&[], &roster, &EntityId::new("ember"));
        assert_eq!(
            decision,
            TurnDecision::Speakers(vec![EntityId::new("oak"), EntityId::new("sage")])
        );
    }
}
