//! Round-robin turn selection
//!
//! Every active entity takes one turn per round, in registration order.
//! An entity that answered with `silence` still took its turn; degraded
//! entities are skipped.

use super::TurnDecision;
use crate::entity::roster::Roster;

pub(super) fn decide(roster: &Roster) -> TurnDecision {
    TurnDecision::Speakers(roster.active().map(|p| p.id().clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::roster;
    use super::*;
    use crate::core::ids::EntityId;

    #[test]
    fn test_all_active_in_registration_order() {
        let roster = roster(&["ember", "oak", "sage"]);
        let TurnDecision::Speakers(speakers) = decide(&roster) else {
            panic!("round robin never terminates");
        };
        let ids: Vec<&str> = speakers.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["ember", "oak", "sage"]);
    }

    #[test]
    fn test_degraded_entities_skipped() {
        let mut roster = roster(&["ember", "oak", "sage"]);
        roster.mark_degraded(&EntityId::new("oak"));
        let TurnDecision::Speakers(speakers) = decide(&roster) else {
            panic!("round robin never terminates");
        };
        let ids: Vec<&str> = speakers.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["ember", "sage"]);
    }
}
