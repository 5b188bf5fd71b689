//! Consensus turn policy
//!
//! Rounds continue until the approve-ratio of cast votes strictly exceeds
//! the threshold. Each active entity's latest vote in the history is the one
//! that counts, so a re-vote in a later round supersedes the earlier one and
//! the tally is insensitive to intra-round arrival order. Ties and rounds
//! with no votes continue another round; the turn cap belongs to the
//! orchestrator.

use super::{TurnDecision, round_robin};
use crate::circle::response::TerminationReason;
use crate::core::ids::EntityId;
use crate::entity::roster::Roster;
use crate::message::body::MessageBody;
use crate::message::entities::Message;
use std::collections::HashMap;

pub(super) fn decide(history: &[Message], roster: &Roster, threshold: f64) -> TurnDecision {
    let mut latest: HashMap<&EntityId, bool> = HashMap::new();
    for message in history {
        if let MessageBody::Vote { approve, .. } = &message.body
            && roster.is_active(&message.sender)
        {
            latest.insert(&message.sender, *approve);
        }
    }

    let cast = latest.len();
    if cast > 0 {
        let approvals = latest.values().filter(|a| **a).count();
        if approvals as f64 / cast as f64 > threshold {
            return TurnDecision::Terminate(TerminationReason::PolicyComplete);
        }
    }

    round_robin::decide(roster)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{roster, seal_all, vote};
    use super::*;

    #[test]
    fn test_terminates_above_threshold() {
        let roster = roster(&["ember", "oak", "sage"]);
        let history = seal_all(vec![
            vote("ember", true),
            vote("oak", true),
            vote("sage", false),
        ]);
        assert_eq!(
            decide(&history, &roster, 0.5),
            TurnDecision::Terminate(TerminationReason::PolicyComplete)
        );
    }

    #[test]
    fn test_tie_continues_another_round() {
        let roster = roster(&["ember", "oak"]);
        let history = seal_all(vec![vote("ember", true), vote("oak", false)]);
        // 1/2 does not strictly exceed 0.5
        assert!(matches!(
            decide(&history, &roster, 0.5),
            TurnDecision::Speakers(_)
        ));
    }

    #[test]
    fn test_no_votes_continues() {
        let roster = roster(&["ember", "oak"]);
        assert!(matches!(decide(&[], &roster, 0.0), TurnDecision::Speakers(_)));
    }

    #[test]
    fn test_revote_supersedes_earlier_vote() {
        let roster = roster(&["ember", "oak"]);
        let history = seal_all(vec![
            vote("ember", false),
            vote("oak", false),
            vote("ember", true),
            vote("oak", true),
        ]);
        assert_eq!(
            decide(&history, &roster, 0.9),
            TurnDecision::Terminate(TerminationReason::PolicyComplete)
        );
    }

    #[test]
    fn test_degraded_votes_ignored() {
        let mut roster = roster(&["ember", "oak", "sage"]);
        let history = seal_all(vec![
            vote("ember", true),
            vote("oak", false),
            vote("sage", false),
        ]);
        // With everyone active, 1/3 fails a 0.5 threshold
        assert!(matches!(
            decide(&history, &roster, 0.5),
            TurnDecision::Speakers(_)
        ));

        // Once the rejecting entities degrade, only the approval counts
        roster.mark_degraded(&crate::core::ids::EntityId::new("oak"));
        roster.mark_degraded(&crate::core::ids::EntityId::new("sage"));
        assert_eq!(
            decide(&history, &roster, 0.5),
            TurnDecision::Terminate(TerminationReason::PolicyComplete)
        );
    }
}
