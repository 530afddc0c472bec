use std::collections::VecDeque;

use tracing::debug;

use super::{history::HistoryIndex, ranking::Ranked, types::RematchPolicy};

/// Two competitors drawn together, anchor first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Match<'a> {
    pub(crate) anchor: Ranked<'a>,
    pub(crate) opponent: Ranked<'a>,
}

/// What happens to an anchor with no fresh opponent left in its bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fallback {
    /// Accept a rematch against the next remaining player.
    Force,
    /// Carry the anchor down to the next group.
    FloatDown,
}

impl Fallback {
    pub(crate) fn for_group(is_last: bool, policy: RematchPolicy) -> Self {
        if is_last || policy.allows_rematch() {
            Fallback::Force
        } else {
            Fallback::FloatDown
        }
    }
}

/// Matches formed in one bracket plus everybody carried onwards.
#[derive(Debug, Default)]
pub(crate) struct GroupOutcome<'a> {
    pub(crate) matches: Vec<Match<'a>>,
    pub(crate) unmatched: Vec<Ranked<'a>>,
}

/// Opening round: the top half of the standings meets the bottom half, rank for rank.
pub(crate) fn match_round_one<'a>(pool: &[Ranked<'a>]) -> Vec<Match<'a>> {
    let (top, bottom) = pool.split_at(pool.len() / 2);
    top.iter()
        .zip(bottom)
        .map(|(anchor, opponent)| Match {
            anchor: *anchor,
            opponent: *opponent,
        })
        .collect()
}

/// Pair a bracket by repeatedly anchoring its top-ranked player.
///
/// Each anchor takes the highest-ranked player it has not met yet. Without one,
/// the [`Fallback`] decides between a forced rematch and floating the anchor down.
pub(crate) fn match_group<'a>(
    players: Vec<Ranked<'a>>,
    history: &HistoryIndex,
    policy: RematchPolicy,
    fallback: Fallback,
) -> GroupOutcome<'a> {
    let mut queue: VecDeque<Ranked<'a>> = players.into();
    let mut outcome = GroupOutcome::default();

    while queue.len() >= 2 {
        let Some(anchor) = queue.pop_front() else {
            break;
        };

        let fresh = queue.iter().position(|candidate| {
            policy.allows_rematch() || !history.have_met(anchor.id(), candidate.id())
        });

        let opponent = match (fresh, fallback) {
            (Some(position), _) => queue.remove(position),
            (None, Fallback::Force) => {
                let forced = queue.pop_front();
                if let Some(opponent) = forced {
                    debug!(
                        anchor = %anchor.id(),
                        opponent = %opponent.id(),
                        "no fresh opponent left; forcing a rematch"
                    );
                }
                forced
            }
            (None, Fallback::FloatDown) => {
                debug!(anchor = %anchor.id(), "no fresh opponent in group; floating down");
                outcome.unmatched.push(anchor);
                continue;
            }
        };

        match opponent {
            Some(opponent) => outcome.matches.push(Match { anchor, opponent }),
            None => outcome.unmatched.push(anchor),
        }
    }

    outcome.unmatched.extend(queue);
    outcome
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::pairing::{
        ranking::rank,
        types::{Competitor, HistoryEntry},
    };

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn field(count: u128) -> Vec<Competitor> {
        (1..=count)
            .map(|n| Competitor::new(id(n), format!("p{n}"), 0.0).with_seed(n as u32))
            .collect()
    }

    fn pairs(matches: &[Match<'_>]) -> Vec<(u128, u128)> {
        matches
            .iter()
            .map(|m| (m.anchor.id().as_u128(), m.opponent.id().as_u128()))
            .collect()
    }

    fn unmatched(outcome: &GroupOutcome<'_>) -> Vec<u128> {
        outcome
            .unmatched
            .iter()
            .map(|player| player.id().as_u128())
            .collect()
    }

    #[test]
    fn round_one_folds_the_standings_in_half() {
        let competitors = field(8);
        let matches = match_round_one(&rank(&competitors));
        assert_eq!(pairs(&matches), vec![(1, 5), (2, 6), (3, 7), (4, 8)]);
    }

    #[test]
    fn anchors_take_the_first_unmet_player() {
        let competitors = field(4);
        let history = HistoryIndex::new(&[HistoryEntry::game(1, id(1), id(2), None)]);
        let outcome = match_group(
            rank(&competitors),
            &history,
            RematchPolicy::Avoid,
            Fallback::Force,
        );
        assert_eq!(pairs(&outcome.matches), vec![(1, 3), (2, 4)]);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn exhausted_anchor_floats_down_outside_the_last_group() {
        let competitors = field(2);
        let history = HistoryIndex::new(&[HistoryEntry::game(1, id(1), id(2), None)]);
        let outcome = match_group(
            rank(&competitors),
            &history,
            RematchPolicy::Avoid,
            Fallback::FloatDown,
        );
        assert!(outcome.matches.is_empty());
        assert_eq!(unmatched(&outcome), vec![1, 2]);
    }

    #[test]
    fn exhausted_anchor_is_forced_into_a_rematch_in_the_last_group() {
        let competitors = field(2);
        let history = HistoryIndex::new(&[HistoryEntry::game(1, id(2), id(1), None)]);
        let outcome = match_group(
            rank(&competitors),
            &history,
            RematchPolicy::Avoid,
            Fallback::Force,
        );
        assert_eq!(pairs(&outcome.matches), vec![(1, 2)]);
    }

    #[test]
    fn allowed_rematches_skip_the_history_filter() {
        let competitors = field(4);
        let history = HistoryIndex::new(&[HistoryEntry::game(1, id(1), id(2), None)]);
        let outcome = match_group(
            rank(&competitors),
            &history,
            RematchPolicy::Allow,
            Fallback::for_group(false, RematchPolicy::Allow),
        );
        assert_eq!(pairs(&outcome.matches), vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn odd_leftover_is_reported_as_unmatched() {
        let competitors = field(3);
        let outcome = match_group(
            rank(&competitors),
            &HistoryIndex::default(),
            RematchPolicy::Avoid,
            Fallback::Force,
        );
        assert_eq!(pairs(&outcome.matches), vec![(1, 2)]);
        assert_eq!(unmatched(&outcome), vec![3]);
    }
}
