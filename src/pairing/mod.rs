//! Swiss-system round pairing.
//!
//! [`pair_round`] is a pure function of the roster snapshot, the tournament
//! history and the round number. It ranks the roster, sets aside a bye for odd
//! rosters, walks the score groups from the top down (floating players down
//! when a group cannot be paired cleanly) and finally seats every match so
//! that white and black even out over the tournament.

mod bye;
mod colors;
mod history;
mod matcher;
mod ranking;
mod score_groups;
mod types;

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

pub use ranking::compare_standing;
pub use types::{
    Competitor, GameResult, HistoryEntry, Pairing, RematchPolicy, RoundPairings, Seat,
};

use self::{
    bye::resolve_bye,
    colors::assign_boards,
    history::HistoryIndex,
    matcher::{Fallback, Match, match_group, match_round_one},
    ranking::{Ranked, rank},
    score_groups::partition,
};

/// Failures that prevent a round from being paired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    /// Rounds are numbered from 1.
    #[error("round number must be at least 1")]
    InvalidRound,
    /// The same competitor appears twice in the roster.
    #[error("competitor `{0}` appears more than once in the roster")]
    DuplicateCompetitor(Uuid),
    /// A competitor could not be paired after every fallback was exhausted.
    #[error("competitor `{0}` was left without an opponent")]
    UnpairedCompetitor(Uuid),
}

/// Produce the pairings for `round`.
///
/// Neither the roster nor the history is modified; when a bye is awarded the
/// synthetic history entry is returned in [`RoundPairings::bye`] and it is up to
/// the caller to persist it.
pub fn pair_round(
    competitors: &[Competitor],
    history: &[HistoryEntry],
    round: u32,
    policy: RematchPolicy,
) -> Result<RoundPairings, PairingError> {
    if round == 0 {
        return Err(PairingError::InvalidRound);
    }
    ensure_unique(competitors)?;

    let index = HistoryIndex::new(history);
    let resolution = resolve_bye(rank(competitors), &index, round);

    let matches = if round == 1 {
        match_round_one(&resolution.pool)
    } else {
        pair_by_score_groups(resolution.pool, &index, policy)?
    };

    Ok(RoundPairings {
        round,
        pairings: assign_boards(&matches, &index),
        bye: resolution.bye,
    })
}

fn ensure_unique(competitors: &[Competitor]) -> Result<(), PairingError> {
    let mut seen = HashSet::with_capacity(competitors.len());
    match competitors.iter().find(|competitor| !seen.insert(competitor.id)) {
        Some(duplicate) => Err(PairingError::DuplicateCompetitor(duplicate.id)),
        None => Ok(()),
    }
}

/// Walk the score groups top-down, carrying unpaired players into the next group.
fn pair_by_score_groups<'a>(
    pool: Vec<Ranked<'a>>,
    index: &HistoryIndex,
    policy: RematchPolicy,
) -> Result<Vec<Match<'a>>, PairingError> {
    let groups = partition(pool);
    let last = groups.len().saturating_sub(1);

    let (matches, carried) = groups.into_iter().enumerate().fold(
        (Vec::new(), Vec::new()),
        |(mut matches, carried), (position, group)| {
            let is_last = position == last;
            let bracket = group.admit(carried, is_last);
            let outcome = match_group(
                bracket.players,
                index,
                policy,
                Fallback::for_group(is_last, policy),
            );

            matches.extend(outcome.matches);
            let mut carried = outcome.unmatched;
            carried.extend(bracket.floated);
            (matches, carried)
        },
    );

    close_out(matches, carried, index, policy)
}

/// Pair whatever is still carried after the last group, forcing rematches if needed.
fn close_out<'a>(
    mut matches: Vec<Match<'a>>,
    mut carried: Vec<Ranked<'a>>,
    index: &HistoryIndex,
    policy: RematchPolicy,
) -> Result<Vec<Match<'a>>, PairingError> {
    carried.sort_by_key(|player| player.rank);

    let outcome = match_group(carried, index, policy, Fallback::Force);
    matches.extend(outcome.matches);

    match outcome.unmatched.first() {
        Some(stranded) => Err(PairingError::UnpairedCompetitor(stranded.id())),
        None => Ok(matches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn player(n: u128, score: f64) -> Competitor {
        Competitor::new(id(n), format!("p{n}"), score).with_seed(n as u32)
    }

    fn boards(round: &RoundPairings) -> Vec<(u32, u128, u128)> {
        round
            .pairings
            .iter()
            .map(|p| (p.board, p.white.as_u128(), p.black.as_u128()))
            .collect()
    }

    fn games(
        round: &RoundPairings,
        winner_is_white: impl Fn(&Pairing) -> bool,
    ) -> Vec<HistoryEntry> {
        round
            .pairings
            .iter()
            .map(|p| {
                let result = if winner_is_white(p) {
                    GameResult::WhiteWins
                } else {
                    GameResult::BlackWins
                };
                HistoryEntry::game(round.round, p.white, p.black, Some(result))
            })
            .collect()
    }

    #[test]
    fn round_one_pairs_top_half_against_bottom_half() {
        let field: Vec<_> = (1..=8).map(|n| player(n, 0.0)).collect();
        let round = pair_round(&field, &[], 1, RematchPolicy::Avoid).unwrap();
        assert_eq!(
            boards(&round),
            vec![(1, 1, 5), (2, 2, 6), (3, 3, 7), (4, 4, 8)]
        );
        assert!(round.bye.is_none());
    }

    #[test]
    fn odd_roster_gives_the_lowest_player_a_bye() {
        let field: Vec<_> = (1..=7).map(|n| player(n, (7 - n) as f64)).collect();
        let round = pair_round(&field, &[], 2, RematchPolicy::Avoid).unwrap();

        assert_eq!(round.pairings.len(), 3);
        let bye = round.bye.clone().expect("bye expected");
        assert_eq!(bye.bye_recipient(), Some(id(7)));
        assert_eq!(bye.round, 2);
        assert_eq!(round.new_history_entries(), vec![bye]);
        assert!(
            round
                .pairings
                .iter()
                .all(|p| p.white != id(7) && p.black != id(7))
        );
    }

    #[test]
    fn pairs_within_score_groups() {
        let field = vec![player(1, 2.0), player(2, 2.0), player(3, 1.0), player(4, 1.0)];
        let round = pair_round(&field, &[], 2, RematchPolicy::Avoid).unwrap();
        assert_eq!(boards(&round), vec![(1, 1, 2), (2, 3, 4)]);
    }

    #[test]
    fn pairing_count_is_half_the_roster() {
        for size in 0..=11u128 {
            let field: Vec<_> = (1..=size).map(|n| player(n, (n % 3) as f64)).collect();
            for round_number in [1, 2] {
                let round = pair_round(&field, &[], round_number, RematchPolicy::Avoid).unwrap();
                assert_eq!(round.pairings.len() as u128, size / 2);
                assert_eq!(round.bye.is_some(), size % 2 == 1);
                let numbers: Vec<u32> = round.pairings.iter().map(|p| p.board).collect();
                assert_eq!(numbers, (1..=round.pairings.len() as u32).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let field: Vec<_> = (1..=9).map(|n| player(n, (n % 4) as f64 / 2.0)).collect();
        let history = vec![
            HistoryEntry::game(1, id(1), id(5), Some(GameResult::Draw)),
            HistoryEntry::game(1, id(2), id(6), Some(GameResult::WhiteWins)),
            HistoryEntry::bye(1, id(9)),
        ];
        let first = pair_round(&field, &history, 2, RematchPolicy::Avoid).unwrap();
        let second = pair_round(&field, &history, 2, RematchPolicy::Avoid).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn history_is_left_untouched() {
        let field: Vec<_> = (1..=3).map(|n| player(n, 0.0)).collect();
        let history = vec![HistoryEntry::game(1, id(1), id(2), None)];
        let snapshot = history.clone();
        pair_round(&field, &history, 2, RematchPolicy::Avoid).unwrap();
        assert_eq!(history, snapshot);
    }

    #[test]
    fn rematches_are_avoided_across_a_tournament() {
        // Lower seed always wins.
        let mut field: Vec<_> = (1..=4).map(|n| player(n, 0.0)).collect();
        let mut history = Vec::new();

        let mut rounds = Vec::new();
        for round_number in 1..=3 {
            let round = pair_round(&field, &history, round_number, RematchPolicy::Avoid).unwrap();
            let played = games(&round, |p| p.white < p.black);
            for game in &played {
                let winner = match game.result {
                    Some(GameResult::WhiteWins) => game.white,
                    _ => game.black,
                };
                if let Some(competitor) = field.iter_mut().find(|c| Seat::Competitor(c.id) == winner)
                {
                    competitor.score += 1.0;
                }
            }
            history.extend(played);
            rounds.push(round);
        }

        assert_eq!(boards(&rounds[0]), vec![(1, 1, 3), (2, 2, 4)]);
        assert_eq!(boards(&rounds[1]), vec![(1, 1, 2), (2, 3, 4)]);
        // Player 1 has met everybody in its own and the next group, so it floats to the bottom.
        assert_eq!(boards(&rounds[2]), vec![(1, 4, 1), (2, 2, 3)]);

        let mut met = HashSet::new();
        for game in &history {
            let (white, black) = game.players().unwrap();
            let key = if white < black { (white, black) } else { (black, white) };
            assert!(met.insert(key), "rematch between {white} and {black}");
        }

        for competitor in &field {
            let whites = history
                .iter()
                .filter(|g| g.white == Seat::Competitor(competitor.id))
                .count() as i64;
            let blacks = history
                .iter()
                .filter(|g| g.black == Seat::Competitor(competitor.id))
                .count() as i64;
            assert!((whites - blacks).abs() <= 1, "unbalanced colours for {}", competitor.id);
        }
    }

    #[test]
    fn exhausted_last_group_forces_a_rematch() {
        let field = vec![player(1, 1.0), player(2, 1.0)];
        let history = vec![HistoryEntry::game(1, id(1), id(2), Some(GameResult::Draw))];
        let round = pair_round(&field, &history, 2, RematchPolicy::Avoid).unwrap();
        // Player 1 already had white, so player 2 takes it.
        assert_eq!(boards(&round), vec![(1, 2, 1)]);
    }

    #[test]
    fn earlier_bye_hands_white_to_the_opponent() {
        let field = vec![player(1, 1.0), player(2, 1.0)];
        let history = vec![HistoryEntry::bye(1, id(1))];
        let round = pair_round(&field, &history, 2, RematchPolicy::Avoid).unwrap();
        assert_eq!(boards(&round), vec![(1, 2, 1)]);
    }

    #[test]
    fn allowed_rematches_follow_the_standings() {
        let field = vec![player(1, 1.0), player(2, 1.0), player(3, 0.0), player(4, 0.0)];
        let history = vec![
            HistoryEntry::game(1, id(1), id(2), None),
            HistoryEntry::game(1, id(3), id(4), None),
        ];
        let round = pair_round(&field, &history, 2, RematchPolicy::Allow).unwrap();
        assert_eq!(boards(&round), vec![(1, 2, 1), (2, 4, 3)]);
    }

    #[test]
    fn rejects_round_zero_and_duplicates() {
        let field = vec![player(1, 0.0), player(1, 0.0)];
        assert_eq!(
            pair_round(&field, &[], 0, RematchPolicy::Avoid),
            Err(PairingError::InvalidRound)
        );
        assert_eq!(
            pair_round(&field, &[], 1, RematchPolicy::Avoid),
            Err(PairingError::DuplicateCompetitor(id(1)))
        );
    }

    #[test]
    fn stranded_competitor_is_reported() {
        let field = vec![player(1, 0.0)];
        let ranked = rank(&field);
        let err = close_out(Vec::new(), ranked, &HistoryIndex::default(), RematchPolicy::Avoid)
            .unwrap_err();
        assert_eq!(err, PairingError::UnpairedCompetitor(id(1)));
    }
}
