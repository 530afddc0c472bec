use tracing::debug;

use super::{history::HistoryIndex, ranking::Ranked, types::HistoryEntry};

/// Pool left to pair once the bye (if any) has been taken out.
#[derive(Debug)]
pub(crate) struct ByeResolution<'a> {
    pub(crate) pool: Vec<Ranked<'a>>,
    pub(crate) bye: Option<HistoryEntry>,
}

/// Remove one competitor from an odd roster and record the bye they receive.
///
/// The lowest-scoring competitor who never had a bye sits out; among equal
/// scores the lowest-ranked one is chosen. Once everybody had a bye, the
/// lowest-scoring competitor overall sits out again.
pub(crate) fn resolve_bye<'a>(
    ranked: Vec<Ranked<'a>>,
    history: &HistoryIndex,
    round: u32,
) -> ByeResolution<'a> {
    if ranked.len() % 2 == 0 {
        return ByeResolution {
            pool: ranked,
            bye: None,
        };
    }

    let position = lowest(&ranked, |candidate| !history.had_bye(candidate.id()))
        .or_else(|| lowest(&ranked, |_| true));

    let Some(position) = position else {
        return ByeResolution {
            pool: ranked,
            bye: None,
        };
    };

    let mut pool = ranked;
    let recipient = pool.remove(position);
    debug!(
        competitor = %recipient.id(),
        score = recipient.score(),
        repeated = history.had_bye(recipient.id()),
        "bye assigned"
    );

    ByeResolution {
        pool,
        bye: Some(HistoryEntry::bye(round, recipient.id())),
    }
}

/// Index of the lowest-scoring eligible competitor, preferring the lowest rank on ties.
fn lowest(ranked: &[Ranked<'_>], eligible: impl Fn(&Ranked<'_>) -> bool) -> Option<usize> {
    ranked
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, candidate)| eligible(*candidate))
        .min_by(|(_, a), (_, b)| a.score().total_cmp(&b.score()))
        .map(|(position, _)| position)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::pairing::{ranking::rank, types::Competitor};

    fn field(scores: &[f64]) -> Vec<Competitor> {
        scores
            .iter()
            .enumerate()
            .map(|(n, score)| {
                Competitor::new(Uuid::from_u128(n as u128 + 1), format!("p{n}"), *score)
            })
            .collect()
    }

    fn recipient(resolution: &ByeResolution<'_>) -> u128 {
        resolution
            .bye
            .as_ref()
            .and_then(HistoryEntry::bye_recipient)
            .map(|id| id.as_u128())
            .expect("bye expected")
    }

    #[test]
    fn even_roster_has_no_bye() {
        let competitors = field(&[1.0, 0.0]);
        let resolution = resolve_bye(rank(&competitors), &HistoryIndex::default(), 2);
        assert!(resolution.bye.is_none());
        assert_eq!(resolution.pool.len(), 2);
    }

    #[test]
    fn lowest_ranked_of_the_lowest_score_sits_out() {
        let competitors = field(&[2.0, 0.0, 1.0, 0.0, 1.0]);
        let resolution = resolve_bye(rank(&competitors), &HistoryIndex::default(), 3);
        // Players 2 and 4 share the lowest score; 4 ranks below 2.
        assert_eq!(recipient(&resolution), 4);
        assert_eq!(resolution.pool.len(), 4);
        assert_eq!(resolution.bye.as_ref().map(|entry| entry.round), Some(3));
    }

    #[test]
    fn previous_bye_recipients_are_skipped() {
        let competitors = field(&[2.0, 1.0, 0.0]);
        let history = HistoryIndex::new(&[HistoryEntry::bye(1, Uuid::from_u128(3))]);
        let resolution = resolve_bye(rank(&competitors), &history, 2);
        assert_eq!(recipient(&resolution), 2);
    }

    #[test]
    fn exhausted_pool_falls_back_to_lowest_score() {
        let competitors = field(&[2.0, 1.0, 0.0]);
        let history = HistoryIndex::new(&[
            HistoryEntry::bye(1, Uuid::from_u128(1)),
            HistoryEntry::bye(2, Uuid::from_u128(2)),
            HistoryEntry::bye(3, Uuid::from_u128(3)),
        ]);
        let resolution = resolve_bye(rank(&competitors), &history, 4);
        assert_eq!(recipient(&resolution), 3);
    }

    #[test]
    fn bye_is_recorded_as_a_win() {
        let competitors = field(&[0.0]);
        let resolution = resolve_bye(rank(&competitors), &HistoryIndex::default(), 1);
        let entry = resolution.bye.expect("bye expected");
        assert_eq!(entry.result, Some(crate::pairing::types::GameResult::WhiteWins));
        assert!(resolution.pool.is_empty());
    }
}
