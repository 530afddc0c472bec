use std::cmp::Ordering;

use uuid::Uuid;

use super::types::Competitor;

/// A competitor together with its position in the standings (0 = leader).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ranked<'a> {
    pub(crate) rank: usize,
    pub(crate) competitor: &'a Competitor,
}

impl Ranked<'_> {
    pub(crate) fn id(&self) -> Uuid {
        self.competitor.id
    }

    pub(crate) fn score(&self) -> f64 {
        unsigned_zero(self.competitor.score)
    }
}

/// Fold `-0.0` into `0.0` so `total_cmp` treats equal scores as equal.
fn unsigned_zero(value: f64) -> f64 {
    value + 0.0
}

/// Standings order: score descending, first tie-break descending, seed ascending.
///
/// A competitor lacking the tie-break (or seed) ranks after one that has it,
/// which keeps the relation a total order. Remaining ties are left to the
/// caller's stable sort.
pub fn compare_standing(a: &Competitor, b: &Competitor) -> Ordering {
    unsigned_zero(b.score)
        .total_cmp(&unsigned_zero(a.score))
        .then_with(|| match (a.tie_breaks.first(), b.tie_breaks.first()) {
            (Some(x), Some(y)) => unsigned_zero(*y).total_cmp(&unsigned_zero(*x)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| match (a.seed, b.seed) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Order competitors by current standing, preserving input order on full ties.
pub(crate) fn rank(competitors: &[Competitor]) -> Vec<Ranked<'_>> {
    let mut ordered: Vec<&Competitor> = competitors.iter().collect();
    ordered.sort_by(|a, b| compare_standing(a, b));
    ordered
        .into_iter()
        .enumerate()
        .map(|(rank, competitor)| Ranked { rank, competitor })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(n: u128, score: f64) -> Competitor {
        Competitor::new(Uuid::from_u128(n), format!("p{n}"), score)
    }

    fn order(competitors: &[Competitor]) -> Vec<u128> {
        rank(competitors)
            .iter()
            .map(|ranked| ranked.id().as_u128())
            .collect()
    }

    #[test]
    fn score_dominates() {
        let field = [player(1, 0.5), player(2, 2.0), player(3, 1.0)];
        assert_eq!(order(&field), vec![2, 3, 1]);
    }

    #[test]
    fn first_tie_break_then_seed() {
        let field = [
            player(1, 1.0).with_tie_breaks([3.0]).with_seed(4),
            player(2, 1.0).with_tie_breaks([5.0, 0.0]).with_seed(9),
            player(3, 1.0).with_tie_breaks([3.0]).with_seed(2),
        ];
        assert_eq!(order(&field), vec![2, 3, 1]);
    }

    #[test]
    fn only_the_first_tie_break_is_consulted() {
        let field = [
            player(1, 1.0).with_tie_breaks([2.0, 1.0]),
            player(2, 1.0).with_tie_breaks([2.0, 9.0]),
        ];
        assert_eq!(order(&field), vec![1, 2]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let field = [player(4, 1.0), player(2, 1.0), player(9, 1.0)];
        assert_eq!(order(&field), vec![4, 2, 9]);
    }

    #[test]
    fn negative_zero_ties_with_zero() {
        let field = [
            player(1, 0.0).with_seed(2),
            player(2, -0.0).with_tie_breaks([-0.0]).with_seed(1),
            player(3, 0.0).with_tie_breaks([0.0]).with_seed(3),
        ];
        assert_eq!(order(&field), vec![2, 3, 1]);
    }

    #[test]
    fn missing_values_rank_last() {
        let field = [
            player(1, 1.0),
            player(2, 1.0).with_tie_breaks([0.0]),
            player(3, 1.0).with_seed(1),
        ];
        assert_eq!(order(&field), vec![2, 3, 1]);
    }
}
