use super::ranking::Ranked;

/// Competitors sharing an identical score, in standings order.
#[derive(Debug)]
pub(crate) struct ScoreGroup<'a> {
    pub(crate) score: f64,
    pub(crate) members: Vec<Ranked<'a>>,
}

/// Players to pair inside one group after merging carried competitors in.
#[derive(Debug)]
pub(crate) struct Bracket<'a> {
    pub(crate) players: Vec<Ranked<'a>>,
    /// Lowest-ranked player moved down to keep the bracket even.
    pub(crate) floated: Option<Ranked<'a>>,
}

/// Split the pool into groups of exactly equal score, highest score first.
pub(crate) fn partition<'a>(mut pool: Vec<Ranked<'a>>) -> Vec<ScoreGroup<'a>> {
    pool.sort_by(|a, b| b.score().total_cmp(&a.score()).then(a.rank.cmp(&b.rank)));

    let mut groups: Vec<ScoreGroup<'a>> = Vec::new();
    for player in pool {
        match groups.last_mut() {
            Some(group) if group.score.total_cmp(&player.score()).is_eq() => {
                group.members.push(player)
            }
            _ => groups.push(ScoreGroup {
                score: player.score(),
                members: vec![player],
            }),
        }
    }
    groups
}

impl<'a> ScoreGroup<'a> {
    /// Merge competitors carried down from higher groups and apply the float-down rule.
    ///
    /// An odd bracket that is not the last one hands its lowest-ranked player
    /// to the next group.
    pub(crate) fn admit(self, carried: Vec<Ranked<'a>>, is_last: bool) -> Bracket<'a> {
        let mut players = carried;
        players.extend(self.members);
        players.sort_by_key(|player| player.rank);

        let floated = if players.len() % 2 == 1 && !is_last {
            players.pop()
        } else {
            None
        };

        Bracket { players, floated }
    }
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
            .map(|(n, score)| Competitor::new(Uuid::from_u128(n as u128 + 1), "p", *score))
            .collect()
    }

    fn ids(players: &[Ranked<'_>]) -> Vec<u128> {
        players.iter().map(|player| player.id().as_u128()).collect()
    }

    #[test]
    fn groups_by_exact_score_descending() {
        let competitors = field(&[1.0, 2.0, 1.0, 0.5, 2.0]);
        let groups = partition(rank(&competitors));
        let summary: Vec<(f64, Vec<u128>)> = groups
            .iter()
            .map(|group| (group.score, ids(&group.members)))
            .collect();
        assert_eq!(
            summary,
            vec![(2.0, vec![2, 5]), (1.0, vec![1, 3]), (0.5, vec![4])]
        );
    }

    #[test]
    fn negative_zero_shares_the_zero_group() {
        let competitors = field(&[0.0, -0.0, 1.0, 1.0]);
        let groups = partition(rank(&competitors));
        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[1].members), vec![1, 2]);
        assert_eq!(groups[1].score, 0.0);
    }

    #[test]
    fn odd_group_floats_its_lowest_ranked_member() {
        let competitors = field(&[2.0, 2.0, 2.0, 1.0]);
        let mut groups = partition(rank(&competitors)).into_iter();
        let top = groups.next().unwrap().admit(Vec::new(), false);
        assert_eq!(ids(&top.players), vec![1, 2]);
        assert_eq!(top.floated.map(|player| player.id().as_u128()), Some(3));

        let carried: Vec<_> = top.floated.into_iter().collect();
        let bottom = groups.next().unwrap().admit(carried, true);
        assert_eq!(ids(&bottom.players), vec![3, 4]);
        assert!(bottom.floated.is_none());
    }

    #[test]
    fn last_group_never_floats() {
        let competitors = field(&[1.0, 1.0, 1.0]);
        let group = partition(rank(&competitors)).into_iter().next().unwrap();
        let bracket = group.admit(Vec::new(), true);
        assert_eq!(bracket.players.len(), 3);
        assert!(bracket.floated.is_none());
    }

    #[test]
    fn carried_players_lead_the_bracket() {
        let competitors = field(&[3.0, 1.0, 1.0, 2.0]);
        let ranked = rank(&competitors);
        let leader = ranked[0];
        let mut groups = partition(ranked).into_iter().skip(2);
        let bracket = groups.next().unwrap().admit(vec![leader], true);
        assert_eq!(ids(&bracket.players), vec![1, 2, 3]);
    }
}
