use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::types::HistoryEntry;

/// Lookup tables derived once from the tournament history.
///
/// Only point lookups are performed against these tables, never iteration, so
/// hash ordering cannot leak into the engine output.
#[derive(Debug, Default)]
pub(crate) struct HistoryIndex {
    met: HashSet<(Uuid, Uuid)>,
    byes: HashSet<Uuid>,
    white_games: HashMap<Uuid, u32>,
}

impl HistoryIndex {
    pub(crate) fn new(history: &[HistoryEntry]) -> Self {
        let mut index = Self::default();
        for entry in history {
            if let Some(id) = entry.bye_recipient() {
                index.byes.insert(id);
                *index.white_games.entry(id).or_insert(0) += 1;
                continue;
            }
            if let Some((white, black)) = entry.players() {
                index.met.insert(unordered(white, black));
                *index.white_games.entry(white).or_insert(0) += 1;
            }
        }
        index
    }

    /// True when the two competitors already faced each other, in either colour.
    pub(crate) fn have_met(&self, a: Uuid, b: Uuid) -> bool {
        self.met.contains(&unordered(a, b))
    }

    pub(crate) fn had_bye(&self, id: Uuid) -> bool {
        self.byes.contains(&id)
    }

    /// Times the competitor sat on the first side, byes included.
    pub(crate) fn white_games(&self, id: Uuid) -> u32 {
        self.white_games.get(&id).copied().unwrap_or(0)
    }
}

fn unordered(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::types::GameResult;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn meetings_are_symmetric() {
        let index = HistoryIndex::new(&[HistoryEntry::game(1, id(1), id(2), None)]);
        assert!(index.have_met(id(1), id(2)));
        assert!(index.have_met(id(2), id(1)));
        assert!(!index.have_met(id(1), id(3)));
    }

    #[test]
    fn byes_count_as_first_side_games() {
        let index = HistoryIndex::new(&[
            HistoryEntry::bye(1, id(7)),
            HistoryEntry::game(2, id(7), id(1), Some(GameResult::Draw)),
        ]);
        assert!(index.had_bye(id(7)));
        assert!(!index.had_bye(id(1)));
        assert!(!index.have_met(id(7), Uuid::nil()));
        assert_eq!(index.white_games(id(7)), 2);
        assert_eq!(index.white_games(id(1)), 0);
    }
}
