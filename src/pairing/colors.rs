use uuid::Uuid;

use super::{history::HistoryIndex, matcher::Match, types::Pairing};

/// Number the boards in formation order and seat each match.
pub(crate) fn assign_boards(matches: &[Match<'_>], history: &HistoryIndex) -> Vec<Pairing> {
    matches
        .iter()
        .zip(1..)
        .map(|(m, board)| {
            let (white, black) = seat(m.anchor.id(), m.opponent.id(), history);
            Pairing {
                board,
                white,
                black,
            }
        })
        .collect()
}

/// White goes to whoever played white strictly less often; the anchor wins ties.
fn seat(anchor: Uuid, opponent: Uuid, history: &HistoryIndex) -> (Uuid, Uuid) {
    if history.white_games(opponent) < history.white_games(anchor) {
        (opponent, anchor)
    } else {
        (anchor, opponent)
    }
}
