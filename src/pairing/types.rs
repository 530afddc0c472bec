use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Competitor snapshot handed to the engine for a single invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Stable identifier of the tournament entry.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// External platform handle (e.g. chess.com username).
    pub handle: String,
    /// Current cumulative score.
    pub score: f64,
    /// Already-resolved tie-break values, most significant first.
    #[serde(default)]
    pub tie_breaks: Vec<f64>,
    /// Optional seed number; lower seeds rank higher.
    #[serde(default)]
    pub seed: Option<u32>,
}

impl Competitor {
    /// Build a competitor with no tie-breaks or seed.
    pub fn new(id: Uuid, name: impl Into<String>, score: f64) -> Self {
        let name = name.into();
        Self {
            id,
            handle: name.clone(),
            name,
            score,
            tie_breaks: Vec::new(),
            seed: None,
        }
    }

    /// Attach tie-break values.
    pub fn with_tie_breaks(mut self, tie_breaks: impl Into<Vec<f64>>) -> Self {
        self.tie_breaks = tie_breaks.into();
        self
    }

    /// Attach a seed number.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One side of a recorded game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Seat {
    /// A competitor, by entry id.
    Competitor(Uuid),
    /// Reserved sentinel standing in for the missing opponent of a bye.
    Bye,
}

impl Seat {
    /// Identifier seated here, if this is not the bye sentinel.
    pub fn competitor(self) -> Option<Uuid> {
        match self {
            Seat::Competitor(id) => Some(id),
            Seat::Bye => None,
        }
    }
}

/// Outcome of a game, in the usual white-first notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// `1-0`.
    #[serde(rename = "1-0")]
    WhiteWins,
    /// `0-1`.
    #[serde(rename = "0-1")]
    BlackWins,
    /// `1/2-1/2`.
    #[serde(rename = "1/2-1/2")]
    Draw,
    /// Game annulled by the arbiter.
    #[serde(rename = "0-0")]
    Cancelled,
}

impl GameResult {
    /// Notation persisted by the storage layer.
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Cancelled => "0-0",
        }
    }

    /// Parse the persisted notation.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" => Some(GameResult::Draw),
            "0-0" => Some(GameResult::Cancelled),
            _ => None,
        }
    }
}

/// A game already played (or a bye already awarded) earlier in the tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Round the game belongs to.
    pub round: u32,
    /// First side; holds the recipient of a bye.
    pub white: Seat,
    /// Second side; [`Seat::Bye`] for a bye.
    pub black: Seat,
    /// Outcome, if already known.
    pub result: Option<GameResult>,
}

impl HistoryEntry {
    /// Record a game between two competitors.
    pub fn game(round: u32, white: Uuid, black: Uuid, result: Option<GameResult>) -> Self {
        Self {
            round,
            white: Seat::Competitor(white),
            black: Seat::Competitor(black),
            result,
        }
    }

    /// Record a bye, scored as a win for the competitor receiving it.
    pub fn bye(round: u32, competitor: Uuid) -> Self {
        Self {
            round,
            white: Seat::Competitor(competitor),
            black: Seat::Bye,
            result: Some(GameResult::WhiteWins),
        }
    }

    /// Competitor awarded the bye, when this entry is one.
    pub fn bye_recipient(&self) -> Option<Uuid> {
        match (self.white, self.black) {
            (Seat::Competitor(id), Seat::Bye) | (Seat::Bye, Seat::Competitor(id)) => Some(id),
            _ => None,
        }
    }

    /// Both competitors of a real game, white first.
    pub fn players(&self) -> Option<(Uuid, Uuid)> {
        Some((self.white.competitor()?, self.black.competitor()?))
    }
}

/// A board assignment produced for the round being paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// Sequential board number, starting at 1.
    pub board: u32,
    /// Competitor taking the first side.
    pub white: Uuid,
    /// Competitor taking the second side.
    pub black: Uuid,
}

/// Whether a previous opponent may be drawn again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RematchPolicy {
    /// Previous opponents are only paired again when nothing else works.
    #[default]
    Avoid,
    /// Previous meetings are ignored.
    Allow,
}

impl RematchPolicy {
    /// Convert the boolean flag used by configuration and requests.
    pub fn from_flag(allow: bool) -> Self {
        if allow {
            RematchPolicy::Allow
        } else {
            RematchPolicy::Avoid
        }
    }

    /// True for [`RematchPolicy::Allow`].
    pub fn allows_rematch(self) -> bool {
        matches!(self, RematchPolicy::Allow)
    }
}

/// Everything the engine decided for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPairings {
    /// Round number that was paired.
    pub round: u32,
    /// Boards in the order the matches were formed.
    pub pairings: Vec<Pairing>,
    /// Synthetic entry for the competitor sitting out, when the roster was odd.
    pub bye: Option<HistoryEntry>,
}

impl RoundPairings {
    /// History entries the caller must persist alongside the pairings.
    pub fn new_history_entries(&self) -> Vec<HistoryEntry> {
        self.bye.iter().cloned().collect()
    }
}
