use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pairing::{Competitor, GameResult, HistoryEntry, Seat};

/// Lifecycle of a tournament.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// No round paired yet.
    Upcoming,
    /// At least one round paired.
    Active,
    /// Last round closed.
    Completed,
}

/// Review state of a registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    /// Awaiting admin review.
    Pending,
    /// May be entered into tournaments.
    Approved,
    /// Turned down by an admin.
    Rejected,
}

/// Whether an entry still takes part in upcoming rounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Paired in upcoming rounds.
    Active,
    /// Left out of every later round.
    Withdrawn,
}

/// Lifecycle of a round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Paired, results being entered.
    Active,
    /// Closed; results are frozen.
    Completed,
}

/// Tournament definition persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentEntity {
    /// Primary key of the tournament.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Organiser notes; empty when none were given.
    pub description: String,
    /// Calendar dates as entered by the organiser (ISO-8601).
    pub start_date: Option<String>,
    /// Last playing day.
    pub end_date: Option<String>,
    /// Registrations close at this date.
    pub registration_deadline: Option<String>,
    /// Current lifecycle state.
    pub status: TournamentStatus,
    /// Number of rounds scheduled.
    pub total_rounds: u32,
    /// Free-form time control (e.g. "10+5").
    pub time_control: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last status change.
    pub updated_at: SystemTime,
}

/// Person who registered to play, independent of any tournament.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantEntity {
    /// Primary key of the participant.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Discord handle used to reach the player.
    pub discord_username: String,
    /// chess.com account, unique across participants.
    pub chesscom_username: String,
    /// Review state.
    pub status: ParticipantStatus,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

/// Participation of a registered player in one tournament, with their standing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryEntity {
    /// Identifier used by pairings to refer to this player.
    pub id: Uuid,
    /// Tournament entered.
    pub tournament_id: Uuid,
    /// Participant entered.
    pub participant_id: Uuid,
    /// Seed number; lower seeds rank higher on equal points.
    pub seed: Option<u32>,
    /// Score and tie-breaks are supplied by the standings aggregation.
    pub score: f64,
    /// Buchholz.
    pub tiebreak_1: f64,
    /// Sonneborn-Berger.
    pub tiebreak_2: f64,
    /// Whether the entry is still paired.
    pub status: EntryStatus,
    /// When the entry was added; breaks full standings ties.
    pub created_at: SystemTime,
}

/// Entry joined with the participant it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryWithParticipantEntity {
    /// The tournament entry.
    pub entry: EntryEntity,
    /// Registration the entry refers to.
    pub participant: ParticipantEntity,
}

/// A round of a tournament.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundEntity {
    /// Primary key of the round.
    pub id: Uuid,
    /// Tournament the round belongs to.
    pub tournament_id: Uuid,
    /// Round number, starting at 1.
    pub round_number: u32,
    /// When the round was paired.
    pub start_time: SystemTime,
    /// When the round was closed.
    pub end_time: Option<SystemTime>,
    /// Current lifecycle state.
    pub status: RoundStatus,
}

/// A board of a round. A missing side is the bye.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Round the match belongs to.
    pub round_id: Uuid,
    /// Entry playing white; holds the recipient of a bye.
    pub white_id: Option<Uuid>,
    /// Entry playing black; `None` for a bye.
    pub black_id: Option<Uuid>,
    /// Result, once recorded.
    pub result: Option<GameResult>,
    /// Board number within the round, starting at 1.
    pub board_number: u32,
}

impl MatchEntity {
    /// True when one side is empty.
    pub fn is_bye(&self) -> bool {
        self.white_id.is_none() || self.black_id.is_none()
    }
}

/// Match joined with the number of the round it was played in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHistoryEntity {
    /// The stored match.
    pub record: MatchEntity,
    /// Number of the round the match belongs to.
    pub round_number: u32,
}

impl MatchHistoryEntity {
    /// Convert into the engine's history shape; rows with no player at all are skipped.
    pub fn to_history_entry(&self) -> Option<HistoryEntry> {
        let seat = |side: Option<Uuid>| side.map(Seat::Competitor).unwrap_or(Seat::Bye);
        let white = seat(self.record.white_id);
        let black = seat(self.record.black_id);
        if white == Seat::Bye && black == Seat::Bye {
            return None;
        }
        Some(HistoryEntry {
            round: self.round_number,
            white,
            black,
            result: self.record.result,
        })
    }
}

impl From<&EntryWithParticipantEntity> for Competitor {
    fn from(value: &EntryWithParticipantEntity) -> Self {
        Self {
            id: value.entry.id,
            name: value.participant.name.clone(),
            handle: value.participant.chesscom_username.clone(),
            score: value.entry.score,
            tie_breaks: vec![value.entry.tiebreak_1, value.entry.tiebreak_2],
            seed: value.entry.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(white: Option<Uuid>, black: Option<Uuid>) -> MatchHistoryEntity {
        MatchHistoryEntity {
            record: MatchEntity {
                id: Uuid::new_v4(),
                round_id: Uuid::new_v4(),
                white_id: white,
                black_id: black,
                result: Some(GameResult::WhiteWins),
                board_number: 1,
            },
            round_number: 3,
        }
    }

    #[test]
    fn bye_rows_become_bye_entries() {
        let player = Uuid::new_v4();
        let entry = record(Some(player), None).to_history_entry().unwrap();
        assert_eq!(entry.bye_recipient(), Some(player));
        assert_eq!(entry.round, 3);
    }

    #[test]
    fn empty_rows_are_skipped() {
        assert!(record(None, None).to_history_entry().is_none());
    }
}
