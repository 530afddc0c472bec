//! DTO definitions for rounds, boards and results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        EntryWithParticipantEntity, MatchEntity, RoundEntity, RoundStatus, TournamentStatus,
    },
    dto::{format_system_time, validation::validate_result_notation},
};

/// Label shown on the empty side of a bye.
pub const BYE_LABEL: &str = "BYE";

/// Options for pairing the next round. Send `{}` to use the configured defaults.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateRoundRequest {
    /// Overrides the configured rematch policy for this round only.
    #[serde(default)]
    pub allow_rematches: Option<bool>,
}

/// Result entered by an arbiter for one board.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RecordResultRequest {
    /// White-first notation: `1-0`, `0-1`, `1/2-1/2` or `0-0`.
    #[validate(custom(function = "validate_result_notation"))]
    pub result: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundSummary {
    pub id: Uuid,
    pub round_number: u32,
    pub status: RoundStatus,
    pub start_time: String,
    pub end_time: Option<String>,
}

impl From<&RoundEntity> for RoundSummary {
    fn from(value: &RoundEntity) -> Self {
        Self {
            id: value.id,
            round_number: value.round_number,
            status: value.status,
            start_time: format_system_time(value.start_time),
            end_time: value.end_time.map(format_system_time),
        }
    }
}

/// One side of a board, resolved to the player's names.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SeatView {
    /// Entry seated here; absent for the bye.
    pub entry_id: Option<Uuid>,
    pub name: String,
    pub chesscom_username: Option<String>,
}

impl SeatView {
    fn bye() -> Self {
        Self {
            entry_id: None,
            name: BYE_LABEL.to_string(),
            chesscom_username: None,
        }
    }

    fn resolve(
        entry_id: Option<Uuid>,
        roster: &HashMap<Uuid, &EntryWithParticipantEntity>,
    ) -> Self {
        let Some(id) = entry_id else {
            return Self::bye();
        };
        match roster.get(&id) {
            Some(entry) => Self {
                entry_id: Some(id),
                name: entry.participant.name.clone(),
                chesscom_username: Some(entry.participant.chesscom_username.clone()),
            },
            None => Self {
                entry_id: Some(id),
                name: id.to_string(),
                chesscom_username: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PairingView {
    pub match_id: Uuid,
    pub board_number: u32,
    pub white: SeatView,
    pub black: SeatView,
    pub result: Option<String>,
    pub is_bye: bool,
}

impl PairingView {
    pub fn new(
        record: &MatchEntity,
        roster: &HashMap<Uuid, &EntryWithParticipantEntity>,
    ) -> Self {
        Self {
            match_id: record.id,
            board_number: record.board_number,
            white: SeatView::resolve(record.white_id, roster),
            black: SeatView::resolve(record.black_id, roster),
            result: record.result.map(|result| result.as_str().to_string()),
            is_bye: record.is_bye(),
        }
    }
}

/// Resolve every board of a round against the tournament roster.
pub fn pairing_views(
    matches: &[MatchEntity],
    entries: &[EntryWithParticipantEntity],
) -> Vec<PairingView> {
    let roster = entries
        .iter()
        .map(|entry| (entry.entry.id, entry))
        .collect::<HashMap<_, _>>();
    matches
        .iter()
        .map(|record| PairingView::new(record, &roster))
        .collect()
}

/// A round with its boards.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundDetail {
    pub tournament_id: Uuid,
    pub round: RoundSummary,
    pub pairings: Vec<PairingView>,
}

/// Outcome of closing a round.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteRoundResponse {
    pub round: RoundSummary,
    pub tournament_status: TournamentStatus,
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::{
        dao::models::{EntryEntity, EntryStatus, ParticipantEntity, ParticipantStatus},
        pairing::GameResult,
    };

    fn entry(name: &str) -> EntryWithParticipantEntity {
        let participant_id = Uuid::new_v4();
        EntryWithParticipantEntity {
            entry: EntryEntity {
                id: Uuid::new_v4(),
                tournament_id: Uuid::nil(),
                participant_id,
                seed: None,
                score: 0.0,
                tiebreak_1: 0.0,
                tiebreak_2: 0.0,
                status: EntryStatus::Active,
                created_at: SystemTime::now(),
            },
            participant: ParticipantEntity {
                id: participant_id,
                name: name.to_string(),
                discord_username: format!("{name}#1"),
                chesscom_username: name.to_lowercase(),
                status: ParticipantStatus::Approved,
                created_at: SystemTime::now(),
            },
        }
    }

    #[test]
    fn bye_side_is_labelled() {
        let anna = entry("Anna");
        let record = MatchEntity {
            id: Uuid::new_v4(),
            round_id: Uuid::new_v4(),
            white_id: Some(anna.entry.id),
            black_id: None,
            result: Some(GameResult::WhiteWins),
            board_number: 3,
        };

        let views = pairing_views(&[record], &[anna]);
        assert_eq!(views[0].white.name, "Anna");
        assert_eq!(views[0].white.chesscom_username.as_deref(), Some("anna"));
        assert_eq!(views[0].black.name, BYE_LABEL);
        assert!(views[0].black.entry_id.is_none());
        assert_eq!(views[0].result.as_deref(), Some("1-0"));
        assert!(views[0].is_bye);
    }
}
