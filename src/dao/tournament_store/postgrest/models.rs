use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::{
        models::{
            EntryEntity, EntryStatus, EntryWithParticipantEntity, MatchEntity, MatchHistoryEntity,
            ParticipantEntity, ParticipantStatus, RoundEntity, RoundStatus, TournamentEntity,
            TournamentStatus,
        },
        relation,
    },
    pairing::GameResult,
};

use super::error::{PostgrestError, PostgrestResult};

pub const TOURNAMENTS: &str = "tournaments";
pub const PARTICIPANTS: &str = "participants";
pub const ENTRIES: &str = "tournament_participants";
pub const ROUNDS: &str = "rounds";
pub const PAIRINGS: &str = "pairings";

/// Embed the participant row into each entry row.
pub const ENTRY_SELECT: &str = "*,participant:participants(*)";
/// Embed the parent round so history can be filtered by tournament.
pub const HISTORY_SELECT: &str = "*,round:rounds!inner(round_number,tournament_id)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentRow {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub registration_deadline: Option<String>,
    pub status: TournamentStatus,
    pub total_rounds: u32,
    pub time_control: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<TournamentEntity> for TournamentRow {
    fn from(value: TournamentEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: Some(value.description),
            start_date: value.start_date,
            end_date: value.end_date,
            registration_deadline: value.registration_deadline,
            status: value.status,
            total_rounds: value.total_rounds,
            time_control: value.time_control,
            created_at: value.created_at.into(),
            updated_at: value.updated_at.into(),
        }
    }
}

impl From<TournamentRow> for TournamentEntity {
    fn from(value: TournamentRow) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description.unwrap_or_default(),
            start_date: value.start_date,
            end_date: value.end_date,
            registration_deadline: value.registration_deadline,
            status: value.status,
            total_rounds: value.total_rounds,
            time_control: value.time_control,
            created_at: value.created_at.into(),
            updated_at: value.updated_at.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub id: Uuid,
    pub name: String,
    pub discord_username: String,
    pub chesscom_username: String,
    pub status: ParticipantStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ParticipantEntity> for ParticipantRow {
    fn from(value: ParticipantEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            discord_username: value.discord_username,
            chesscom_username: value.chesscom_username,
            status: value.status,
            created_at: value.created_at.into(),
        }
    }
}

impl From<ParticipantRow> for ParticipantEntity {
    fn from(value: ParticipantRow) -> Self {
        Self {
            id: value.id,
            name: value.name,
            discord_username: value.discord_username,
            chesscom_username: value.chesscom_username,
            status: value.status,
            created_at: value.created_at.into(),
        }
    }
}

/// Row of `tournament_participants`, optionally carrying its embedded participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub participant_id: Uuid,
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub tiebreak_1: Option<f64>,
    #[serde(default)]
    pub tiebreak_2: Option<f64>,
    pub status: EntryStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "relation::single"
    )]
    pub participant: Option<ParticipantRow>,
}

impl From<EntryEntity> for EntryRow {
    fn from(value: EntryEntity) -> Self {
        Self {
            id: value.id,
            tournament_id: value.tournament_id,
            participant_id: value.participant_id,
            seed: value.seed,
            score: Some(value.score),
            tiebreak_1: Some(value.tiebreak_1),
            tiebreak_2: Some(value.tiebreak_2),
            status: value.status,
            created_at: value.created_at.into(),
            participant: None,
        }
    }
}

impl EntryRow {
    /// Split the row into the entry and its embedded participant, which must be present.
    pub fn into_joined(self) -> PostgrestResult<EntryWithParticipantEntity> {
        let participant = self.participant.ok_or_else(|| PostgrestError::InvalidRow {
            table: ENTRIES,
            id: self.id.to_string(),
            reason: format!("participant {} is missing", self.participant_id),
        })?;

        Ok(EntryWithParticipantEntity {
            entry: EntryEntity {
                id: self.id,
                tournament_id: self.tournament_id,
                participant_id: self.participant_id,
                seed: self.seed,
                score: self.score.unwrap_or_default(),
                tiebreak_1: self.tiebreak_1.unwrap_or_default(),
                tiebreak_2: self.tiebreak_2.unwrap_or_default(),
                status: self.status,
                created_at: self.created_at.into(),
            },
            participant: participant.into(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round_number: u32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub status: RoundStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<RoundEntity> for RoundRow {
    fn from(value: RoundEntity) -> Self {
        Self {
            id: value.id,
            tournament_id: value.tournament_id,
            round_number: value.round_number,
            start_time: Some(value.start_time.into()),
            end_time: value.end_time.map(Into::into),
            status: value.status,
            created_at: value.start_time.into(),
        }
    }
}

impl From<RoundRow> for RoundEntity {
    fn from(value: RoundRow) -> Self {
        Self {
            id: value.id,
            tournament_id: value.tournament_id,
            round_number: value.round_number,
            start_time: value.start_time.unwrap_or(value.created_at).into(),
            end_time: value.end_time.map(Into::into),
            status: value.status,
        }
    }
}

/// Round columns embedded into a pairing row when reading history.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundRef {
    pub round_number: u32,
    pub tournament_id: Uuid,
}

/// Row of `pairings`. The result is stored as free text and validated on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingRow {
    pub id: Uuid,
    pub round_id: Uuid,
    #[serde(default)]
    pub white_id: Option<Uuid>,
    #[serde(default)]
    pub black_id: Option<Uuid>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub board_number: Option<u32>,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "relation::single"
    )]
    pub round: Option<RoundRef>,
}

impl From<MatchEntity> for PairingRow {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            round_id: value.round_id,
            white_id: value.white_id,
            black_id: value.black_id,
            result: value.result.map(|result| result.as_str().to_owned()),
            board_number: Some(value.board_number),
            round: None,
        }
    }
}

impl PairingRow {
    pub fn into_entity(self) -> PostgrestResult<MatchEntity> {
        let result = match self.result.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(GameResult::parse(raw).ok_or_else(|| PostgrestError::InvalidRow {
                table: PAIRINGS,
                id: self.id.to_string(),
                reason: format!("unknown result `{raw}`"),
            })?),
        };

        Ok(MatchEntity {
            id: self.id,
            round_id: self.round_id,
            white_id: self.white_id,
            black_id: self.black_id,
            result,
            board_number: self.board_number.unwrap_or_default(),
        })
    }

    /// Convert a row read with [`HISTORY_SELECT`]; the embedded round must be present.
    pub fn into_history(mut self) -> PostgrestResult<MatchHistoryEntity> {
        let round = self.round.take().ok_or_else(|| PostgrestError::InvalidRow {
            table: PAIRINGS,
            id: self.id.to_string(),
            reason: format!("round {} is missing", self.round_id),
        })?;

        Ok(MatchHistoryEntity {
            record: self.into_entity()?,
            round_number: round.round_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dao::storage::StorageError;

    fn participant_json(id: Uuid) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Magnus",
            "discord_username": "magnus#0001",
            "chesscom_username": "DrNykterstein",
            "status": "approved",
            "created_at": "2024-03-01T18:30:00.123456+00:00",
        })
    }

    fn entry_json(participant: serde_json::Value) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "tournament_id": Uuid::new_v4(),
            "participant_id": Uuid::new_v4(),
            "seed": null,
            "score": 2.5,
            "tiebreak_1": null,
            "tiebreak_2": 4.0,
            "status": "active",
            "created_at": "2024-03-02T09:00:00+00:00",
            "participant": participant,
        })
    }

    #[test]
    fn embedded_participant_decodes_from_object_or_array() {
        let id = Uuid::new_v4();
        for embedded in [participant_json(id), json!([participant_json(id)])] {
            let row: EntryRow = serde_json::from_value(entry_json(embedded)).unwrap();
            let joined = row.into_joined().unwrap();
            assert_eq!(joined.participant.id, id);
            assert_eq!(joined.participant.chesscom_username, "DrNykterstein");
            assert_eq!(joined.entry.score, 2.5);
            assert_eq!(joined.entry.tiebreak_1, 0.0);
        }
    }

    #[test]
    fn entry_without_participant_is_rejected() {
        let row: EntryRow = serde_json::from_value(entry_json(json!(null))).unwrap();
        let err = row.into_joined().unwrap_err();
        assert!(matches!(
            StorageError::from(err),
            StorageError::InvalidRecord(_)
        ));
    }

    #[test]
    fn history_rows_carry_round_number_and_result() {
        let white = Uuid::new_v4();
        let row: PairingRow = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "round_id": Uuid::new_v4(),
            "white_id": white,
            "black_id": null,
            "result": "1-0",
            "board_number": 4,
            "created_at": "2024-03-02T09:00:00+00:00",
            "round": [{ "round_number": 2, "tournament_id": Uuid::new_v4() }],
        }))
        .unwrap();

        let history = row.into_history().unwrap();
        assert_eq!(history.round_number, 2);
        assert_eq!(history.record.result, Some(GameResult::WhiteWins));
        assert!(history.record.is_bye());
        let entry = history.to_history_entry().unwrap();
        assert_eq!(entry.bye_recipient(), Some(white));
    }

    #[test]
    fn unknown_result_notation_is_an_invalid_row() {
        let row: PairingRow = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "round_id": Uuid::new_v4(),
            "white_id": Uuid::new_v4(),
            "black_id": Uuid::new_v4(),
            "result": "1-1",
        }))
        .unwrap();
        assert!(matches!(
            row.into_entity(),
            Err(PostgrestError::InvalidRow { .. })
        ));
    }

    #[test]
    fn pairing_rows_serialize_without_embedded_round() {
        let record = MatchEntity {
            id: Uuid::new_v4(),
            round_id: Uuid::new_v4(),
            white_id: Some(Uuid::new_v4()),
            black_id: None,
            result: Some(GameResult::Draw),
            board_number: 3,
        };
        let value = serde_json::to_value(PairingRow::from(record)).unwrap();
        assert_eq!(value["result"], "1/2-1/2");
        assert!(value.get("round").is_none());
    }
}
