//! DTO definitions for tournament administration and standings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        EntryStatus, EntryWithParticipantEntity, TournamentEntity, TournamentStatus,
    },
    dto::{format_system_time, round::RoundSummary, validation::validate_schedule_time},
};

/// Payload used to create a tournament.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTournamentRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_schedule_time"))]
    pub start_date: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_schedule_time"))]
    pub end_date: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_schedule_time"))]
    pub registration_deadline: Option<String>,
    #[validate(range(min = 1, max = 99))]
    pub total_rounds: u32,
    /// Free-form time control such as `10+5`.
    #[validate(length(min = 1, max = 32))]
    pub time_control: String,
}

/// Tournament metadata as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TournamentSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
    pub status: TournamentStatus,
    pub total_rounds: u32,
    pub time_control: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&TournamentEntity> for TournamentSummary {
    fn from(value: &TournamentEntity) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            description: value.description.clone(),
            start_date: value.start_date.clone(),
            end_date: value.end_date.clone(),
            registration_deadline: value.registration_deadline.clone(),
            status: value.status,
            total_rounds: value.total_rounds,
            time_control: value.time_control.clone(),
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// One line of the standings table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingView {
    /// Position in the standings, starting at 1.
    pub rank: u32,
    pub entry_id: Uuid,
    pub participant_id: Uuid,
    pub name: String,
    pub chesscom_username: String,
    pub seed: Option<u32>,
    pub score: f64,
    /// Buchholz.
    pub tiebreak_1: f64,
    /// Sonneborn-Berger.
    pub tiebreak_2: f64,
    pub status: EntryStatus,
}

impl StandingView {
    pub fn new(rank: u32, value: &EntryWithParticipantEntity) -> Self {
        Self {
            rank,
            entry_id: value.entry.id,
            participant_id: value.participant.id,
            name: value.participant.name.clone(),
            chesscom_username: value.participant.chesscom_username.clone(),
            seed: value.entry.seed,
            score: value.entry.score,
            tiebreak_1: value.entry.tiebreak_1,
            tiebreak_2: value.entry.tiebreak_2,
            status: value.entry.status,
        }
    }
}

/// Tournament with its standings and rounds.
#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentDetail {
    pub tournament: TournamentSummary,
    pub standings: Vec<StandingView>,
    pub rounds: Vec<RoundSummary>,
}

/// Registered participant to enter into a tournament.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct EntryInput {
    pub participant_id: Uuid,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub seed: Option<u32>,
}

/// Request adding approved participants to a tournament.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddEntriesRequest {
    #[validate(length(min = 1), nested)]
    pub entries: Vec<EntryInput>,
}

/// Standing values supplied by the external standings aggregation.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateStandingRequest {
    #[validate(range(min = 0.0))]
    pub score: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub tiebreak_1: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub tiebreak_2: f64,
    /// If not specified, keeps the current seed. If null, clears it.
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub seed: Option<Option<u32>>,
}
