use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::TournamentStatus,
    dto::round::{PairingView, RoundDetail, RoundSummary},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build a raw event from already formatted data.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Token handed to the admin stream when it connects.
pub struct AdminHandshake {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast once a new round has been paired and persisted.
pub struct RoundCreatedEvent(pub RoundDetail);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an arbiter records or corrects a result.
pub struct ResultRecordedEvent {
    pub tournament_id: Uuid,
    pub round_number: u32,
    pub pairing: PairingView,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a round is closed.
pub struct RoundCompletedEvent {
    pub tournament_id: Uuid,
    pub round: RoundSummary,
    pub tournament_status: TournamentStatus,
}
