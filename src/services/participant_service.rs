//! Registration and review of participants.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{ParticipantEntity, ParticipantStatus},
    dto::participant::{ParticipantSummary, RegisterParticipantRequest},
    error::ServiceError,
    state::SharedState,
};

/// Record a registration awaiting review.
///
/// chess.com usernames are unique (case-insensitive) across registrations.
pub async fn register(
    state: &SharedState,
    request: RegisterParticipantRequest,
) -> Result<ParticipantSummary, ServiceError> {
    let store = state.require_store().await?;
    let name = request.name.trim().to_owned();
    let discord_username = request.discord_username.trim().to_owned();
    let chesscom_username = request.chesscom_username.trim().to_owned();
    if name.is_empty() || discord_username.is_empty() {
        return Err(ServiceError::InvalidInput(
            "name and discord username must not be blank".into(),
        ));
    }

    let taken = store
        .list_participants()
        .await?
        .iter()
        .any(|existing| existing.chesscom_username.eq_ignore_ascii_case(&chesscom_username));
    if taken {
        return Err(ServiceError::InvalidInput(format!(
            "chess.com username `{chesscom_username}` is already registered"
        )));
    }

    let participant = ParticipantEntity {
        id: Uuid::new_v4(),
        name,
        discord_username,
        chesscom_username,
        status: ParticipantStatus::Pending,
        created_at: SystemTime::now(),
    };
    store.save_participant(participant.clone()).await?;
    info!(participant_id = %participant.id, "participant registered");
    Ok((&participant).into())
}

pub async fn list_participants(
    state: &SharedState,
) -> Result<Vec<ParticipantSummary>, ServiceError> {
    let store = state.require_store().await?;
    let participants = store.list_participants().await?;
    Ok(participants.iter().map(ParticipantSummary::from).collect())
}

/// Approve or reject a registration.
pub async fn review(
    state: &SharedState,
    id: Uuid,
    status: ParticipantStatus,
) -> Result<ParticipantSummary, ServiceError> {
    if status == ParticipantStatus::Pending {
        return Err(ServiceError::InvalidInput(
            "a registration can only be approved or rejected".into(),
        ));
    }

    let store = state.require_store().await?;
    let mut participant = store
        .find_participant(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("participant `{id}` not found")))?;
    participant.status = status;
    store.save_participant(participant.clone()).await?;
    info!(participant_id = %id, status = ?status, "participant reviewed");
    Ok((&participant).into())
}
