//! Service helpers exposing read-only public projections of tournaments.

use uuid::Uuid;

use crate::{
    dto::{
        round::{RoundDetail, pairing_views},
        tournament::{TournamentDetail, TournamentSummary},
    },
    error::ServiceError,
    services::tournament_service::{self, load_tournament},
    state::SharedState,
};

pub async fn list_tournaments(
    state: &SharedState,
) -> Result<Vec<TournamentSummary>, ServiceError> {
    tournament_service::list_tournaments(state).await
}

/// Standings and round list of one tournament.
pub async fn get_tournament(
    state: &SharedState,
    id: Uuid,
) -> Result<TournamentDetail, ServiceError> {
    tournament_service::tournament_detail(state, id).await
}

/// Boards of a round, resolved to player names; the empty side of a bye reads `BYE`.
pub async fn get_round(
    state: &SharedState,
    tournament_id: Uuid,
    round_number: u32,
) -> Result<RoundDetail, ServiceError> {
    let store = state.require_store().await?;
    load_tournament(&store, tournament_id).await?;

    let round = store
        .list_rounds(tournament_id)
        .await?
        .into_iter()
        .find(|round| round.round_number == round_number)
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "round {round_number} not found in tournament `{tournament_id}`"
            ))
        })?;

    let matches = store.list_round_matches(round.id).await?;
    let entries = store.list_entries(tournament_id).await?;
    Ok(RoundDetail {
        tournament_id,
        round: (&round).into(),
        pairings: pairing_views(&matches, &entries),
    })
}
