use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        participant::{ParticipantSummary, RegisterParticipantRequest},
        round::RoundDetail,
        tournament::{TournamentDetail, TournamentSummary},
    },
    error::AppError,
    services::{participant_service, public_service},
    state::SharedState,
};

/// Read-only tournament views and the registration form.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/participants", post(register_participant))
        .route("/public/tournaments", get(list_tournaments))
        .route("/public/tournaments/{id}", get(get_tournament))
        .route(
            "/public/tournaments/{id}/rounds/{round}",
            get(get_round),
        )
}

/// Register to play; the registration stays pending until an admin reviews it.
#[utoipa::path(
    post,
    path = "/participants",
    tag = "public",
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "Registration recorded", body = ParticipantSummary),
        (status = 400, description = "Invalid or duplicate registration")
    )
)]
pub async fn register_participant(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RegisterParticipantRequest>>,
) -> Result<(StatusCode, Json<ParticipantSummary>), AppError> {
    let summary = participant_service::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

#[utoipa::path(
    get,
    path = "/public/tournaments",
    tag = "public",
    responses((status = 200, description = "Tournaments", body = [TournamentSummary]))
)]
pub async fn list_tournaments(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TournamentSummary>>, AppError> {
    Ok(Json(public_service::list_tournaments(&state).await?))
}

/// Standings and rounds of a tournament.
#[utoipa::path(
    get,
    path = "/public/tournaments/{id}",
    tag = "public",
    params(("id" = String, Path, description = "Identifier of the tournament")),
    responses(
        (status = 200, description = "Tournament detail", body = TournamentDetail),
        (status = 404, description = "Unknown tournament")
    )
)]
pub async fn get_tournament(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TournamentDetail>, AppError> {
    Ok(Json(public_service::get_tournament(&state, id).await?))
}

/// Boards of one round.
#[utoipa::path(
    get,
    path = "/public/tournaments/{id}/rounds/{round}",
    tag = "public",
    params(
        ("id" = String, Path, description = "Identifier of the tournament"),
        ("round" = u32, Path, description = "Round number, starting at 1")
    ),
    responses(
        (status = 200, description = "Round pairings", body = RoundDetail),
        (status = 404, description = "Unknown tournament or round")
    )
)]
pub async fn get_round(
    State(state): State<SharedState>,
    Path((id, round)): Path<(Uuid, u32)>,
) -> Result<Json<RoundDetail>, AppError> {
    Ok(Json(public_service::get_round(&state, id, round).await?))
}
