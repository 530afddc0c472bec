use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dao::models::ParticipantStatus,
    dto::{
        participant::ParticipantSummary,
        round::{
            CompleteRoundResponse, CreateRoundRequest, PairingView, RecordResultRequest,
            RoundDetail,
        },
        tournament::{
            AddEntriesRequest, CreateTournamentRequest, StandingView, TournamentDetail,
            TournamentSummary, UpdateStandingRequest,
        },
    },
    error::AppError,
    services::{participant_service, round_service, sse_service, tournament_service},
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only endpoints for running tournaments.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/tournaments",
            get(list_tournaments).post(create_tournament),
        )
        .route("/admin/tournaments/{id}", get(get_tournament))
        .route("/admin/tournaments/{id}/entries", post(add_entries))
        .route(
            "/admin/tournaments/{id}/entries/{entry_id}",
            put(update_standing),
        )
        .route(
            "/admin/tournaments/{id}/entries/{entry_id}/withdraw",
            post(withdraw_entry),
        )
        .route("/admin/tournaments/{id}/rounds", post(create_round))
        .route(
            "/admin/tournaments/{id}/rounds/complete",
            post(complete_round),
        )
        .route("/admin/matches/{id}/result", put(record_result))
        .route("/admin/participants", get(list_participants))
        .route(
            "/admin/participants/{id}/approve",
            post(approve_participant),
        )
        .route("/admin/participants/{id}/reject", post(reject_participant))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// List every tournament, whatever its status.
#[utoipa::path(
    get,
    path = "/admin/tournaments",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Tournaments", body = [TournamentSummary]))
)]
pub async fn list_tournaments(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TournamentSummary>>, AppError> {
    Ok(Json(tournament_service::list_tournaments(&state).await?))
}

/// Create a tournament in the `upcoming` state.
#[utoipa::path(
    post,
    path = "/admin/tournaments",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = CreateTournamentRequest,
    responses(
        (status = 201, description = "Tournament created", body = TournamentSummary),
        (status = 400, description = "Invalid tournament definition")
    )
)]
pub async fn create_tournament(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTournamentRequest>>,
) -> Result<(StatusCode, Json<TournamentSummary>), AppError> {
    let summary = tournament_service::create_tournament(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

#[utoipa::path(
    get,
    path = "/admin/tournaments/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the tournament")),
    responses((status = 200, description = "Tournament with standings and rounds", body = TournamentDetail))
)]
pub async fn get_tournament(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TournamentDetail>, AppError> {
    Ok(Json(tournament_service::tournament_detail(&state, id).await?))
}

/// Enter approved participants into a tournament.
#[utoipa::path(
    post,
    path = "/admin/tournaments/{id}/entries",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the tournament")),
    request_body = AddEntriesRequest,
    responses(
        (status = 200, description = "Updated standings", body = [StandingView]),
        (status = 400, description = "Participant unapproved or already entered")
    )
)]
pub async fn add_entries(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AddEntriesRequest>>,
) -> Result<Json<Vec<StandingView>>, AppError> {
    Ok(Json(
        tournament_service::add_entries(&state, id, payload).await?,
    ))
}

/// Overwrite an entry's score and tie-breaks with values from the standings aggregation.
#[utoipa::path(
    put,
    path = "/admin/tournaments/{id}/entries/{entry_id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the tournament"),
    ("entry_id" = String, Path, description = "Identifier of the entry")),
    request_body = UpdateStandingRequest,
    responses((status = 200, description = "Updated standings", body = [StandingView]))
)]
pub async fn update_standing(
    State(state): State<SharedState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
    Valid(Json(payload)): Valid<Json<UpdateStandingRequest>>,
) -> Result<Json<Vec<StandingView>>, AppError> {
    Ok(Json(
        tournament_service::update_standing(&state, id, entry_id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/admin/tournaments/{id}/entries/{entry_id}/withdraw",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the tournament"),
    ("entry_id" = String, Path, description = "Identifier of the entry")),
    responses((status = 200, description = "Updated standings", body = [StandingView]))
)]
pub async fn withdraw_entry(
    State(state): State<SharedState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<StandingView>>, AppError> {
    Ok(Json(
        tournament_service::withdraw_entry(&state, id, entry_id).await?,
    ))
}

/// Pair and start the next round.
#[utoipa::path(
    post,
    path = "/admin/tournaments/{id}/rounds",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the tournament")),
    request_body = CreateRoundRequest,
    responses(
        (status = 201, description = "Round paired", body = RoundDetail),
        (status = 409, description = "A round is still in progress or every round was played"),
        (status = 422, description = "The roster could not be paired")
    )
)]
pub async fn create_round(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<CreateRoundRequest>>,
) -> Result<(StatusCode, Json<RoundDetail>), AppError> {
    let detail = round_service::create_round(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Close the round in progress once every board has a result.
#[utoipa::path(
    post,
    path = "/admin/tournaments/{id}/rounds/complete",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the tournament")),
    responses(
        (status = 200, description = "Round completed", body = CompleteRoundResponse),
        (status = 409, description = "No round in progress or results missing")
    )
)]
pub async fn complete_round(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompleteRoundResponse>, AppError> {
    Ok(Json(round_service::complete_round(&state, id).await?))
}

#[utoipa::path(
    put,
    path = "/admin/matches/{id}/result",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the match")),
    request_body = RecordResultRequest,
    responses(
        (status = 200, description = "Result stored", body = PairingView),
        (status = 409, description = "Bye, or round already completed")
    )
)]
pub async fn record_result(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<RecordResultRequest>>,
) -> Result<Json<PairingView>, AppError> {
    Ok(Json(round_service::record_result(&state, id, payload).await?))
}

/// List registrations, pending ones included.
#[utoipa::path(
    get,
    path = "/admin/participants",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Participants", body = [ParticipantSummary]))
)]
pub async fn list_participants(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ParticipantSummary>>, AppError> {
    Ok(Json(participant_service::list_participants(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/participants/{id}/approve",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the participant")),
    responses((status = 200, description = "Participant approved", body = ParticipantSummary))
)]
pub async fn approve_participant(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParticipantSummary>, AppError> {
    Ok(Json(
        participant_service::review(&state, id, ParticipantStatus::Approved).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/admin/participants/{id}/reject",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("id" = String, Path, description = "Identifier of the participant")),
    responses((status = 200, description = "Participant rejected", body = ParticipantSummary))
)]
pub async fn reject_participant(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParticipantSummary>, AppError> {
    Ok(Json(
        participant_service::review(&state, id, ParticipantStatus::Rejected).await?,
    ))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if sse_service::is_admin_token(&state, &provided).await {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin token".into()))
    }
}
