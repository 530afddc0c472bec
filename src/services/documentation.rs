use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Chess Swiss Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::public::register_participant,
        crate::routes::public::list_tournaments,
        crate::routes::public::get_tournament,
        crate::routes::public::get_round,
        crate::routes::admin::list_tournaments,
        crate::routes::admin::create_tournament,
        crate::routes::admin::get_tournament,
        crate::routes::admin::add_entries,
        crate::routes::admin::update_standing,
        crate::routes::admin::withdraw_entry,
        crate::routes::admin::create_round,
        crate::routes::admin::complete_round,
        crate::routes::admin::record_result,
        crate::routes::admin::list_participants,
        crate::routes::admin::approve_participant,
        crate::routes::admin::reject_participant,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::participant::RegisterParticipantRequest,
            crate::dto::participant::ParticipantSummary,
            crate::dto::tournament::CreateTournamentRequest,
            crate::dto::tournament::TournamentSummary,
            crate::dto::tournament::TournamentDetail,
            crate::dto::tournament::StandingView,
            crate::dto::tournament::EntryInput,
            crate::dto::tournament::AddEntriesRequest,
            crate::dto::tournament::UpdateStandingRequest,
            crate::dto::round::CreateRoundRequest,
            crate::dto::round::RecordResultRequest,
            crate::dto::round::RoundSummary,
            crate::dto::round::SeatView,
            crate::dto::round::PairingView,
            crate::dto::round::RoundDetail,
            crate::dto::round::CompleteRoundResponse,
            crate::dto::sse::AdminHandshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::RoundCreatedEvent,
            crate::dto::sse::ResultRecordedEvent,
            crate::dto::sse::RoundCompletedEvent,
            crate::dao::models::TournamentStatus,
            crate::dao::models::ParticipantStatus,
            crate::dao::models::EntryStatus,
            crate::dao::models::RoundStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "public", description = "Registration and read-only tournament views"),
        (name = "admin", description = "Tournament administration and pairing"),
    )
)]
pub struct ApiDoc;
