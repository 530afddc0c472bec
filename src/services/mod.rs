/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Participant registration and review.
pub mod participant_service;
/// Public service for read-only tournament information.
pub mod public_service;
/// Round pairing, result entry and round completion.
pub mod round_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Tournament store connection supervisor.
pub mod storage_supervisor;
/// Tournament, roster and standings management.
pub mod tournament_service;
