use std::{collections::HashSet, sync::Arc};

use chess_swiss_back::{
    config::AppConfig,
    dao::{
        models::{ParticipantStatus, TournamentStatus},
        tournament_store::memory::InMemoryTournamentStore,
    },
    dto::{
        participant::RegisterParticipantRequest,
        round::{CreateRoundRequest, RecordResultRequest, RoundDetail},
        tournament::{AddEntriesRequest, CreateTournamentRequest, EntryInput},
    },
    error::ServiceError,
    services::{participant_service, public_service, round_service, tournament_service},
    state::{AppState, SharedState},
};
use uuid::Uuid;

async fn connected_state() -> SharedState {
    let state = AppState::new(AppConfig::default());
    state
        .install_store(Arc::new(InMemoryTournamentStore::new()))
        .await;
    state
}

async fn approved_player(state: &SharedState, handle: &str) -> Uuid {
    let registered = participant_service::register(
        state,
        RegisterParticipantRequest {
            name: format!("Player {handle}"),
            discord_username: format!("{handle}#0001"),
            chesscom_username: handle.to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(registered.status, ParticipantStatus::Pending);

    participant_service::review(state, registered.id, ParticipantStatus::Approved)
        .await
        .unwrap()
        .id
}

/// Tournament with `players` seeded entries, returning the tournament and the
/// entry ids in seed order.
async fn tournament_with(
    state: &SharedState,
    players: usize,
    total_rounds: u32,
) -> (Uuid, Vec<Uuid>) {
    let tournament = tournament_service::create_tournament(
        state,
        CreateTournamentRequest {
            name: "Autumn Rapid".into(),
            description: None,
            start_date: Some("2026-10-24T18:00".into()),
            end_date: None,
            registration_deadline: None,
            total_rounds,
            time_control: "10+5".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(tournament.status, TournamentStatus::Upcoming);

    let mut entries = Vec::new();
    for seed in 1..=players {
        let participant_id = approved_player(state, &format!("player_{seed}")).await;
        entries.push(EntryInput {
            participant_id,
            seed: Some(seed as u32),
        });
    }
    let standings = tournament_service::add_entries(
        state,
        tournament.id,
        AddEntriesRequest { entries },
    )
    .await
    .unwrap();

    let mut by_seed = standings.clone();
    by_seed.sort_by_key(|line| line.seed);
    (
        tournament.id,
        by_seed.iter().map(|line| line.entry_id).collect(),
    )
}

async fn play_out(state: &SharedState, detail: &RoundDetail) {
    for pairing in detail.pairings.iter().filter(|pairing| !pairing.is_bye) {
        round_service::record_result(
            state,
            pairing.match_id,
            RecordResultRequest {
                result: "1/2-1/2".into(),
            },
        )
        .await
        .unwrap();
    }
}

fn games(detail: &RoundDetail) -> Vec<(Uuid, Uuid)> {
    detail
        .pairings
        .iter()
        .filter(|pairing| !pairing.is_bye)
        .filter_map(|pairing| Some((pairing.white.entry_id?, pairing.black.entry_id?)))
        .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
        .collect()
}

fn bye_recipient(detail: &RoundDetail) -> Option<Uuid> {
    detail
        .pairings
        .iter()
        .find(|pairing| pairing.is_bye)
        .and_then(|pairing| pairing.white.entry_id)
}

#[tokio::test]
async fn two_rounds_with_an_odd_roster() {
    let state = connected_state().await;
    let (tournament_id, seeds) = tournament_with(&state, 5, 3).await;

    let first = round_service::create_round(&state, tournament_id, CreateRoundRequest::default())
        .await
        .unwrap();
    assert_eq!(first.round.round_number, 1);
    assert_eq!(first.pairings.len(), 3);
    assert_eq!(games(&first).len(), 2);

    let bye = first
        .pairings
        .iter()
        .find(|pairing| pairing.is_bye)
        .unwrap();
    assert_eq!(bye.board_number, 3);
    assert_eq!(bye.result.as_deref(), Some("1-0"));
    assert_eq!(bye.black.name, "BYE");
    assert_eq!(bye_recipient(&first), Some(seeds[4]));

    let detail = tournament_service::tournament_detail(&state, tournament_id)
        .await
        .unwrap();
    assert_eq!(detail.tournament.status, TournamentStatus::Active);

    play_out(&state, &first).await;
    let completed = round_service::complete_round(&state, tournament_id)
        .await
        .unwrap();
    assert_eq!(completed.tournament_status, TournamentStatus::Active);
    assert!(completed.round.end_time.is_some());

    let second = round_service::create_round(&state, tournament_id, CreateRoundRequest::default())
        .await
        .unwrap();
    assert_eq!(second.round.round_number, 2);
    assert_ne!(bye_recipient(&second), bye_recipient(&first));

    let earlier: HashSet<_> = games(&first).into_iter().collect();
    assert!(games(&second).iter().all(|game| !earlier.contains(game)));

    let public = public_service::get_round(&state, tournament_id, 2).await.unwrap();
    assert_eq!(public.pairings.len(), second.pairings.len());
}

#[tokio::test]
async fn a_round_in_progress_blocks_the_next_one() {
    let state = connected_state().await;
    let (tournament_id, _) = tournament_with(&state, 4, 2).await;

    let first = round_service::create_round(&state, tournament_id, CreateRoundRequest::default())
        .await
        .unwrap();
    assert!(first.pairings.iter().all(|pairing| !pairing.is_bye));

    let again =
        round_service::create_round(&state, tournament_id, CreateRoundRequest::default()).await;
    assert!(matches!(again, Err(ServiceError::InvalidState(_))));

    let early = round_service::complete_round(&state, tournament_id).await;
    assert!(matches!(early, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn bye_results_are_fixed() {
    let state = connected_state().await;
    let (tournament_id, _) = tournament_with(&state, 3, 1).await;

    let round = round_service::create_round(&state, tournament_id, CreateRoundRequest::default())
        .await
        .unwrap();
    let bye = round.pairings.iter().find(|pairing| pairing.is_bye).unwrap();

    let changed = round_service::record_result(
        &state,
        bye.match_id,
        RecordResultRequest {
            result: "0-1".into(),
        },
    )
    .await;
    assert!(matches!(changed, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn last_round_completes_the_tournament() {
    let state = connected_state().await;
    let (tournament_id, _) = tournament_with(&state, 2, 1).await;

    let round = round_service::create_round(&state, tournament_id, CreateRoundRequest::default())
        .await
        .unwrap();
    play_out(&state, &round).await;

    let completed = round_service::complete_round(&state, tournament_id)
        .await
        .unwrap();
    assert_eq!(completed.tournament_status, TournamentStatus::Completed);

    let late = round_service::record_result(
        &state,
        round.pairings[0].match_id,
        RecordResultRequest {
            result: "1-0".into(),
        },
    )
    .await;
    assert!(matches!(late, Err(ServiceError::InvalidState(_))));

    let extra =
        round_service::create_round(&state, tournament_id, CreateRoundRequest::default()).await;
    assert!(matches!(extra, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn pending_participants_cannot_be_entered() {
    let state = connected_state().await;
    let (tournament_id, _) = tournament_with(&state, 2, 1).await;

    let pending = participant_service::register(
        &state,
        RegisterParticipantRequest {
            name: "Late Comer".into(),
            discord_username: "late#0001".into(),
            chesscom_username: "late_comer".into(),
        },
    )
    .await
    .unwrap();

    let entered = tournament_service::add_entries(
        &state,
        tournament_id,
        AddEntriesRequest {
            entries: vec![EntryInput {
                participant_id: pending.id,
                seed: None,
            }],
        },
    )
    .await;
    assert!(matches!(entered, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn services_report_degraded_without_a_store() {
    let state = AppState::new(AppConfig::default());
    let listed = tournament_service::list_tournaments(&state).await;
    assert!(matches!(listed, Err(ServiceError::Degraded)));
}
