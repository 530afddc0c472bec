//! Tournament administration: creation, rosters and standings.

use std::{cmp::Ordering, collections::HashSet, sync::Arc, time::SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{
            EntryEntity, EntryStatus, EntryWithParticipantEntity, ParticipantStatus,
            TournamentEntity, TournamentStatus,
        },
        tournament_store::TournamentStore,
    },
    dto::{
        round::RoundSummary,
        tournament::{
            AddEntriesRequest, CreateTournamentRequest, StandingView, TournamentDetail,
            TournamentSummary, UpdateStandingRequest,
        },
    },
    error::ServiceError,
    state::SharedState,
};

/// Fetch a tournament or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_tournament(
    store: &Arc<dyn TournamentStore>,
    id: Uuid,
) -> Result<TournamentEntity, ServiceError> {
    store
        .find_tournament(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("tournament `{id}` not found")))
}

/// Standings order: score, then Buchholz, then Sonneborn-Berger, all descending.
/// Ties keep registration order.
pub(crate) fn compare_entries(
    a: &EntryWithParticipantEntity,
    b: &EntryWithParticipantEntity,
) -> Ordering {
    descending(a.entry.score, b.entry.score)
        .then_with(|| descending(a.entry.tiebreak_1, b.entry.tiebreak_1))
        .then_with(|| descending(a.entry.tiebreak_2, b.entry.tiebreak_2))
}

/// `-0.0` and `0.0` compare equal.
fn descending(a: f64, b: f64) -> Ordering {
    (b + 0.0).total_cmp(&(a + 0.0))
}

/// Entries sorted into standings order.
pub(crate) fn ordered_standings(
    mut entries: Vec<EntryWithParticipantEntity>,
) -> Vec<EntryWithParticipantEntity> {
    entries.sort_by(compare_entries);
    entries
}

/// Active entries in standings order; this is the roster handed to the pairing engine.
pub(crate) fn active_roster(
    entries: &[EntryWithParticipantEntity],
) -> Vec<&EntryWithParticipantEntity> {
    let mut roster: Vec<&EntryWithParticipantEntity> = entries
        .iter()
        .filter(|entry| entry.entry.status == EntryStatus::Active)
        .collect();
    roster.sort_by(|a, b| compare_entries(a, b));
    roster
}

fn standing_views(entries: &[EntryWithParticipantEntity]) -> Vec<StandingView> {
    entries
        .iter()
        .zip(1..)
        .map(|(entry, rank)| StandingView::new(rank, entry))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Create a tournament in the `upcoming` state.
pub async fn create_tournament(
    state: &SharedState,
    request: CreateTournamentRequest,
) -> Result<TournamentSummary, ServiceError> {
    let store = state.require_store().await?;
    let name = request.name.trim().to_owned();
    let time_control = request.time_control.trim().to_owned();
    if name.is_empty() || time_control.is_empty() {
        return Err(ServiceError::InvalidInput(
            "name and time control must not be blank".into(),
        ));
    }

    let now = SystemTime::now();
    let tournament = TournamentEntity {
        id: Uuid::new_v4(),
        name,
        description: non_blank(request.description).unwrap_or_default(),
        start_date: non_blank(request.start_date),
        end_date: non_blank(request.end_date),
        registration_deadline: non_blank(request.registration_deadline),
        status: TournamentStatus::Upcoming,
        total_rounds: request.total_rounds,
        time_control,
        created_at: now,
        updated_at: now,
    };
    store.save_tournament(tournament.clone()).await?;
    info!(
        tournament_id = %tournament.id,
        rounds = tournament.total_rounds,
        "tournament created"
    );
    Ok((&tournament).into())
}

pub async fn list_tournaments(
    state: &SharedState,
) -> Result<Vec<TournamentSummary>, ServiceError> {
    let store = state.require_store().await?;
    let tournaments = store.list_tournaments().await?;
    Ok(tournaments.iter().map(TournamentSummary::from).collect())
}

/// Tournament metadata with its standings and rounds.
pub async fn tournament_detail(
    state: &SharedState,
    id: Uuid,
) -> Result<TournamentDetail, ServiceError> {
    let store = state.require_store().await?;
    let tournament = load_tournament(&store, id).await?;
    let entries = ordered_standings(store.list_entries(id).await?);
    let rounds = store.list_rounds(id).await?;

    Ok(TournamentDetail {
        tournament: (&tournament).into(),
        standings: standing_views(&entries),
        rounds: rounds.iter().map(RoundSummary::from).collect(),
    })
}

/// Enter approved participants into a tournament.
pub async fn add_entries(
    state: &SharedState,
    tournament_id: Uuid,
    request: AddEntriesRequest,
) -> Result<Vec<StandingView>, ServiceError> {
    let store = state.require_store().await?;
    let tournament = load_tournament(&store, tournament_id).await?;
    if tournament.status == TournamentStatus::Completed {
        return Err(ServiceError::InvalidState(format!(
            "tournament `{tournament_id}` is already completed"
        )));
    }

    let mut entered: HashSet<Uuid> = store
        .list_entries(tournament_id)
        .await?
        .iter()
        .map(|entry| entry.participant.id)
        .collect();

    let mut new_entries = Vec::with_capacity(request.entries.len());
    for input in request.entries {
        let participant = store
            .find_participant(input.participant_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("participant `{}` not found", input.participant_id))
            })?;
        if participant.status != ParticipantStatus::Approved {
            return Err(ServiceError::InvalidInput(format!(
                "participant `{}` is not approved",
                participant.id
            )));
        }
        if !entered.insert(participant.id) {
            return Err(ServiceError::InvalidInput(format!(
                "participant `{}` is already entered",
                participant.id
            )));
        }

        new_entries.push(EntryEntity {
            id: Uuid::new_v4(),
            tournament_id,
            participant_id: participant.id,
            seed: input.seed,
            score: 0.0,
            tiebreak_1: 0.0,
            tiebreak_2: 0.0,
            status: EntryStatus::Active,
            created_at: SystemTime::now(),
        });
    }

    let added = new_entries.len();
    for entry in new_entries {
        store.save_entry(entry).await?;
    }
    info!(%tournament_id, added, "participants entered");

    let entries = ordered_standings(store.list_entries(tournament_id).await?);
    Ok(standing_views(&entries))
}

async fn find_entry(
    store: &Arc<dyn TournamentStore>,
    tournament_id: Uuid,
    entry_id: Uuid,
) -> Result<EntryWithParticipantEntity, ServiceError> {
    store
        .list_entries(tournament_id)
        .await?
        .into_iter()
        .find(|entry| entry.entry.id == entry_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "entry `{entry_id}` not found in tournament `{tournament_id}`"
            ))
        })
}

/// Overwrite the standing values of an entry.
pub async fn update_standing(
    state: &SharedState,
    tournament_id: Uuid,
    entry_id: Uuid,
    request: UpdateStandingRequest,
) -> Result<Vec<StandingView>, ServiceError> {
    let store = state.require_store().await?;
    let mut joined = find_entry(&store, tournament_id, entry_id).await?;
    joined.entry.score = request.score + 0.0;
    joined.entry.tiebreak_1 = request.tiebreak_1 + 0.0;
    joined.entry.tiebreak_2 = request.tiebreak_2 + 0.0;
    if let Some(seed) = request.seed {
        joined.entry.seed = seed;
    }
    store.save_entry(joined.entry).await?;

    let entries = ordered_standings(store.list_entries(tournament_id).await?);
    Ok(standing_views(&entries))
}

/// Withdraw an entry so it is left out of every later round.
pub async fn withdraw_entry(
    state: &SharedState,
    tournament_id: Uuid,
    entry_id: Uuid,
) -> Result<Vec<StandingView>, ServiceError> {
    let store = state.require_store().await?;
    let mut joined = find_entry(&store, tournament_id, entry_id).await?;
    if joined.entry.status == EntryStatus::Withdrawn {
        return Err(ServiceError::InvalidState(format!(
            "entry `{entry_id}` is already withdrawn"
        )));
    }
    joined.entry.status = EntryStatus::Withdrawn;
    store.save_entry(joined.entry).await?;
    info!(%tournament_id, %entry_id, "entry withdrawn");

    let entries = ordered_standings(store.list_entries(tournament_id).await?);
    Ok(standing_views(&entries))
}
