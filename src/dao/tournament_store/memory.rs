use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{
        EntryEntity, EntryWithParticipantEntity, MatchEntity, MatchHistoryEntity,
        ParticipantEntity, RoundEntity, TournamentEntity,
    },
    storage::{StorageError, StorageResult},
    tournament_store::TournamentStore,
};

/// Process-local store keeping every table in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryTournamentStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    tournaments: IndexMap<Uuid, TournamentEntity>,
    participants: IndexMap<Uuid, ParticipantEntity>,
    entries: IndexMap<Uuid, EntryEntity>,
    rounds: IndexMap<Uuid, RoundEntity>,
    matches: IndexMap<Uuid, MatchEntity>,
}

impl InMemoryTournamentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TournamentStore for InMemoryTournamentStore {
    fn save_tournament(
        &self,
        tournament: TournamentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .tournaments
                .insert(tournament.id, tournament);
            Ok(())
        })
    }

    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.tournaments.get(&id).cloned()) })
    }

    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.tournaments.values().cloned().collect()) })
    }

    fn save_participant(
        &self,
        participant: ParticipantEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .participants
                .insert(participant.id, participant);
            Ok(())
        })
    }

    fn find_participant(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.participants.get(&id).cloned()) })
    }

    fn list_participants(&self) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.participants.values().cloned().collect()) })
    }

    fn save_entry(&self, entry: EntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.entries.insert(entry.id, entry);
            Ok(())
        })
    }

    fn list_entries(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EntryWithParticipantEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let entries: StorageResult<Vec<EntryWithParticipantEntity>> = guard
                .entries
                .values()
                .filter(|entry| entry.tournament_id == tournament_id)
                .map(|entry| {
                    guard
                        .participants
                        .get(&entry.participant_id)
                        .cloned()
                        .map(|participant| EntryWithParticipantEntity {
                            entry: entry.clone(),
                            participant,
                        })
                        .ok_or_else(|| {
                            StorageError::InvalidRecord(format!(
                                "entry {} references unknown participant {}",
                                entry.id, entry.participant_id
                            ))
                        })
                })
                .collect();
            entries
        })
    }

    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.rounds.insert(round.id, round);
            Ok(())
        })
    }

    fn find_round(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoundEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.rounds.get(&id).cloned()) })
    }

    fn list_rounds(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let mut rounds: Vec<RoundEntity> = guard
                .rounds
                .values()
                .filter(|round| round.tournament_id == tournament_id)
                .cloned()
                .collect();
            rounds.sort_by_key(|round| round.round_number);
            Ok(rounds)
        })
    }

    fn create_round(
        &self,
        round: RoundEntity,
        matches: Vec<MatchEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let taken = guard.rounds.values().any(|existing| {
                existing.tournament_id == round.tournament_id
                    && existing.round_number == round.round_number
            });
            if taken {
                return Err(StorageError::Conflict(format!(
                    "round {} already exists for tournament {}",
                    round.round_number, round.tournament_id
                )));
            }

            for record in matches {
                guard.matches.insert(record.id, record);
            }
            guard.rounds.insert(round.id, round);
            Ok(())
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.matches.get(&id).cloned()) })
    }

    fn save_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.matches.insert(record.id, record);
            Ok(())
        })
    }

    fn list_round_matches(
        &self,
        round_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let mut matches: Vec<MatchEntity> = guard
                .matches
                .values()
                .filter(|record| record.round_id == round_id)
                .cloned()
                .collect();
            matches.sort_by_key(|record| record.board_number);
            Ok(matches)
        })
    }

    fn list_history(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchHistoryEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let history: Vec<MatchHistoryEntity> = guard
                .matches
                .values()
                .filter_map(|record| {
                    let round = guard.rounds.get(&record.round_id)?;
                    (round.tournament_id == tournament_id).then(|| MatchHistoryEntity {
                        record: record.clone(),
                        round_number: round.round_number,
                    })
                })
                .collect();
            Ok(history)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
