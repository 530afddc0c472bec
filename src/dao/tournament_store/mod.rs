pub mod memory;
#[cfg(feature = "postgrest-store")]
pub mod postgrest;

use crate::dao::models::{
    EntryEntity, EntryWithParticipantEntity, MatchEntity, MatchHistoryEntity, ParticipantEntity,
    RoundEntity, TournamentEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for tournaments, rosters, rounds and matches.
pub trait TournamentStore: Send + Sync {
    fn save_tournament(
        &self,
        tournament: TournamentEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>>;
    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>>;

    fn save_participant(
        &self,
        participant: ParticipantEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_participant(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>>;
    fn list_participants(&self) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>>;

    fn save_entry(&self, entry: EntryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Entries of a tournament in insertion order, joined with their participant.
    fn list_entries(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EntryWithParticipantEntity>>>;

    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_round(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoundEntity>>>;
    fn list_rounds(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>>;
    /// Persist a new round together with its matches; nothing is kept when any write fails.
    fn create_round(
        &self,
        round: RoundEntity,
        matches: Vec<MatchEntity>,
    ) -> BoxFuture<'static, StorageResult<()>>;

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn save_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn list_round_matches(
        &self,
        round_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    /// Every match of the tournament with the number of its round.
    fn list_history(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchHistoryEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
