use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;
use uuid::Uuid;

use crate::dao::{
    models::{
        EntryEntity, EntryWithParticipantEntity, MatchEntity, MatchHistoryEntity,
        ParticipantEntity, RoundEntity, TournamentEntity,
    },
    storage::StorageResult,
    tournament_store::TournamentStore,
};

use super::{
    config::PostgrestConfig,
    error::{PostgrestError, PostgrestResult},
    models::{
        ENTRIES, ENTRY_SELECT, EntryRow, HISTORY_SELECT, PAIRINGS, PARTICIPANTS, PairingRow,
        ParticipantRow, ROUNDS, RoundRow, TOURNAMENTS, TournamentRow,
    },
};

type Query = Vec<(&'static str, String)>;

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// Store backed by a PostgREST endpoint (e.g. a hosted Postgres instance).
#[derive(Clone)]
pub struct PostgrestTournamentStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl PostgrestTournamentStore {
    /// Build the HTTP client and make sure the endpoint answers.
    pub async fn connect(config: PostgrestConfig) -> PostgrestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| PostgrestError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: config.api_key.map(Arc::<str>::from),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        let builder = self.client.request(method, url);
        match self.api_key {
            Some(ref key) => builder
                .header("apikey", key.as_ref())
                .bearer_auth(key.as_ref()),
            None => builder,
        }
    }

    async fn ping(&self) -> PostgrestResult<()> {
        let query: Query = vec![("select", "id".into()), ("limit", "1".into())];
        self.select::<serde_json::Value>(TOURNAMENTS, query)
            .await
            .map(|_| ())
    }

    async fn send(&self, table: &str, builder: RequestBuilder) -> PostgrestResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| PostgrestError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(PostgrestError::RequestStatus {
                path: table.to_string(),
                status: response.status(),
            })
        }
    }

    async fn select<T>(&self, table: &str, query: Query) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let builder = self.request(Method::GET, table).query(&query);
        let response = self.send(table, builder).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| PostgrestError::DecodeResponse {
                path: table.to_string(),
                source,
            })
    }

    async fn select_by_id<T>(&self, table: &str, id: Uuid) -> PostgrestResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let query: Query = vec![("id", eq(id)), ("limit", "1".into())];
        Ok(self.select(table, query).await?.into_iter().next())
    }

    /// Insert rows, failing with a conflict status when a unique key is taken.
    async fn insert<T>(&self, table: &str, rows: &T) -> PostgrestResult<()>
    where
        T: ?Sized + Serialize,
    {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(rows);
        self.send(table, builder).await.map(|_| ())
    }

    /// Insert or replace rows keyed by their primary key.
    async fn upsert<T>(&self, table: &str, rows: &T) -> PostgrestResult<()>
    where
        T: ?Sized + Serialize,
    {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);
        self.send(table, builder).await.map(|_| ())
    }

    async fn delete(&self, table: &str, id: Uuid) -> PostgrestResult<()> {
        let builder = self.request(Method::DELETE, table).query(&[("id", eq(id))]);
        self.send(table, builder).await.map(|_| ())
    }
}

impl TournamentStore for PostgrestTournamentStore {
    fn save_tournament(
        &self,
        tournament: TournamentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = TournamentRow::from(tournament);
            store.upsert(TOURNAMENTS, &[row]).await.map_err(Into::into)
        })
    }

    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let row = store.select_by_id::<TournamentRow>(TOURNAMENTS, id).await?;
            Ok(row.map(Into::into))
        })
    }

    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query: Query = vec![("order", "created_at.asc".into())];
            let rows = store.select::<TournamentRow>(TOURNAMENTS, query).await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn save_participant(
        &self,
        participant: ParticipantEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = ParticipantRow::from(participant);
            store.upsert(PARTICIPANTS, &[row]).await.map_err(Into::into)
        })
    }

    fn find_participant(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let row = store.select_by_id::<ParticipantRow>(PARTICIPANTS, id).await?;
            Ok(row.map(Into::into))
        })
    }

    fn list_participants(&self) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query: Query = vec![("order", "created_at.asc".into())];
            let rows = store.select::<ParticipantRow>(PARTICIPANTS, query).await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn save_entry(&self, entry: EntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = EntryRow::from(entry);
            store.upsert(ENTRIES, &[row]).await.map_err(Into::into)
        })
    }

    fn list_entries(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EntryWithParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query: Query = vec![
                ("select", ENTRY_SELECT.into()),
                ("tournament_id", eq(tournament_id)),
                ("order", "created_at.asc".into()),
            ];
            let rows = store.select::<EntryRow>(ENTRIES, query).await?;
            let entries = rows
                .into_iter()
                .map(EntryRow::into_joined)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
    }

    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = RoundRow::from(round);
            store.upsert(ROUNDS, &[row]).await.map_err(Into::into)
        })
    }

    fn find_round(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoundEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let row = store.select_by_id::<RoundRow>(ROUNDS, id).await?;
            Ok(row.map(Into::into))
        })
    }

    fn list_rounds(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query: Query = vec![
                ("tournament_id", eq(tournament_id)),
                ("order", "round_number.asc".into()),
            ];
            let rows = store.select::<RoundRow>(ROUNDS, query).await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn create_round(
        &self,
        round: RoundEntity,
        matches: Vec<MatchEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let round_id = round.id;
            store.insert(ROUNDS, &[RoundRow::from(round)]).await?;

            if matches.is_empty() {
                return Ok(());
            }

            let rows: Vec<PairingRow> = matches.into_iter().map(PairingRow::from).collect();
            if let Err(err) = store.insert(PAIRINGS, &rows).await {
                if let Err(cleanup) = store.delete(ROUNDS, round_id).await {
                    warn!(%round_id, error = %cleanup, "failed to remove round after pairing insert failure");
                }
                return Err(err.into());
            }
            Ok(())
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let row = store.select_by_id::<PairingRow>(PAIRINGS, id).await?;
            Ok(row.map(PairingRow::into_entity).transpose()?)
        })
    }

    fn save_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = PairingRow::from(record);
            store.upsert(PAIRINGS, &[row]).await.map_err(Into::into)
        })
    }

    fn list_round_matches(
        &self,
        round_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query: Query = vec![
                ("round_id", eq(round_id)),
                ("order", "board_number.asc".into()),
            ];
            let rows = store.select::<PairingRow>(PAIRINGS, query).await?;
            let matches = rows
                .into_iter()
                .map(PairingRow::into_entity)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(matches)
        })
    }

    fn list_history(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchHistoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query: Query = vec![
                ("select", HISTORY_SELECT.into()),
                ("round.tournament_id", eq(tournament_id)),
            ];
            let rows = store.select::<PairingRow>(PAIRINGS, query).await?;
            let history = rows
                .into_iter()
                .map(PairingRow::into_history)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(history)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}
