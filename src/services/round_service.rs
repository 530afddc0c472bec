//! Round lifecycle: pairing a new round, recording results and closing rounds.
//!
//! Every operation that changes the rounds of a tournament runs under the
//! tournament's round gate, so two admins cannot create the same round number
//! or close a round while a result is being written.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{MatchEntity, RoundEntity, RoundStatus, TournamentStatus},
    dto::round::{
        CompleteRoundResponse, CreateRoundRequest, PairingView, RecordResultRequest, RoundDetail,
        RoundSummary, pairing_views,
    },
    error::ServiceError,
    pairing::{Competitor, GameResult, HistoryEntry, RematchPolicy, RoundPairings, pair_round},
    services::{
        sse_events,
        tournament_service::{active_roster, load_tournament},
    },
    state::SharedState,
};

/// Pair and persist the next round of a tournament.
pub async fn create_round(
    state: &SharedState,
    tournament_id: Uuid,
    request: CreateRoundRequest,
) -> Result<RoundDetail, ServiceError> {
    let _gate = state.lock_rounds(tournament_id).await;
    let store = state.require_store().await?;

    let mut tournament = load_tournament(&store, tournament_id).await?;
    if tournament.status == TournamentStatus::Completed {
        return Err(ServiceError::InvalidState(format!(
            "tournament `{tournament_id}` is already completed"
        )));
    }

    let rounds = store.list_rounds(tournament_id).await?;
    if let Some(active) = rounds.iter().find(|round| round.status == RoundStatus::Active) {
        return Err(ServiceError::InvalidState(format!(
            "round {} is still in progress",
            active.round_number
        )));
    }
    let round_number = rounds
        .iter()
        .map(|round| round.round_number)
        .max()
        .unwrap_or(0)
        + 1;
    if round_number > tournament.total_rounds {
        return Err(ServiceError::InvalidState(format!(
            "all {} rounds have already been played",
            tournament.total_rounds
        )));
    }

    let entries = store.list_entries(tournament_id).await?;
    let competitors: Vec<Competitor> = active_roster(&entries)
        .into_iter()
        .map(Competitor::from)
        .collect();
    if competitors.len() < 2 {
        return Err(ServiceError::InvalidState(
            "at least two active players are needed to pair a round".into(),
        ));
    }

    let history: Vec<HistoryEntry> = store
        .list_history(tournament_id)
        .await?
        .iter()
        .filter_map(|record| record.to_history_entry())
        .collect();

    let policy = request
        .allow_rematches
        .map(RematchPolicy::from_flag)
        .unwrap_or_else(|| state.config().default_rematch_policy());
    let paired = pair_round(&competitors, &history, round_number, policy)?;

    let expected = competitors.len() / 2;
    if paired.pairings.len() != expected {
        warn!(
            %tournament_id,
            round_number,
            expected,
            produced = paired.pairings.len(),
            "pairing produced an unexpected number of boards"
        );
        return Err(ServiceError::InvalidState(format!(
            "pairing produced {} boards for {} players",
            paired.pairings.len(),
            competitors.len()
        )));
    }

    let now = SystemTime::now();
    let (round, matches) = round_records(tournament_id, &paired, now);
    store.create_round(round.clone(), matches.clone()).await?;

    if tournament.status == TournamentStatus::Upcoming {
        tournament.status = TournamentStatus::Active;
        tournament.updated_at = now;
        store.save_tournament(tournament).await?;
    }

    info!(
        %tournament_id,
        round_number,
        boards = paired.pairings.len(),
        bye = paired.bye.is_some(),
        "round paired"
    );

    let detail = RoundDetail {
        tournament_id,
        round: (&round).into(),
        pairings: pairing_views(&matches, &entries),
    };
    sse_events::broadcast_round_created(state, &detail);
    Ok(detail)
}

/// Turn the engine output into the rows to persist.
///
/// Boards keep the engine's numbering; the bye row comes last, white holding the
/// player and black left empty, already scored as a win.
fn round_records(
    tournament_id: Uuid,
    paired: &RoundPairings,
    now: SystemTime,
) -> (RoundEntity, Vec<MatchEntity>) {
    let round = RoundEntity {
        id: Uuid::new_v4(),
        tournament_id,
        round_number: paired.round,
        start_time: now,
        end_time: None,
        status: RoundStatus::Active,
    };

    let mut matches: Vec<MatchEntity> = paired
        .pairings
        .iter()
        .map(|pairing| MatchEntity {
            id: Uuid::new_v4(),
            round_id: round.id,
            white_id: Some(pairing.white),
            black_id: Some(pairing.black),
            result: None,
            board_number: pairing.board,
        })
        .collect();

    if let Some(recipient) = paired.bye.as_ref().and_then(HistoryEntry::bye_recipient) {
        let last_board = matches
            .iter()
            .map(|record| record.board_number)
            .max()
            .unwrap_or(0);
        matches.push(MatchEntity {
            id: Uuid::new_v4(),
            round_id: round.id,
            white_id: Some(recipient),
            black_id: None,
            result: Some(GameResult::WhiteWins),
            board_number: last_board + 1,
        });
    }

    (round, matches)
}

/// Store the result of a board in the active round.
pub async fn record_result(
    state: &SharedState,
    match_id: Uuid,
    request: RecordResultRequest,
) -> Result<PairingView, ServiceError> {
    let result = GameResult::parse(&request.result).ok_or_else(|| {
        ServiceError::InvalidInput(format!("unknown result `{}`", request.result))
    })?;

    let store = state.require_store().await?;
    let record = store
        .find_match(match_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` not found")))?;
    let tournament_id = store
        .find_round(record.round_id)
        .await?
        .map(|round| round.tournament_id)
        .ok_or_else(|| ServiceError::NotFound(format!("round `{}` not found", record.round_id)))?;

    let _gate = state.lock_rounds(tournament_id).await;
    let mut record = store
        .find_match(match_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` not found")))?;
    if record.is_bye() {
        return Err(ServiceError::InvalidState(
            "the result of a bye cannot be changed".into(),
        ));
    }
    let round = store
        .find_round(record.round_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("round `{}` not found", record.round_id)))?;
    if round.status != RoundStatus::Active {
        return Err(ServiceError::InvalidState(format!(
            "round {} is already completed",
            round.round_number
        )));
    }

    record.result = Some(result);
    store.save_match(record.clone()).await?;
    info!(%match_id, result = result.as_str(), "result recorded");

    let entries = store.list_entries(tournament_id).await?;
    let view = pairing_views(std::slice::from_ref(&record), &entries)
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::InvalidState("match could not be resolved".into()))?;
    sse_events::broadcast_result_recorded(state, tournament_id, round.round_number, &view);
    Ok(view)
}

/// Close the active round once every board has a result.
pub async fn complete_round(
    state: &SharedState,
    tournament_id: Uuid,
) -> Result<CompleteRoundResponse, ServiceError> {
    let _gate = state.lock_rounds(tournament_id).await;
    let store = state.require_store().await?;

    let mut tournament = load_tournament(&store, tournament_id).await?;
    let mut round = store
        .list_rounds(tournament_id)
        .await?
        .into_iter()
        .find(|round| round.status == RoundStatus::Active)
        .ok_or_else(|| ServiceError::InvalidState("no round is in progress".into()))?;

    let pending = store
        .list_round_matches(round.id)
        .await?
        .iter()
        .filter(|record| !record.is_bye() && record.result.is_none())
        .count();
    if pending > 0 {
        return Err(ServiceError::InvalidState(format!(
            "{pending} board(s) of round {} still have no result",
            round.round_number
        )));
    }

    let now = SystemTime::now();
    round.status = RoundStatus::Completed;
    round.end_time = Some(now);
    store.save_round(round.clone()).await?;

    if round.round_number >= tournament.total_rounds {
        tournament.status = TournamentStatus::Completed;
        tournament.updated_at = now;
        store.save_tournament(tournament.clone()).await?;
        info!(%tournament_id, "tournament completed");
    }
    info!(%tournament_id, round_number = round.round_number, "round completed");

    let response = CompleteRoundResponse {
        round: RoundSummary::from(&round),
        tournament_status: tournament.status,
    };
    sse_events::broadcast_round_completed(state, tournament_id, &response);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::Pairing;

    #[test]
    fn bye_row_follows_the_last_board() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let paired = RoundPairings {
            round: 2,
            pairings: vec![Pairing {
                board: 1,
                white: a,
                black: b,
            }],
            bye: Some(HistoryEntry::bye(2, c)),
        };

        let tournament_id = Uuid::new_v4();
        let (round, matches) = round_records(tournament_id, &paired, SystemTime::now());
        assert_eq!(round.round_number, 2);
        assert_eq!(round.tournament_id, tournament_id);
        assert_eq!(round.status, RoundStatus::Active);
        assert_eq!(matches.len(), 2);

        assert_eq!(matches[0].white_id, Some(a));
        assert_eq!(matches[0].black_id, Some(b));
        assert_eq!(matches[0].result, None);

        let bye = &matches[1];
        assert!(bye.is_bye());
        assert_eq!(bye.white_id, Some(c));
        assert_eq!(bye.black_id, None);
        assert_eq!(bye.result, Some(GameResult::WhiteWins));
        assert_eq!(bye.board_number, 2);
        assert!(matches.iter().all(|record| record.round_id == round.id));
    }

    #[test]
    fn even_rounds_have_no_bye_row() {
        let paired = RoundPairings {
            round: 1,
            pairings: Vec::new(),
            bye: None,
        };
        let (_, matches) = round_records(Uuid::new_v4(), &paired, SystemTime::now());
        assert!(matches.is_empty());
    }
}
