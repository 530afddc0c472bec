use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        round::{CompleteRoundResponse, PairingView, RoundDetail},
        sse::{
            ResultRecordedEvent, RoundCompletedEvent, RoundCreatedEvent, ServerEvent, SystemStatus,
        },
    },
    state::SharedState,
};

const EVENT_ROUND_CREATED: &str = "round.created";
const EVENT_RESULT_RECORDED: &str = "result.recorded";
const EVENT_ROUND_COMPLETED: &str = "round.completed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the boards of a freshly paired round.
pub fn broadcast_round_created(state: &SharedState, detail: &RoundDetail) {
    let payload = RoundCreatedEvent(detail.clone());
    send_public_event(state, EVENT_ROUND_CREATED, &payload);
    send_admin_event(state, EVENT_ROUND_CREATED, &payload);
}

pub fn broadcast_result_recorded(
    state: &SharedState,
    tournament_id: Uuid,
    round_number: u32,
    pairing: &PairingView,
) {
    let payload = ResultRecordedEvent {
        tournament_id,
        round_number,
        pairing: pairing.clone(),
    };
    send_public_event(state, EVENT_RESULT_RECORDED, &payload);
    send_admin_event(state, EVENT_RESULT_RECORDED, &payload);
}

pub fn broadcast_round_completed(
    state: &SharedState,
    tournament_id: Uuid,
    response: &CompleteRoundResponse,
) {
    let payload = RoundCompletedEvent {
        tournament_id,
        round: response.round.clone(),
        tournament_status: response.tournament_status,
    };
    send_public_event(state, EVENT_ROUND_COMPLETED, &payload);
    send_admin_event(state, EVENT_ROUND_COMPLETED, &payload);
}

/// Forward degraded-mode changes to both SSE streams for as long as the state lives.
pub fn spawn_status_notifier(state: SharedState) -> JoinHandle<()> {
    let mut watcher = state.degraded_watcher();
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let degraded = *watcher.borrow_and_update();
            info!(degraded, "storage status changed");
            let payload = SystemStatus { degraded };
            send_public_event(&state, EVENT_SYSTEM_STATUS, &payload);
            send_admin_event(&state, EVENT_SYSTEM_STATUS, &payload);
        }
    })
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(payload) => {
            let delivered = state.public_sse().broadcast(payload);
            debug!(event, delivered, "public SSE event sent");
        }
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

fn send_admin_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(payload) => {
            let delivered = state.admin_sse().broadcast(payload);
            debug!(event, delivered, "admin SSE event sent");
        }
        Err(err) => warn!(event, error = %err, "failed to serialize admin SSE payload"),
    }
}
