use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the installed tournament store; a failing probe reports degraded without
/// waiting for the supervisor to notice.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.store().await else {
        warn!("no tournament store installed (degraded mode)");
        return HealthResponse::new(false, false);
    };

    let healthy = match store.health_check().await {
        Ok(()) => !state.is_degraded().await,
        Err(err) => {
            warn!(error = %err, "tournament store health check failed");
            false
        }
    };
    HealthResponse::new(true, healthy)
}
