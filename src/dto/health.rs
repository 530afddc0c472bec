use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    /// Requests touching tournaments fail with 503 until the store is back.
    Degraded,
}

/// Body of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// A store is installed, even if its last probe failed.
    pub store_connected: bool,
}

impl HealthResponse {
    pub fn new(store_connected: bool, healthy: bool) -> Self {
        let status = if store_connected && healthy {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };
        Self {
            status,
            store_connected,
        }
    }
}
