use serde::Serialize;
use utoipa::ToSchema;

/// Overall service condition reported by `/healthcheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Storage reachable, all routes answering.
    Ok,
    /// Storage unreachable; storage-backed routes answer 503.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: ServiceStatus,
}

impl HealthResponse {
    /// Status derived from the degraded flag.
    pub fn from_degraded(degraded: bool) -> Self {
        let status = if degraded {
            ServiceStatus::Degraded
        } else {
            ServiceStatus::Ok
        };
        Self { status }
    }
}
