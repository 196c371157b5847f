//! Health reporting backed by a live storage ping.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the installed store and report `ok` or `degraded`. A failed ping
/// reports degraded immediately, without waiting for the supervisor's next
/// poll to flip the shared flag.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage_ok = match state.data_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        None => {
            warn!("no storage backend installed");
            false
        }
    };

    HealthResponse::from_degraded(!storage_ok || state.is_degraded().await)
}
