use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the current health payload while logging storage issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.result_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    let active_rooms = state.rooms().len();
    if state.is_degraded().await {
        HealthResponse::degraded(active_rooms)
    } else {
        HealthResponse::ok(active_rooms)
    }
}
