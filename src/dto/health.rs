use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of currently active rooms.
    pub active_rooms: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is fully operational.
    pub fn ok(active_rooms: usize) -> Self {
        Self {
            status: "ok".to_string(),
            active_rooms,
        }
    }

    /// Create a health response indicating result persistence is unavailable.
    pub fn degraded(active_rooms: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            active_rooms,
        }
    }
}
