use axum::{Json, Router, routing::get};

use crate::{dto::catalog::PlaylistCatalog, services::content::catalog};

#[utoipa::path(
    get,
    path = "/api/playlists",
    responses((status = 200, description = "Selectable content sources", body = PlaylistCatalog))
)]
/// List the content sources a host can pick for a room.
pub async fn list_playlists() -> Json<PlaylistCatalog> {
    Json(PlaylistCatalog {
        playlists: catalog::available_sources()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    })
}

/// Configure the playlist catalogue subtree.
pub fn router() -> Router<crate::state::SharedState> {
    Router::new().route("/api/playlists", get(list_playlists))
}
