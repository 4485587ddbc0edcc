use serde::Serialize;
use utoipa::ToSchema;

/// Selectable content sources returned by the playlist catalogue route.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistCatalog {
    /// Identifiers accepted as a room's `contentSource` setting.
    pub playlists: Vec<String>,
}
