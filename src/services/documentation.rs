use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Audiofy Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::playlists::list_playlists,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::catalog::PlaylistCatalog,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::RoomSettingsDto,
            crate::dto::room::RoundData,
            crate::dto::room::RankingEntry,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "playlists", description = "Content source catalogue"),
        (name = "game", description = "WebSocket operations for game clients"),
    )
)]
pub struct ApiDoc;
