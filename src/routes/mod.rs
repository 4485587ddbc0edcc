use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

pub mod health;
pub mod playlists;
pub mod websocket;

/// Compose the API routes and the Swagger UI into the top-level router.
pub fn router(state: SharedState) -> Router<()> {
    let swagger: Router<SharedState> = SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::openapi())
        .into();

    health::router()
        .merge(playlists::router())
        .merge(websocket::router())
        .merge(swagger)
        .with_state(state)
}
