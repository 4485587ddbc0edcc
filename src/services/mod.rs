/// Authoritative per-room round clock.
pub mod clock;
/// Round content provisioning (catalogue, provider, question builder).
pub mod content;
/// OpenAPI documentation generation.
pub mod documentation;
/// Outbound event delivery to client sockets.
pub mod events;
/// Health check service.
pub mod health_service;
/// Fire-and-forget result persistence.
pub mod results;
/// Room coordinator handlers for client-initiated mutations.
pub mod room_service;
/// Storage connection supervision and degraded mode management.
pub mod storage_supervisor;
/// WebSocket connection and message handling service.
pub mod ws_service;
