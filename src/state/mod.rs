pub mod room;
pub mod scoring;
pub mod store;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc};

use crate::{
    config::AppConfig,
    dao::ResultStore,
    services::content::RoundContentProvider,
    state::{
        room::ConnectionId,
        store::{ConnectionRegistry, RoomStore},
    },
};

/// Cheaply cloneable handle to the central application state.
pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push messages to a connected client socket.
pub struct ClientConnection {
    /// Connection identifier assigned at socket upgrade.
    pub id: ConnectionId,
    /// Writer-task channel for outbound frames.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state owning the room map, connection registries, the
/// content provider, and the optional result store.
///
/// Constructed once in `main` (or per test) and injected everywhere; there is
/// no module-level singleton.
pub struct AppState {
    config: AppConfig,
    rooms: RoomStore,
    registry: ConnectionRegistry,
    clients: DashMap<ConnectionId, ClientConnection>,
    provider: Arc<dyn RoundContentProvider>,
    result_store: RwLock<Option<Arc<dyn ResultStore>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    ///
    /// The application starts in degraded mode until a result store is
    /// installed; gameplay works either way.
    pub fn new(config: AppConfig, provider: Arc<dyn RoundContentProvider>) -> SharedState {
        Arc::new(Self {
            config,
            rooms: RoomStore::new(),
            registry: ConnectionRegistry::new(),
            clients: DashMap::new(),
            provider,
            result_store: RwLock::new(None),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of live rooms keyed by their code.
    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    /// Index from connection id to joined room code.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Registry of active client sockets keyed by connection id.
    pub fn clients(&self) -> &DashMap<ConnectionId, ClientConnection> {
        &self.clients
    }

    /// Content provider used to fetch round questions at game start.
    pub fn provider(&self) -> Arc<dyn RoundContentProvider> {
        self.provider.clone()
    }

    /// Obtain a handle to the current result store, if one is installed.
    pub async fn result_store(&self) -> Option<Arc<dyn ResultStore>> {
        let guard = self.result_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a result store implementation, leaving degraded mode.
    pub async fn install_result_store(&self, store: Arc<dyn ResultStore>) {
        let mut guard = self.result_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current result store, entering degraded mode.
    pub async fn clear_result_store(&self) {
        let mut guard = self.result_store.write().await;
        guard.take();
    }

    /// Whether the application is running without a result store. Gameplay is
    /// unaffected; finished games simply skip persistence.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.result_store.read().await;
        guard.is_none()
    }
}
