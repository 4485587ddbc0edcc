//! Persistence layer: the [`ResultStore`] abstraction and its backends.

pub mod models;
#[cfg(feature = "mongo-store")]
pub mod mongo;
pub mod storage;

use futures::future::BoxFuture;

use crate::dao::{models::GameResultEntity, storage::StorageResult};

/// Abstraction over the persistence sink for finished-game results.
///
/// Implementations must be cheap to clone behind an `Arc` and safe to call
/// from detached tasks; gameplay never blocks on any of these methods.
pub trait ResultStore: Send + Sync {
    /// Record one player's result for a finished game.
    fn record_game_result(&self, result: GameResultEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap liveness probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
