//! MongoDB-backed [`ResultStore`] used for the multiplayer leaderboard feed.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{DateTime, doc},
    options::{ClientOptions, IndexOptions},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{sync::RwLock, time::sleep};
use tracing::info;

use crate::dao::{
    ResultStore,
    models::GameResultEntity,
    storage::{StorageError, StorageResult},
};

const RESULT_COLLECTION_NAME: &str = "games";

/// Result alias for MongoDB operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Errors specific to the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Client options were invalid or the URI failed to parse.
    #[error("failed to configure MongoDB client: {source}")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The initial connection ping never succeeded.
    #[error("MongoDB unreachable after {attempts} attempts: {source}")]
    InitialPing {
        /// Number of ping attempts made before giving up.
        attempts: u32,
        /// Driver error from the final attempt.
        #[source]
        source: mongodb::error::Error,
    },
    /// Creating an index failed.
    #[error("failed to ensure index `{index}` on `{collection}`: {source}")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Index key description.
        index: &'static str,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// A health-check ping failed.
    #[error("MongoDB ping failed: {source}")]
    HealthPing {
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// An insert failed.
    #[error("failed to insert game result: {source}")]
    Insert {
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
}

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        let context = err.to_string();
        StorageError::new(context, err)
    }
}

/// Connection settings for the MongoDB result store.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    options: ClientOptions,
    database_name: String,
}

impl MongoConfig {
    /// Parse a connection URI, defaulting the database name to `audiofy`.
    pub async fn from_uri(uri: &str, database: Option<&str>) -> MongoResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let database_name = database
            .map(str::to_owned)
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| "audiofy".to_owned());
        Ok(Self {
            options,
            database_name,
        })
    }
}

struct RetryPolicy;

impl RetryPolicy {
    const MAX_ATTEMPTS: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 250;

    fn initial_delay() -> Duration {
        Duration::from_millis(Self::INITIAL_DELAY_MS)
    }

    fn next_delay(current: Duration) -> Duration {
        (current * 2).min(Duration::from_secs(5))
    }
}

async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut delay = RetryPolicy::initial_delay();

    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(err) => {
                attempts += 1;
                if attempts >= RetryPolicy::MAX_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing {
                        attempts,
                        source: err,
                    });
                }
                sleep(delay).await;
                delay = RetryPolicy::next_delay(delay);
            }
        }
    }

    Ok((client, database))
}

/// Document shape written to the `games` collection.
#[derive(Debug, Serialize, Deserialize)]
struct GameResultDocument {
    user_id: String,
    score: u32,
    game_mode: String,
    playlist: String,
    correct_answers: u32,
    total_questions: u32,
    accuracy: f64,
    room_code: String,
    placement: u32,
    total_players: u32,
    recorded_at: DateTime,
}

impl From<GameResultEntity> for GameResultDocument {
    fn from(value: GameResultEntity) -> Self {
        let recorded_ms = (value.recorded_at.unix_timestamp_nanos() / 1_000_000) as i64;
        Self {
            user_id: value.user_id.to_string(),
            score: value.score,
            game_mode: value.game_mode,
            playlist: value.playlist,
            correct_answers: value.correct_answers,
            total_questions: value.total_questions,
            accuracy: value.accuracy,
            room_code: value.room_code,
            placement: value.placement,
            total_players: value.total_players,
            recorded_at: DateTime::from_millis(recorded_ms),
        }
    }
}

/// MongoDB-backed result store, reconnectable in place.
#[derive(Clone)]
pub struct MongoResultStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (_client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }

    async fn collection(&self) -> Collection<GameResultDocument> {
        let guard = self.state.read().await;
        guard.database.collection(RESULT_COLLECTION_NAME)
    }
}

impl MongoResultStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (_client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        info!(collection = RESULT_COLLECTION_NAME, "MongoDB result store ready");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.inner.collection().await;

        // Leaderboard queries aggregate per user and per mode.
        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "game_mode": 1 })
            .options(
                IndexOptions::builder()
                    .name(Some("result_user_mode_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RESULT_COLLECTION_NAME,
                index: "user_id,game_mode",
                source,
            })?;

        Ok(())
    }
}

impl ResultStore for MongoResultStore {
    fn record_game_result(&self, result: GameResultEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let collection = inner.collection().await;
            collection
                .insert_one(GameResultDocument::from(result))
                .await
                .map_err(|source| MongoDaoError::Insert { source })?;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ping().await?;
            Ok(())
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.reconnect().await?;
            Ok(())
        })
    }
}
