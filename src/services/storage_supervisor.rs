//! Background task that keeps the result store connected.
//!
//! The store is installed into the shared state while healthy and removed
//! whenever the backend stops answering, so gameplay paths only ever see a
//! present-and-working store or no store at all.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{ResultStore, storage::StorageError},
    state::SharedState,
};

/// How often a healthy store is pinged.
const PING_INTERVAL: Duration = Duration::from_secs(5);
/// In-place reconnect attempts after a failed ping before giving the
/// connection up and dialling from scratch.
const RECONNECT_ATTEMPTS: u32 = 3;

/// Doubling delay between retries, clamped to a ceiling.
struct Backoff {
    delay: Duration,
}

impl Backoff {
    const FLOOR: Duration = Duration::from_millis(500);
    const CEILING: Duration = Duration::from_secs(15);

    fn new() -> Self {
        Backoff { delay: Self::FLOOR }
    }

    fn reset(&mut self) {
        self.delay = Self::FLOOR;
    }

    /// Take the current delay and double it for next time.
    fn next(&mut self) -> Duration {
        let delay = self.delay;
        self.delay = (self.delay * 2).min(Self::CEILING);
        delay
    }

    async fn wait(&mut self) {
        sleep(self.next()).await;
    }
}

/// Dial the store and supervise it for as long as it stays reachable,
/// re-dialling with backoff whenever supervision gives up on a connection.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn ResultStore>, StorageError>> + Send,
{
    let mut backoff = Backoff::new();

    loop {
        match connect().await {
            Ok(store) => {
                backoff.reset();
                supervise(&state, store).await;
            }
            Err(err) => {
                warn!(error = %err, "result store connection failed");
            }
        }
        backoff.wait().await;
    }
}

/// Ping the store on an interval; on failure, drop into degraded mode and try
/// to reconnect in place. Returns once the connection is beyond saving.
async fn supervise(state: &SharedState, store: Arc<dyn ResultStore>) {
    state.install_result_store(store.clone()).await;
    info!("result store online");

    loop {
        sleep(PING_INTERVAL).await;

        if store.health_check().await.is_ok() {
            if state.is_degraded().await {
                info!("result store healthy again");
                state.install_result_store(store.clone()).await;
            }
            continue;
        }

        warn!("result store ping failed; suspending result writes");
        state.clear_result_store().await;

        if !reconnect_in_place(store.as_ref()).await {
            warn!("result store unreachable; dialling a fresh connection");
            return;
        }

        info!("result store reconnected");
        state.install_result_store(store.clone()).await;
    }
}

async fn reconnect_in_place(store: &dyn ResultStore) -> bool {
    let mut backoff = Backoff::new();

    for attempt in 1..=RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => return true,
            Err(err) => {
                warn!(attempt, error = %err, "result store reconnect attempt failed");
                backoff.wait().await;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_floor_and_caps_at_ceiling() {
        let mut backoff = Backoff::new();

        assert_eq!(backoff.next(), Backoff::FLOOR);
        assert_eq!(backoff.next(), Duration::from_secs(1));
        assert_eq!(backoff.next(), Duration::from_secs(2));

        for _ in 0..16 {
            backoff.next();
        }
        assert_eq!(backoff.next(), Backoff::CEILING);

        backoff.reset();
        assert_eq!(backoff.next(), Backoff::FLOOR);
    }
}
