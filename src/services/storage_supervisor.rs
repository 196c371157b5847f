//! Background task owning the storage lifecycle.
//!
//! The API boots before the database is reachable and keeps answering in
//! degraded mode. This task connects with exponential backoff, installs the
//! store into the shared state, then keeps polling its health and flips the
//! degraded flag on the way down and back up.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{data_store::DataStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(10);
const HEALTH_INTERVAL: Duration = Duration::from_secs(5);
const REVIVE_ATTEMPTS: u32 = 3;

/// Doubling delay capped at [`MAX_BACKOFF`].
struct Backoff {
    delay: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            delay: INITIAL_BACKOFF,
        }
    }

    async fn wait(&mut self) {
        sleep(self.delay).await;
        self.delay = (self.delay * 2).min(MAX_BACKOFF);
    }
}

/// Connect, install, and babysit the storage backend. Never returns.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn DataStore>, StorageError>> + Send,
{
    let mut backoff = Backoff::new();
    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                backoff.wait().await;
                continue;
            }
        };

        state.install_data_store(store.clone()).await;
        info!("storage connection established; leaving degraded mode");
        backoff = Backoff::new();

        watch(&state, store.as_ref()).await;
        warn!("storage lost; reconnecting from scratch");
    }
}

/// Poll the store's health until it is lost for good. On a failed check the
/// store gets [`REVIVE_ATTEMPTS`] reconnect tries before we give up on it.
async fn watch(state: &SharedState, store: &dyn DataStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded().await {
                info!("storage healthy again; leaving degraded mode");
                state.update_degraded(false).await;
            }
            sleep(HEALTH_INTERVAL).await;
            continue;
        }

        if revive(state, store).await {
            state.update_degraded(false).await;
            sleep(HEALTH_INTERVAL).await;
        } else {
            warn!("exhausted storage reconnect attempts; staying in degraded mode");
            return;
        }
    }
}

/// Try to bring a failing store back. Degraded mode starts at the first
/// failed attempt, not at the failed health check that led here.
async fn revive(state: &SharedState, store: &dyn DataStore) -> bool {
    let mut backoff = Backoff::new();
    for attempt in 0..REVIVE_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!("storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect failed; entering degraded mode"
                    );
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                backoff.wait().await;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use time::OffsetDateTime;
    use tokio::time::{advance, pause};
    use uuid::Uuid;

    use crate::config::AppConfig;
    use crate::dao::models::{
        GameSessionEntity, LeaderboardPage, LeaderboardQuery, NewLeaderboardEntry, NewPlayer,
        NewPurchase, PlayerEntity, PlayerStatsEntity, ProfileChanges, ProgressUpdate,
        PurchaseEntity, RankedEntryEntity, SessionStatsEntity, SortField, SubmittedEntry,
        TimeWindow, TopCriteria, TopPlayerEntity, WindowStatsEntity,
    };
    use crate::dao::storage::StorageResult;
    use crate::state::AppState;

    /// Store whose health checks and reconnects always fail.
    struct DeadStore;

    impl DataStore for DeadStore {
        fn create_player(
            &self,
            _: NewPlayer,
        ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
            unimplemented!()
        }
        fn find_player(
            &self,
            _: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
            unimplemented!()
        }
        fn find_player_by_email(
            &self,
            _: String,
        ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
            unimplemented!()
        }
        fn record_login(
            &self,
            _: Uuid,
            _: OffsetDateTime,
        ) -> BoxFuture<'static, StorageResult<()>> {
            unimplemented!()
        }
        fn update_profile(
            &self,
            _: Uuid,
            _: ProfileChanges,
            _: OffsetDateTime,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            unimplemented!()
        }
        fn sync_progress(
            &self,
            _: Uuid,
            _: ProgressUpdate,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            unimplemented!()
        }
        fn player_stats(
            &self,
            _: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<PlayerStatsEntity>>> {
            unimplemented!()
        }
        fn replace_achievements(
            &self,
            _: Uuid,
            _: Vec<String>,
            _: OffsetDateTime,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            unimplemented!()
        }
        fn session_stats(
            &self,
            _: Uuid,
            _: TimeWindow,
            _: OffsetDateTime,
        ) -> BoxFuture<'static, StorageResult<SessionStatsEntity>> {
            unimplemented!()
        }
        fn list_sessions(
            &self,
            _: Uuid,
            _: i64,
            _: i64,
        ) -> BoxFuture<'static, StorageResult<Vec<GameSessionEntity>>> {
            unimplemented!()
        }
        fn record_purchase(
            &self,
            _: NewPurchase,
        ) -> BoxFuture<'static, StorageResult<PurchaseEntity>> {
            unimplemented!()
        }
        fn list_purchases(
            &self,
            _: Uuid,
            _: i64,
            _: i64,
        ) -> BoxFuture<'static, StorageResult<Vec<PurchaseEntity>>> {
            unimplemented!()
        }
        fn submit_entry(
            &self,
            _: NewLeaderboardEntry,
        ) -> BoxFuture<'static, StorageResult<SubmittedEntry>> {
            unimplemented!()
        }
        fn list_entries(
            &self,
            _: LeaderboardQuery,
        ) -> BoxFuture<'static, StorageResult<LeaderboardPage>> {
            unimplemented!()
        }
        fn best_entry(
            &self,
            _: Uuid,
            _: TimeWindow,
            _: SortField,
            _: OffsetDateTime,
        ) -> BoxFuture<'static, StorageResult<Option<RankedEntryEntity>>> {
            unimplemented!()
        }
        fn window_stats(
            &self,
            _: TimeWindow,
            _: OffsetDateTime,
        ) -> BoxFuture<'static, StorageResult<WindowStatsEntity>> {
            unimplemented!()
        }
        fn top_players(
            &self,
            _: TimeWindow,
            _: TopCriteria,
            _: i64,
            _: OffsetDateTime,
        ) -> BoxFuture<'static, StorageResult<Vec<TopPlayerEntity>>> {
            unimplemented!()
        }
        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(StorageError::unavailable("dead".to_string(), std::io::Error::other("dead"))) })
        }
        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(StorageError::unavailable("dead".to_string(), std::io::Error::other("dead"))) })
        }
    }

    #[tokio::test]
    async fn unhealthy_store_flips_the_degraded_flag() {
        pause();
        let state = AppState::new(AppConfig::for_tests());
        let mut watcher = state.degraded_watcher();

        tokio::spawn(run(state.clone(), || async {
            Ok(Arc::new(DeadStore) as Arc<dyn DataStore>)
        }));

        // Installation leaves degraded mode first.
        watcher.wait_for(|degraded| !degraded).await.unwrap();

        // The first failed health check plus failed revive flips it back.
        for _ in 0..20 {
            advance(Duration::from_secs(2)).await;
        }
        assert!(state.is_degraded().await);
    }
}
