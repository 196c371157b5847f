//! Shared application state: the installed storage backend, the degraded
//! flag, and the immutable runtime configuration.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::data_store::DataStore, error::ServiceError};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state shared by every route and background task.
pub struct AppState {
    data_store: RwLock<Option<Arc<dyn DataStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            data_store: RwLock::new(None),
            degraded: degraded_tx,
            config,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current data store, if one is installed.
    pub async fn data_store(&self) -> Option<Arc<dyn DataStore>> {
        let guard = self.data_store.read().await;
        guard.as_ref().cloned()
    }

    /// Data store handle, or the degraded-mode service error.
    pub async fn require_data_store(&self) -> Result<Arc<dyn DataStore>, ServiceError> {
        self.data_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new data store implementation and leave degraded mode.
    pub async fn install_data_store(&self, store: Arc<dyn DataStore>) {
        {
            let mut guard = self.data_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current data store and enter degraded mode.
    pub async fn clear_data_store(&self) {
        {
            let mut guard = self.data_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}
