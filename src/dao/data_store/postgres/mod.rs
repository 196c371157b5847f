//! PostgreSQL [`DataStore`](crate::dao::data_store::DataStore) backend built
//! on an sqlx connection pool. The sync and purchase paths run inside a
//! single database transaction each; that transaction is the only
//! concurrency-control mechanism.

mod schema;
mod store;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::dao::storage::{StorageError, StorageResult};

pub use schema::ensure_schema;

const MAX_CONNECTIONS: u32 = 20;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// PostgreSQL-backed store sharing one connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to the database and make sure the schema and indexes exist.
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .map_err(|err| StorageError::unavailable("connecting to PostgreSQL".into(), err))?;
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (the schema is assumed to be in place).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate an sqlx error into the backend-agnostic storage error.
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StorageError::conflict(format!("{context}: duplicate value"));
        }
    }
    StorageError::unavailable(context.to_string(), err)
}
