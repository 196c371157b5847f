//! Local offline cache backed by SQLite.
//!
//! The cache is read-through only: it has no write authority over the
//! server-held state and is superseded on every successful sync.

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::dto::leaderboard::RankedEntryDto;

/// Failures raised by the local cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt cached payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Locally persisted snapshot of the run aggregates, written at checkpoints
/// (pause, game over) and after each successful sync.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProgress {
    pub score: i64,
    pub distance: f64,
    pub coins: i64,
    pub level: i32,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS local_progress (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        score INTEGER NOT NULL,
        distance REAL NOT NULL,
        coins INTEGER NOT NULL,
        level INTEGER NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS leaderboard_cache (
        window TEXT PRIMARY KEY,
        payload TEXT NOT NULL,
        fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
];

/// SQLite-backed cache for progress, settings, and leaderboard snapshots.
pub struct LocalCache {
    conn: Connection,
}

impl LocalCache {
    /// Open (or create) the cache database at the given path.
    pub fn open(path: &str) -> CacheResult<Self> {
        Self::prepare(Connection::open(path)?)
    }

    /// In-memory cache, used by tests.
    pub fn open_in_memory() -> CacheResult<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> CacheResult<Self> {
        for statement in SCHEMA {
            conn.execute(statement, [])?;
        }
        Ok(Self { conn })
    }

    /// Overwrite the single progress snapshot row.
    pub fn save_progress(&self, progress: &LocalProgress) -> CacheResult<()> {
        self.conn.execute(
            "INSERT INTO local_progress (id, score, distance, coins, level, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET
                score = excluded.score,
                distance = excluded.distance,
                coins = excluded.coins,
                level = excluded.level,
                updated_at = excluded.updated_at",
            params![
                progress.score,
                progress.distance,
                progress.coins,
                progress.level
            ],
        )?;
        Ok(())
    }

    /// Latest progress snapshot, if one was ever written.
    pub fn load_progress(&self) -> CacheResult<Option<LocalProgress>> {
        let row = self
            .conn
            .query_row(
                "SELECT score, distance, coins, level FROM local_progress WHERE id = 1",
                [],
                |row| {
                    Ok(LocalProgress {
                        score: row.get(0)?,
                        distance: row.get(1)?,
                        coins: row.get(2)?,
                        level: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Store one settings value, overwriting any previous one.
    pub fn set_setting(&self, key: &str, value: &str) -> CacheResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Fetch one settings value.
    pub fn get_setting(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Replace the cached snapshot of one leaderboard window.
    pub fn replace_leaderboard(
        &self,
        window: &str,
        entries: &[RankedEntryDto],
    ) -> CacheResult<()> {
        let payload = serde_json::to_string(entries)?;
        self.conn.execute(
            "INSERT INTO leaderboard_cache (window, payload, fetched_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(window) DO UPDATE SET
                payload = excluded.payload,
                fetched_at = excluded.fetched_at",
            params![window, payload],
        )?;
        Ok(())
    }

    /// Cached snapshot of one leaderboard window, if any.
    pub fn cached_leaderboard(&self, window: &str) -> CacheResult<Option<Vec<RankedEntryDto>>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM leaderboard_cache WHERE window = ?1",
                params![window],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(rank: i64, score: i64) -> RankedEntryDto {
        serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "rank": rank,
            "score": score,
            "distance": 10.0,
            "level": 1,
            "player": { "username": "Guest", "avatar": null, "level": null },
            "createdAt": "2024-03-15T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn progress_snapshot_is_a_single_superseded_row() {
        let cache = LocalCache::open_in_memory().unwrap();
        assert_eq!(cache.load_progress().unwrap(), None);

        cache
            .save_progress(&LocalProgress {
                score: 100,
                distance: 40.0,
                coins: 3,
                level: 1,
            })
            .unwrap();
        cache
            .save_progress(&LocalProgress {
                score: 250,
                distance: 90.0,
                coins: 8,
                level: 2,
            })
            .unwrap();

        let progress = cache.load_progress().unwrap().unwrap();
        assert_eq!(progress.score, 250);
        assert_eq!(progress.level, 2);
    }

    #[test]
    fn settings_overwrite_in_place() {
        let cache = LocalCache::open_in_memory().unwrap();
        cache.set_setting("soundEnabled", "true").unwrap();
        cache.set_setting("soundEnabled", "false").unwrap();
        assert_eq!(
            cache.get_setting("soundEnabled").unwrap().as_deref(),
            Some("false")
        );
        assert_eq!(cache.get_setting("missing").unwrap(), None);
    }

    #[test]
    fn leaderboard_snapshot_round_trips_and_is_replaced() {
        let cache = LocalCache::open_in_memory().unwrap();
        assert!(cache.cached_leaderboard("all").unwrap().is_none());

        cache
            .replace_leaderboard("all", &[entry(1, 300), entry(2, 200)])
            .unwrap();
        cache.replace_leaderboard("all", &[entry(1, 500)]).unwrap();

        let cached = cache.cached_leaderboard("all").unwrap().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].score, 500);
        assert!(cache.cached_leaderboard("daily").unwrap().is_none());
    }
}
