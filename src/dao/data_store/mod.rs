pub mod memory;
#[cfg(feature = "postgres-store")]
pub mod postgres;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    GameSessionEntity, LeaderboardPage, LeaderboardQuery, NewLeaderboardEntry, NewPlayer,
    NewPurchase, PlayerEntity, PlayerStatsEntity, ProfileChanges, ProgressUpdate, PurchaseEntity,
    RankedEntryEntity, SessionStatsEntity, SortField, SubmittedEntry, TimeWindow, TopCriteria,
    TopPlayerEntity, WindowStatsEntity,
};
use crate::dao::storage::StorageResult;
use time::OffsetDateTime;

/// Abstraction over the persistence layer for players, runs, leaderboards,
/// and purchases. `sync_progress` and `record_purchase` are atomic: either
/// every effect applies or none does.
pub trait DataStore: Send + Sync {
    fn create_player(&self, player: NewPlayer) -> BoxFuture<'static, StorageResult<PlayerEntity>>;
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    fn find_player_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Stamp the player's `last_login`.
    fn record_login(
        &self,
        id: Uuid,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Apply a partial profile update. Returns `false` when the player does
    /// not exist.
    fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Merge reported progress into the player aggregate and optionally
    /// record one session row, transactionally. Returns `false` when the
    /// player does not exist (nothing is written in that case).
    fn sync_progress(
        &self,
        id: Uuid,
        progress: ProgressUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn player_stats(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerStatsEntity>>>;
    /// Replace the player's achievement set wholesale. Returns `false` when
    /// the player does not exist.
    fn replace_achievements(
        &self,
        id: Uuid,
        achievements: Vec<String>,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Aggregates over the player's sessions created inside the window.
    fn session_stats(
        &self,
        player_id: Uuid,
        window: TimeWindow,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<SessionStatsEntity>>;
    fn list_sessions(
        &self,
        player_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<GameSessionEntity>>>;
    /// Record a purchase; credits coins in the same transaction when asked.
    fn record_purchase(
        &self,
        purchase: NewPurchase,
    ) -> BoxFuture<'static, StorageResult<PurchaseEntity>>;
    fn list_purchases(
        &self,
        player_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<PurchaseEntity>>>;
    /// Insert a leaderboard entry and return its snapshot rank. The rank
    /// lookup is deliberately not serialized against concurrent submissions.
    fn submit_entry(
        &self,
        entry: NewLeaderboardEntry,
    ) -> BoxFuture<'static, StorageResult<SubmittedEntry>>;
    fn list_entries(
        &self,
        query: LeaderboardQuery,
    ) -> BoxFuture<'static, StorageResult<LeaderboardPage>>;
    /// The player's best entry in the window under the sort field, with its
    /// computed rank.
    fn best_entry(
        &self,
        player_id: Uuid,
        window: TimeWindow,
        sort: SortField,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<RankedEntryEntity>>>;
    fn window_stats(
        &self,
        window: TimeWindow,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<WindowStatsEntity>>;
    /// Every player joined with their best windowed entry, ordered by the
    /// criteria, positional ranks starting at 1.
    fn top_players(
        &self,
        window: TimeWindow,
        criteria: TopCriteria,
        limit: i64,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Vec<TopPlayerEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
