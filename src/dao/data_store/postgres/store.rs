//! [`DataStore`] implementation over the shared PostgreSQL pool.

use futures::future::BoxFuture;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::data_store::DataStore;
use crate::dao::data_store::postgres::{PostgresStore, map_db_error};
use crate::dao::models::{
    GameSessionEntity, LeaderboardPage, LeaderboardQuery, NewLeaderboardEntry, NewPlayer,
    NewPurchase, PlayerEntity, PlayerStatsEntity, ProfileChanges, ProgressUpdate, PurchaseEntity,
    RankedEntryEntity, SessionStatsEntity, SortField, SubmittedEntry, TimeWindow, TopCriteria,
    TopPlayerEntity, WindowStatsEntity,
};
use crate::dao::storage::StorageResult;

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: Uuid,
    username: String,
    email: Option<String>,
    password_hash: Option<String>,
    avatar: Option<String>,
    total_score: i64,
    best_distance: f64,
    total_coins: i64,
    level: i32,
    experience: i64,
    achievements: Json<Vec<String>>,
    skins: Vec<String>,
    current_skin: String,
    is_guest: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    last_login: Option<OffsetDateTime>,
    last_sync_at: Option<OffsetDateTime>,
}

impl From<PlayerRow> for PlayerEntity {
    fn from(row: PlayerRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            avatar: row.avatar,
            total_score: row.total_score,
            best_distance: row.best_distance,
            total_coins: row.total_coins,
            level: row.level,
            experience: row.experience,
            achievements: row.achievements.0,
            skins: row.skins,
            current_skin: row.current_skin,
            is_guest: row.is_guest,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login: row.last_login,
            last_sync_at: row.last_sync_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    player_id: Uuid,
    score: i64,
    distance: f64,
    duration_seconds: i64,
    obstacles_avoided: i32,
    obstacles_hit: i32,
    coins_collected: i64,
    power_ups_used: i32,
    level_reached: i32,
    created_at: OffsetDateTime,
}

impl From<SessionRow> for GameSessionEntity {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            player_id: row.player_id,
            score: row.score,
            distance: row.distance,
            duration_seconds: row.duration_seconds,
            obstacles_avoided: row.obstacles_avoided,
            obstacles_hit: row.obstacles_hit,
            coins_collected: row.coins_collected,
            power_ups_used: row.power_ups_used,
            level_reached: row.level_reached,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RankedRow {
    id: Uuid,
    rank: i64,
    score: i64,
    distance: f64,
    level: i32,
    username: Option<String>,
    avatar: Option<String>,
    player_level: Option<i32>,
    created_at: OffsetDateTime,
}

impl From<RankedRow> for RankedEntryEntity {
    fn from(row: RankedRow) -> Self {
        Self {
            id: row.id,
            rank: row.rank,
            score: row.score,
            distance: row.distance,
            level: row.level,
            username: row.username,
            avatar: row.avatar,
            player_level: row.player_level,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TopPlayerRow {
    id: Uuid,
    username: String,
    avatar: Option<String>,
    level: i32,
    total_coins: i64,
    best_score: i64,
    best_distance: f64,
    best_level: i32,
    rank: i64,
}

impl From<TopPlayerRow> for TopPlayerEntity {
    fn from(row: TopPlayerRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            avatar: row.avatar,
            level: row.level,
            total_coins: row.total_coins,
            best_score: row.best_score,
            best_distance: row.best_distance,
            best_level: row.best_level,
            rank: row.rank,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    player_id: Uuid,
    item_id: String,
    item_type: String,
    price: f64,
    currency: String,
    status: String,
    transaction_id: Option<String>,
    created_at: OffsetDateTime,
}

impl From<PurchaseRow> for PurchaseEntity {
    fn from(row: PurchaseRow) -> Self {
        Self {
            id: row.id,
            player_id: row.player_id,
            item_id: row.item_id,
            item_type: row.item_type,
            price: row.price,
            currency: row.currency,
            status: row.status,
            transaction_id: row.transaction_id,
            created_at: row.created_at,
        }
    }
}

/// SQL for one page of entries with per-row count-based ranks. The sort
/// column is interpolated from [`SortField::column`], a closed set of
/// constants; everything request-derived is a bound parameter.
fn list_sql(sort: SortField) -> String {
    let column = sort.column();
    format!(
        "SELECT l.id, l.score, l.distance, l.level, l.created_at, \
                p.username AS username, p.avatar AS avatar, p.level AS player_level, \
                (SELECT COUNT(*) FROM leaderboard g \
                  WHERE g.time_range = l.time_range \
                    AND ($2::timestamptz IS NULL OR g.created_at >= $2) \
                    AND g.{column} > l.{column}) + 1 AS rank \
           FROM leaderboard l \
           LEFT JOIN players p ON p.id = l.player_id \
          WHERE l.time_range = $1 \
            AND ($2::timestamptz IS NULL OR l.created_at >= $2) \
          ORDER BY l.{column} DESC, l.created_at ASC \
          LIMIT $3 OFFSET $4"
    )
}

fn best_entry_sql(sort: SortField) -> String {
    let column = sort.column();
    format!(
        "SELECT l.id, l.score, l.distance, l.level, l.created_at, \
                p.username AS username, p.avatar AS avatar, p.level AS player_level, \
                (SELECT COUNT(*) FROM leaderboard g \
                  WHERE g.time_range = l.time_range \
                    AND ($2::timestamptz IS NULL OR g.created_at >= $2) \
                    AND g.{column} > l.{column}) + 1 AS rank \
           FROM leaderboard l \
           LEFT JOIN players p ON p.id = l.player_id \
          WHERE l.player_id = $3 \
            AND l.time_range = $1 \
            AND ($2::timestamptz IS NULL OR l.created_at >= $2) \
          ORDER BY l.{column} DESC \
          LIMIT 1"
    )
}

/// SQL joining every player with their best windowed entry. The ordering
/// expression comes from [`TopCriteria::order_expr`], a closed set.
fn top_players_sql(criteria: TopCriteria) -> String {
    let order = criteria.order_expr();
    format!(
        "SELECT p.id, p.username, p.avatar, p.level, p.total_coins, \
                COALESCE(MAX(l.score), 0) AS best_score, \
                COALESCE(MAX(l.distance), 0::float8) AS best_distance, \
                COALESCE(MAX(l.level), 0) AS best_level, \
                ROW_NUMBER() OVER (ORDER BY {order} DESC) AS rank \
           FROM players p \
           LEFT JOIN leaderboard l ON l.player_id = p.id \
            AND l.time_range = $1 \
            AND ($2::timestamptz IS NULL OR l.created_at >= $2) \
          GROUP BY p.id, p.username, p.avatar, p.level, p.total_coins \
          ORDER BY {order} DESC \
          LIMIT $3"
    )
}

impl DataStore for PostgresStore {
    fn create_player(&self, player: NewPlayer) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let row: PlayerRow = sqlx::query_as(
                "INSERT INTO players \
                   (username, email, password_hash, skins, current_skin, is_guest, created_at, updated_at) \
                 VALUES ($1, $2, $3, ARRAY[$4::text], $4, $5, $6, $6) \
                 RETURNING *",
            )
            .bind(&player.username)
            .bind(&player.email)
            .bind(&player.password_hash)
            .bind(&player.starting_skin)
            .bind(player.is_guest)
            .bind(player.now)
            .fetch_one(&pool)
            .await
            .map_err(|err| map_db_error("creating player", err))?;
            Ok(row.into())
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let row: Option<PlayerRow> = sqlx::query_as("SELECT * FROM players WHERE id = $1")
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(|err| map_db_error("looking up player", err))?;
            Ok(row.map(Into::into))
        })
    }

    fn find_player_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let row: Option<PlayerRow> = sqlx::query_as("SELECT * FROM players WHERE email = $1")
                .bind(&email)
                .fetch_optional(&pool)
                .await
                .map_err(|err| map_db_error("looking up player by email", err))?;
            Ok(row.map(Into::into))
        })
    }

    fn record_login(
        &self,
        id: Uuid,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            sqlx::query("UPDATE players SET last_login = $2, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(now)
                .execute(&pool)
                .await
                .map_err(|err| map_db_error("recording login", err))?;
            Ok(())
        })
    }

    fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE players SET \
                   username = COALESCE($2, username), \
                   email = COALESCE($3, email), \
                   avatar = COALESCE($4, avatar), \
                   current_skin = COALESCE($5, current_skin), \
                   updated_at = $6 \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.email)
            .bind(&changes.avatar)
            .bind(&changes.current_skin)
            .bind(now)
            .execute(&pool)
            .await
            .map_err(|err| map_db_error("updating profile", err))?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn sync_progress(
        &self,
        id: Uuid,
        progress: ProgressUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let mut tx = pool
                .begin()
                .await
                .map_err(|err| map_db_error("starting sync transaction", err))?;

            let result = sqlx::query(
                "UPDATE players SET \
                   total_score = GREATEST(total_score, $2), \
                   best_distance = GREATEST(best_distance, $3), \
                   total_coins = total_coins + $4, \
                   level = GREATEST(level, $5), \
                   experience = $6, \
                   achievements = COALESCE($7::jsonb, achievements), \
                   last_sync_at = $8, \
                   updated_at = $8 \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(progress.score)
            .bind(progress.distance)
            .bind(progress.coins)
            .bind(progress.level)
            .bind(progress.experience)
            .bind(progress.achievements.map(Json))
            .bind(progress.now)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_db_error("updating player aggregates", err))?;

            if result.rows_affected() == 0 {
                // Unknown player: leave nothing behind.
                tx.rollback()
                    .await
                    .map_err(|err| map_db_error("rolling back sync", err))?;
                return Ok(false);
            }

            if let Some(session) = progress.session {
                sqlx::query(
                    "INSERT INTO game_sessions \
                       (player_id, score, distance, duration_seconds, obstacles_avoided, \
                        obstacles_hit, coins_collected, power_ups_used, level_reached, created_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                )
                .bind(id)
                .bind(progress.score)
                .bind(progress.distance)
                .bind(session.duration_seconds)
                .bind(session.obstacles_avoided)
                .bind(session.obstacles_hit)
                .bind(session.coins_collected)
                .bind(session.power_ups_used)
                .bind(session.level_reached)
                .bind(progress.now)
                .execute(&mut *tx)
                .await
                .map_err(|err| map_db_error("recording game session", err))?;
            }

            tx.commit()
                .await
                .map_err(|err| map_db_error("committing sync", err))?;
            Ok(true)
        })
    }

    fn player_stats(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerStatsEntity>>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            #[derive(sqlx::FromRow)]
            struct StatsRow {
                total_score: i64,
                best_distance: f64,
                total_coins: i64,
                level: i32,
                experience: i64,
                achievements: Json<Vec<String>>,
                games_played: i64,
                average_score: f64,
            }

            let row: Option<StatsRow> = sqlx::query_as(
                "SELECT total_score, best_distance, total_coins, level, experience, achievements, \
                        (SELECT COUNT(*) FROM game_sessions WHERE player_id = $1) AS games_played, \
                        (SELECT COALESCE(AVG(score::float8), 0) FROM game_sessions \
                          WHERE player_id = $1) AS average_score \
                   FROM players WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(|err| map_db_error("computing player stats", err))?;

            Ok(row.map(|row| PlayerStatsEntity {
                total_score: row.total_score,
                best_distance: row.best_distance,
                total_coins: row.total_coins,
                level: row.level,
                experience: row.experience,
                achievements: row.achievements.0,
                games_played: row.games_played,
                average_score: row.average_score,
            }))
        })
    }

    fn replace_achievements(
        &self,
        id: Uuid,
        achievements: Vec<String>,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE players SET achievements = $2::jsonb, updated_at = $3 WHERE id = $1",
            )
            .bind(id)
            .bind(Json(achievements))
            .bind(now)
            .execute(&pool)
            .await
            .map_err(|err| map_db_error("replacing achievements", err))?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn session_stats(
        &self,
        player_id: Uuid,
        window: TimeWindow,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<SessionStatsEntity>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            #[derive(sqlx::FromRow)]
            struct StatsRow {
                games_played: i64,
                average_score: f64,
                best_score: i64,
                average_distance: f64,
                best_distance: f64,
                average_duration: f64,
            }

            let cutoff = window.cutoff(now);
            let row: StatsRow = sqlx::query_as(
                "SELECT COUNT(*) AS games_played, \
                        COALESCE(AVG(score::float8), 0) AS average_score, \
                        COALESCE(MAX(score), 0) AS best_score, \
                        COALESCE(AVG(distance), 0::float8) AS average_distance, \
                        COALESCE(MAX(distance), 0::float8) AS best_distance, \
                        COALESCE(AVG(duration_seconds::float8), 0) AS average_duration \
                   FROM game_sessions \
                  WHERE player_id = $1 \
                    AND ($2::timestamptz IS NULL OR created_at >= $2)",
            )
            .bind(player_id)
            .bind(cutoff)
            .fetch_one(&pool)
            .await
            .map_err(|err| map_db_error("computing session stats", err))?;

            Ok(SessionStatsEntity {
                games_played: row.games_played,
                average_score: row.average_score,
                best_score: row.best_score,
                average_distance: row.average_distance,
                best_distance: row.best_distance,
                average_duration: row.average_duration,
            })
        })
    }

    fn list_sessions(
        &self,
        player_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<GameSessionEntity>>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let rows: Vec<SessionRow> = sqlx::query_as(
                "SELECT * FROM game_sessions WHERE player_id = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            )
            .bind(player_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&pool)
            .await
            .map_err(|err| map_db_error("listing game sessions", err))?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn record_purchase(
        &self,
        purchase: NewPurchase,
    ) -> BoxFuture<'static, StorageResult<PurchaseEntity>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let mut tx = pool
                .begin()
                .await
                .map_err(|err| map_db_error("starting purchase transaction", err))?;

            let row: PurchaseRow = sqlx::query_as(
                "INSERT INTO purchases \
                   (player_id, item_id, item_type, price, currency, status, transaction_id, created_at) \
                 VALUES ($1, $2, $3, $4, $5, 'completed', $6, $7) \
                 RETURNING *",
            )
            .bind(purchase.player_id)
            .bind(&purchase.item_id)
            .bind(&purchase.item_type)
            .bind(purchase.price)
            .bind(&purchase.currency)
            .bind(&purchase.transaction_id)
            .bind(purchase.now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| map_db_error("recording purchase", err))?;

            if purchase.credits_coins {
                sqlx::query("UPDATE players SET total_coins = total_coins + $2 WHERE id = $1")
                    .bind(purchase.player_id)
                    .bind(purchase.price as i64)
                    .execute(&mut *tx)
                    .await
                    .map_err(|err| map_db_error("crediting purchased coins", err))?;
            }

            tx.commit()
                .await
                .map_err(|err| map_db_error("committing purchase", err))?;
            Ok(row.into())
        })
    }

    fn list_purchases(
        &self,
        player_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<PurchaseEntity>>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let rows: Vec<PurchaseRow> = sqlx::query_as(
                "SELECT * FROM purchases WHERE player_id = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            )
            .bind(player_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&pool)
            .await
            .map_err(|err| map_db_error("listing purchases", err))?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn submit_entry(
        &self,
        entry: NewLeaderboardEntry,
    ) -> BoxFuture<'static, StorageResult<SubmittedEntry>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let cutoff = entry.window.cutoff(entry.now);

            let (id,): (Uuid,) = sqlx::query_as(
                "INSERT INTO leaderboard (player_id, score, distance, level, time_range, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            )
            .bind(entry.player_id)
            .bind(entry.score)
            .bind(entry.distance)
            .bind(entry.level)
            .bind(entry.window.tag())
            .bind(entry.now)
            .fetch_one(&pool)
            .await
            .map_err(|err| map_db_error("inserting leaderboard entry", err))?;

            // Snapshot rank; racing submissions may shift it right away.
            let (greater,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM leaderboard \
                  WHERE time_range = $1 AND score > $2 \
                    AND ($3::timestamptz IS NULL OR created_at >= $3)",
            )
            .bind(entry.window.tag())
            .bind(entry.score)
            .bind(cutoff)
            .fetch_one(&pool)
            .await
            .map_err(|err| map_db_error("computing submission rank", err))?;

            Ok(SubmittedEntry {
                id,
                rank: greater + 1,
            })
        })
    }

    fn list_entries(
        &self,
        query: LeaderboardQuery,
    ) -> BoxFuture<'static, StorageResult<LeaderboardPage>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let cutoff = query.window.cutoff(query.now);

            let rows: Vec<RankedRow> = sqlx::query_as(&list_sql(query.sort))
                .bind(query.window.tag())
                .bind(cutoff)
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&pool)
                .await
                .map_err(|err| map_db_error("listing leaderboard entries", err))?;

            let (total,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM leaderboard \
                  WHERE time_range = $1 \
                    AND ($2::timestamptz IS NULL OR created_at >= $2)",
            )
            .bind(query.window.tag())
            .bind(cutoff)
            .fetch_one(&pool)
            .await
            .map_err(|err| map_db_error("counting leaderboard entries", err))?;

            Ok(LeaderboardPage {
                entries: rows.into_iter().map(Into::into).collect(),
                total,
            })
        })
    }

    fn best_entry(
        &self,
        player_id: Uuid,
        window: TimeWindow,
        sort: SortField,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<RankedEntryEntity>>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let cutoff = window.cutoff(now);
            let row: Option<RankedRow> = sqlx::query_as(&best_entry_sql(sort))
                .bind(window.tag())
                .bind(cutoff)
                .bind(player_id)
                .fetch_optional(&pool)
                .await
                .map_err(|err| map_db_error("looking up best entry", err))?;
            Ok(row.map(Into::into))
        })
    }

    fn window_stats(
        &self,
        window: TimeWindow,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<WindowStatsEntity>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            #[derive(sqlx::FromRow)]
            struct StatsRow {
                total_entries: i64,
                unique_players: i64,
                average_score: f64,
                highest_score: i64,
                average_distance: f64,
                highest_distance: f64,
                average_level: f64,
                highest_level: i32,
            }

            let cutoff = window.cutoff(now);
            let row: StatsRow = sqlx::query_as(
                "SELECT COUNT(*) AS total_entries, \
                        COUNT(DISTINCT player_id) AS unique_players, \
                        COALESCE(AVG(score::float8), 0) AS average_score, \
                        COALESCE(MAX(score), 0) AS highest_score, \
                        COALESCE(AVG(distance), 0) AS average_distance, \
                        COALESCE(MAX(distance), 0) AS highest_distance, \
                        COALESCE(AVG(level::float8), 0) AS average_level, \
                        COALESCE(MAX(level), 0) AS highest_level \
                   FROM leaderboard \
                  WHERE time_range = $1 \
                    AND ($2::timestamptz IS NULL OR created_at >= $2)",
            )
            .bind(window.tag())
            .bind(cutoff)
            .fetch_one(&pool)
            .await
            .map_err(|err| map_db_error("computing leaderboard stats", err))?;

            Ok(WindowStatsEntity {
                total_entries: row.total_entries,
                unique_players: row.unique_players,
                average_score: row.average_score,
                highest_score: row.highest_score,
                average_distance: row.average_distance,
                highest_distance: row.highest_distance,
                average_level: row.average_level,
                highest_level: row.highest_level,
            })
        })
    }

    fn top_players(
        &self,
        window: TimeWindow,
        criteria: TopCriteria,
        limit: i64,
        now: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Vec<TopPlayerEntity>>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            let cutoff = window.cutoff(now);
            let rows: Vec<TopPlayerRow> = sqlx::query_as(&top_players_sql(criteria))
                .bind(window.tag())
                .bind(cutoff)
                .bind(limit)
                .fetch_all(&pool)
                .await
                .map_err(|err| map_db_error("listing top players", err))?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool().clone();
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .map_err(|err| map_db_error("pinging PostgreSQL", err))?;
            Ok(())
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // The pool re-establishes connections lazily; a successful ping means
        // we are usable again.
        self.health_check()
    }
}
