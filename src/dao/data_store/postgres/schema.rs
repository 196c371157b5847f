//! Idempotent schema bootstrap run at connect time.

use sqlx::PgPool;

use crate::dao::storage::{StorageError, StorageResult};

const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS players (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        username VARCHAR(100) NOT NULL,
        email VARCHAR(255) UNIQUE,
        password_hash VARCHAR(255),
        avatar VARCHAR(500),
        total_score BIGINT NOT NULL DEFAULT 0,
        best_distance DOUBLE PRECISION NOT NULL DEFAULT 0,
        total_coins BIGINT NOT NULL DEFAULT 0,
        level INTEGER NOT NULL DEFAULT 1,
        experience BIGINT NOT NULL DEFAULT 0,
        achievements JSONB NOT NULL DEFAULT '[]'::jsonb,
        skins TEXT[] NOT NULL DEFAULT ARRAY['1'],
        current_skin VARCHAR(50) NOT NULL DEFAULT '1',
        is_guest BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        last_login TIMESTAMPTZ,
        last_sync_at TIMESTAMPTZ
    )",
    "CREATE TABLE IF NOT EXISTS leaderboard (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        player_id UUID REFERENCES players(id) ON DELETE CASCADE,
        score BIGINT NOT NULL,
        distance DOUBLE PRECISION NOT NULL,
        level INTEGER NOT NULL,
        time_range VARCHAR(20) NOT NULL DEFAULT 'all',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS game_sessions (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        player_id UUID NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        score BIGINT NOT NULL,
        distance DOUBLE PRECISION NOT NULL,
        duration_seconds BIGINT NOT NULL,
        obstacles_avoided INTEGER NOT NULL DEFAULT 0,
        obstacles_hit INTEGER NOT NULL DEFAULT 0,
        coins_collected BIGINT NOT NULL DEFAULT 0,
        power_ups_used INTEGER NOT NULL DEFAULT 0,
        level_reached INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS achievements (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        player_id UUID NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        achievement_id VARCHAR(50) NOT NULL,
        unlocked_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE(player_id, achievement_id)
    )",
    "CREATE TABLE IF NOT EXISTS purchases (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        player_id UUID NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        item_type VARCHAR(20) NOT NULL,
        item_id VARCHAR(50) NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        currency VARCHAR(10) NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'pending',
        transaction_id VARCHAR(100),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS assets (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        type VARCHAR(50) NOT NULL,
        quality VARCHAR(20) NOT NULL,
        url TEXT NOT NULL,
        size BIGINT NOT NULL DEFAULT 0,
        format VARCHAR(20),
        metadata JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE(name, type, quality)
    )",
    "CREATE INDEX IF NOT EXISTS idx_leaderboard_score ON leaderboard(score DESC)",
    "CREATE INDEX IF NOT EXISTS idx_leaderboard_time_range ON leaderboard(time_range)",
    "CREATE INDEX IF NOT EXISTS idx_leaderboard_created_at ON leaderboard(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_players_email ON players(email)",
    "CREATE INDEX IF NOT EXISTS idx_game_sessions_player_id ON game_sessions(player_id)",
];

/// Create every table and index the backend relies on, if missing.
pub async fn ensure_schema(pool: &PgPool) -> StorageResult<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|err| StorageError::unavailable("initializing schema".into(), err))?;
    }
    Ok(())
}
