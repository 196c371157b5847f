//! Leaderboard submissions, windowed listings, rank lookups, and window
//! statistics.

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::models::{LeaderboardQuery, NewLeaderboardEntry, SortField, TimeWindow, TopCriteria},
    dto::leaderboard::{
        LeaderboardResponse, RankResponse, SubmitEntryRequest, SubmitEntryResponse,
        TopPlayersResponse, WindowStatsResponse,
    },
    error::AppError,
    services::player_service::clamp_limit,
    state::SharedState,
};

/// Store a run's result in the given window. Anonymous submissions are
/// accepted; they render without player info.
pub async fn submit(
    state: &SharedState,
    player_id: Option<Uuid>,
    window: TimeWindow,
    request: SubmitEntryRequest,
) -> Result<SubmitEntryResponse, AppError> {
    let store = state.require_data_store().await?;

    let entry = store
        .submit_entry(NewLeaderboardEntry {
            player_id,
            score: request.score,
            distance: request.distance,
            level: request.level,
            window,
            now: OffsetDateTime::now_utc(),
        })
        .await?;

    debug!(entry = %entry.id, rank = entry.rank, "stored leaderboard entry");
    Ok(SubmitEntryResponse::new(entry, window))
}

/// One page of a window, ordered and ranked by the sort field.
pub async fn list(
    state: &SharedState,
    window: TimeWindow,
    sort: SortField,
    limit: i64,
    offset: i64,
) -> Result<LeaderboardResponse, AppError> {
    let store = state.require_data_store().await?;

    let limit = clamp_limit(limit);
    let offset = offset.max(0);
    let page = store
        .list_entries(LeaderboardQuery {
            window,
            sort,
            limit,
            offset,
            now: OffsetDateTime::now_utc(),
        })
        .await?;

    Ok(LeaderboardResponse::new(page, window, sort, limit, offset))
}

/// The caller's best entry in the window, with its current rank.
pub async fn my_rank(
    state: &SharedState,
    player_id: Uuid,
    window: TimeWindow,
    sort: SortField,
) -> Result<RankResponse, AppError> {
    let store = state.require_data_store().await?;

    let entry = store
        .best_entry(player_id, window, sort, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| AppError::NotFound("no entry in this leaderboard".into()))?;

    Ok(RankResponse {
        success: true,
        data: entry.into(),
    })
}

/// Players ranked by the criteria, joined with their best windowed entry.
pub async fn top(
    state: &SharedState,
    window: TimeWindow,
    criteria: TopCriteria,
    limit: i64,
) -> Result<TopPlayersResponse, AppError> {
    let store = state.require_data_store().await?;
    let players = store
        .top_players(window, criteria, clamp_limit(limit), OffsetDateTime::now_utc())
        .await?;
    Ok(TopPlayersResponse::new(players, criteria, window))
}

/// Aggregate statistics over every entry in the window.
pub async fn stats(
    state: &SharedState,
    window: TimeWindow,
) -> Result<WindowStatsResponse, AppError> {
    let store = state.require_data_store().await?;
    let stats = store
        .window_stats(window, OffsetDateTime::now_utc())
        .await?;
    Ok(WindowStatsResponse::new(stats, window))
}
