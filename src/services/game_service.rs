//! Progress synchronization and session history.

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::models::TimeWindow,
    dto::{
        common::ApiMessage,
        game::{GameStatsResponse, SessionsResponse, SyncRequest},
    },
    error::AppError,
    services::player_service::clamp_limit,
    state::SharedState,
};

/// Merge a finished run's progress into the player aggregate.
///
/// Coins are added and an optional session row is inserted on every call, so
/// a client retrying a timed-out sync will double-count both.
pub async fn sync(
    state: &SharedState,
    player_id: Uuid,
    request: SyncRequest,
) -> Result<ApiMessage, AppError> {
    let store = state.require_data_store().await?;

    let progress = request.into_progress(OffsetDateTime::now_utc());
    debug!(
        player = %player_id,
        score = progress.score,
        coins = progress.coins,
        "syncing progress"
    );

    let applied = store.sync_progress(player_id, progress).await?;
    if !applied {
        return Err(AppError::NotFound("player not found".into()));
    }

    Ok(ApiMessage::ok("progress synced"))
}

/// Global leaderboard aggregates for the window, plus the caller's own
/// session aggregates when a token was presented.
pub async fn overview(
    state: &SharedState,
    player_id: Option<Uuid>,
    window: TimeWindow,
) -> Result<GameStatsResponse, AppError> {
    let store = state.require_data_store().await?;
    let now = OffsetDateTime::now_utc();

    let global = store.window_stats(window, now).await?;
    let player = match player_id {
        Some(id) => Some(store.session_stats(id, window, now).await?),
        None => None,
    };

    Ok(GameStatsResponse::new(global, player, window))
}

/// Session history for the player, most recent first.
pub async fn sessions(
    state: &SharedState,
    player_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<SessionsResponse, AppError> {
    let store = state.require_data_store().await?;
    let sessions = store
        .list_sessions(player_id, clamp_limit(limit), offset.max(0))
        .await?;
    Ok(SessionsResponse {
        success: true,
        data: sessions.into_iter().map(Into::into).collect(),
    })
}
