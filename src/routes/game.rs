use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    auth::{AuthPlayer, MaybePlayer},
    dto::{
        common::ApiMessage,
        game::{GameStatsResponse, SessionsParams, SessionsResponse, StatsParams, SyncRequest},
        leaderboard::{SubmitEntryRequest, SubmitEntryResponse, WindowParams},
    },
    error::AppError,
    routes::query::Query,
    services::{game_service, leaderboard_service},
    state::SharedState,
};

/// Routes handling run synchronization and session history.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/game/sync", post(sync_progress))
        .route("/api/game/sessions", get(list_sessions))
        .route("/api/game/stats", get(game_stats))
        .route("/api/game/leaderboard", post(submit_entry))
}

/// Global aggregates for a window; authenticated callers also get their own
/// session aggregates.
#[utoipa::path(
    get,
    path = "/api/game/stats",
    tag = "game",
    params(StatsParams),
    responses(
        (status = 200, description = "Game statistics", body = GameStatsResponse)
    )
)]
pub async fn game_stats(
    State(state): State<SharedState>,
    MaybePlayer(player_id): MaybePlayer,
    Query(params): Query<StatsParams>,
) -> Result<Json<GameStatsResponse>, AppError> {
    let response = game_service::overview(&state, player_id, params.range).await?;
    Ok(Json(response))
}

/// Merge a finished run's progress into the caller's stored state.
#[utoipa::path(
    post,
    path = "/api/game/sync",
    tag = "game",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Progress merged", body = ApiMessage),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn sync_progress(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
    Json(payload): Json<SyncRequest>,
) -> Result<Json<ApiMessage>, AppError> {
    payload.validate()?;
    let response = game_service::sync(&state, player_id, payload).await?;
    Ok(Json(response))
}

/// List the caller's recorded sessions, most recent first.
#[utoipa::path(
    get,
    path = "/api/game/sessions",
    tag = "game",
    params(SessionsParams),
    responses(
        (status = 200, description = "Session history", body = SessionsResponse)
    )
)]
pub async fn list_sessions(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
    Query(params): Query<SessionsParams>,
) -> Result<Json<SessionsResponse>, AppError> {
    let response =
        game_service::sessions(&state, player_id, params.limit, params.offset).await?;
    Ok(Json(response))
}

/// Submit a run's result to a leaderboard window. Works without a token;
/// anonymous entries carry no player info.
#[utoipa::path(
    post,
    path = "/api/game/leaderboard",
    tag = "game",
    params(WindowParams),
    request_body = SubmitEntryRequest,
    responses(
        (status = 200, description = "Entry stored", body = SubmitEntryResponse)
    )
)]
pub async fn submit_entry(
    State(state): State<SharedState>,
    MaybePlayer(player_id): MaybePlayer,
    Query(params): Query<WindowParams>,
    Json(payload): Json<SubmitEntryRequest>,
) -> Result<Json<SubmitEntryResponse>, AppError> {
    payload.validate()?;
    let response =
        leaderboard_service::submit(&state, player_id, params.range, payload).await?;
    Ok(Json(response))
}
