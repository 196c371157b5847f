use axum::{Json, Router, extract::State, routing::get};

use crate::{
    auth::AuthPlayer,
    dto::leaderboard::{
        LeaderboardResponse, ListParams, RankResponse, TopParams, TopPlayersResponse,
        WindowParams, WindowStatsResponse,
    },
    error::AppError,
    routes::query::Query,
    services::leaderboard_service,
    state::SharedState,
};

/// Routes serving leaderboard listings and rank lookups.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/leaderboard", get(list_entries))
        .route("/api/leaderboard/top", get(top_players))
        .route("/api/leaderboard/rank", get(my_rank))
        .route("/api/leaderboard/stats", get(window_stats))
}

/// Players ranked by score, distance, level, or coin balance.
#[utoipa::path(
    get,
    path = "/api/leaderboard/top",
    tag = "leaderboard",
    params(TopParams),
    responses(
        (status = 200, description = "Top players", body = TopPlayersResponse)
    )
)]
pub async fn top_players(
    State(state): State<SharedState>,
    Query(params): Query<TopParams>,
) -> Result<Json<TopPlayersResponse>, AppError> {
    let response =
        leaderboard_service::top(&state, params.range, params.criteria, params.limit).await?;
    Ok(Json(response))
}

/// List one page of a leaderboard window.
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "leaderboard",
    params(ListParams),
    responses(
        (status = 200, description = "Ranked entries", body = LeaderboardResponse)
    )
)]
pub async fn list_entries(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let response = leaderboard_service::list(
        &state,
        params.range,
        params.sort_by,
        params.limit,
        params.offset,
    )
    .await?;
    Ok(Json(response))
}

/// The caller's best entry in the window, with its current rank.
#[utoipa::path(
    get,
    path = "/api/leaderboard/rank",
    tag = "leaderboard",
    params(WindowParams),
    responses(
        (status = 200, description = "Best entry with rank", body = RankResponse),
        (status = 404, description = "No entry in this window")
    )
)]
pub async fn my_rank(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
    Query(params): Query<WindowParams>,
) -> Result<Json<RankResponse>, AppError> {
    let response =
        leaderboard_service::my_rank(&state, player_id, params.range, params.sort_by).await?;
    Ok(Json(response))
}

/// Aggregate statistics over every entry in the window.
#[utoipa::path(
    get,
    path = "/api/leaderboard/stats",
    tag = "leaderboard",
    params(WindowParams),
    responses(
        (status = 200, description = "Window statistics", body = WindowStatsResponse)
    )
)]
pub async fn window_stats(
    State(state): State<SharedState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<WindowStatsResponse>, AppError> {
    let response = leaderboard_service::stats(&state, params.range).await?;
    Ok(Json(response))
}
