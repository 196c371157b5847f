use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::AuthPlayer,
    dto::{
        common::ApiMessage,
        player::{
            AchievementsResponse, ProfileResponse, PurchaseRequest, PurchaseResponse,
            PurchasesResponse, StatsResponse, UpdateAchievementsRequest, UpdateProfileRequest,
        },
    },
    error::AppError,
    routes::query::Query,
    services::player_service,
    state::SharedState,
};

/// Routes serving the authenticated player's own data.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/player/profile",
            get(get_profile).put(update_profile),
        )
        .route("/api/player/stats", get(get_stats))
        .route(
            "/api/player/achievements",
            get(get_achievements).put(update_achievements),
        )
        .route(
            "/api/player/purchases",
            get(list_purchases).post(record_purchase),
        )
}

/// Pagination query for the purchase history.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PurchasesParams {
    #[serde(default = "default_purchases_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_purchases_limit() -> i64 {
    20
}

/// Fetch the caller's profile with derived statistics.
#[utoipa::path(
    get,
    path = "/api/player/profile",
    tag = "player",
    responses(
        (status = 200, description = "Player profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_profile(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
) -> Result<Json<ProfileResponse>, AppError> {
    let response = player_service::profile(&state, player_id).await?;
    Ok(Json(response))
}

/// Apply a partial update to the caller's profile.
#[utoipa::path(
    put,
    path = "/api/player/profile",
    tag = "player",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiMessage),
        (status = 400, description = "Empty or invalid update")
    )
)]
pub async fn update_profile(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiMessage>, AppError> {
    payload.validate()?;
    let response = player_service::update_profile(&state, player_id, payload).await?;
    Ok(Json(response))
}

/// Fetch the caller's lifetime statistics.
#[utoipa::path(
    get,
    path = "/api/player/stats",
    tag = "player",
    responses(
        (status = 200, description = "Player statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
) -> Result<Json<StatsResponse>, AppError> {
    let response = player_service::stats(&state, player_id).await?;
    Ok(Json(response))
}

/// List the caller's unlocked achievements.
#[utoipa::path(
    get,
    path = "/api/player/achievements",
    tag = "player",
    responses(
        (status = 200, description = "Achievement identifiers", body = AchievementsResponse)
    )
)]
pub async fn get_achievements(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
) -> Result<Json<AchievementsResponse>, AppError> {
    let response = player_service::achievements(&state, player_id).await?;
    Ok(Json(response))
}

/// Replace the caller's achievement set wholesale.
#[utoipa::path(
    put,
    path = "/api/player/achievements",
    tag = "player",
    request_body = UpdateAchievementsRequest,
    responses(
        (status = 200, description = "Achievements replaced", body = ApiMessage)
    )
)]
pub async fn update_achievements(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
    Json(payload): Json<UpdateAchievementsRequest>,
) -> Result<Json<ApiMessage>, AppError> {
    let response =
        player_service::update_achievements(&state, player_id, payload.achievements).await?;
    Ok(Json(response))
}

/// Record a completed purchase for the caller.
#[utoipa::path(
    post,
    path = "/api/player/purchases",
    tag = "player",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Purchase recorded", body = PurchaseResponse)
    )
)]
pub async fn record_purchase(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, AppError> {
    payload.validate()?;
    let response = player_service::record_purchase(&state, player_id, payload).await?;
    Ok(Json(response))
}

/// List the caller's purchase history.
#[utoipa::path(
    get,
    path = "/api/player/purchases",
    tag = "player",
    params(PurchasesParams),
    responses(
        (status = 200, description = "Purchase history", body = PurchasesResponse)
    )
)]
pub async fn list_purchases(
    State(state): State<SharedState>,
    AuthPlayer(player_id): AuthPlayer,
    Query(params): Query<PurchasesParams>,
) -> Result<Json<PurchasesResponse>, AppError> {
    let response =
        player_service::list_purchases(&state, player_id, params.limit, params.offset).await?;
    Ok(Json(response))
}
