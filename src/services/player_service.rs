//! Player profile reads and updates, lifetime statistics, and the purchase
//! ledger.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{NewPurchase, ProfileChanges},
    dto::{
        common::ApiMessage,
        player::{
            AchievementsResponse, CurrencyKind, ItemType, ProfileResponse, PurchaseRequest,
            PurchaseResponse, PurchasesResponse, StatsResponse, UpdateProfileRequest,
        },
    },
    error::AppError,
    state::SharedState,
};

/// Load the player's profile together with derived statistics.
pub async fn profile(state: &SharedState, player_id: Uuid) -> Result<ProfileResponse, AppError> {
    let store = state.require_data_store().await?;

    let player = store
        .find_player(player_id)
        .await?
        .ok_or_else(|| AppError::NotFound("player not found".into()))?;
    let stats = store
        .player_stats(player_id)
        .await?
        .ok_or_else(|| AppError::NotFound("player not found".into()))?;

    Ok(ProfileResponse::new(player, stats))
}

/// Apply a partial profile update.
pub async fn update_profile(
    state: &SharedState,
    player_id: Uuid,
    request: UpdateProfileRequest,
) -> Result<ApiMessage, AppError> {
    let changes = ProfileChanges::from(request);
    if changes.is_empty() {
        return Err(AppError::BadRequest("no fields to update".into()));
    }

    let store = state.require_data_store().await?;
    let updated = store
        .update_profile(player_id, changes, OffsetDateTime::now_utc())
        .await?;
    if !updated {
        return Err(AppError::NotFound("player not found".into()));
    }

    Ok(ApiMessage::ok("profile updated"))
}

/// Lifetime aggregates for the player.
pub async fn stats(state: &SharedState, player_id: Uuid) -> Result<StatsResponse, AppError> {
    let store = state.require_data_store().await?;
    let stats = store
        .player_stats(player_id)
        .await?
        .ok_or_else(|| AppError::NotFound("player not found".into()))?;
    Ok(stats.into())
}

/// The player's unlocked achievement identifiers.
pub async fn achievements(
    state: &SharedState,
    player_id: Uuid,
) -> Result<AchievementsResponse, AppError> {
    let store = state.require_data_store().await?;
    let player = store
        .find_player(player_id)
        .await?
        .ok_or_else(|| AppError::NotFound("player not found".into()))?;
    Ok(AchievementsResponse {
        success: true,
        data: player.achievements,
    })
}

/// Replace the player's achievement set wholesale.
pub async fn update_achievements(
    state: &SharedState,
    player_id: Uuid,
    achievements: Vec<String>,
) -> Result<ApiMessage, AppError> {
    let store = state.require_data_store().await?;
    let updated = store
        .replace_achievements(player_id, achievements, OffsetDateTime::now_utc())
        .await?;
    if !updated {
        return Err(AppError::NotFound("player not found".into()));
    }
    Ok(ApiMessage::ok("achievements updated"))
}

/// Record a completed purchase. Coin-denominated currency purchases also
/// credit the player's balance, in the same transaction.
pub async fn record_purchase(
    state: &SharedState,
    player_id: Uuid,
    request: PurchaseRequest,
) -> Result<PurchaseResponse, AppError> {
    let store = state.require_data_store().await?;

    let credits_coins =
        request.item_type == ItemType::Currency && request.currency == CurrencyKind::Coins;
    let purchase = store
        .record_purchase(NewPurchase {
            player_id,
            item_id: request.item_id,
            item_type: request.item_type.tag().to_string(),
            price: request.price,
            currency: request.currency.tag().to_string(),
            transaction_id: request.transaction_id,
            credits_coins,
            now: OffsetDateTime::now_utc(),
        })
        .await?;

    info!(player = %player_id, item = %purchase.item_id, "recorded purchase");
    Ok(PurchaseResponse {
        success: true,
        data: purchase.into(),
    })
}

/// Purchase history, most recent first.
pub async fn list_purchases(
    state: &SharedState,
    player_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<PurchasesResponse, AppError> {
    let store = state.require_data_store().await?;
    let purchases = store
        .list_purchases(player_id, clamp_limit(limit), offset.max(0))
        .await?;
    Ok(PurchasesResponse {
        success: true,
        data: purchases.into_iter().map(Into::into).collect(),
    })
}

/// Page sizes are capped server-side regardless of what the client asks for.
pub(crate) fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(-5), 1);
        assert_eq!(clamp_limit(50), 50);
        assert_eq!(clamp_limit(10_000), 100);
    }
}
