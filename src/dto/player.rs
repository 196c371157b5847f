use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{PlayerEntity, PlayerStatsEntity, ProfileChanges, PurchaseEntity},
    dto::{
        auth::PlayerSummary,
        format_timestamp,
        validation::{validate_skin_id, validate_username},
    },
};

/// Full profile body, the player summary plus derived statistics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub data: ProfileData,
}

/// Player record with aggregate statistics attached.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(flatten)]
    pub player: PlayerSummary,
    pub stats: ProfileStats,
}

/// Statistics derived from the session history.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub games_played: i64,
    pub average_score: f64,
}

impl ProfileResponse {
    /// Assemble the profile body from the stored player and their stats.
    pub fn new(player: PlayerEntity, stats: PlayerStatsEntity) -> Self {
        Self {
            success: true,
            data: ProfileData {
                player: player.into(),
                stats: ProfileStats {
                    games_played: stats.games_played,
                    average_score: stats.average_score,
                },
            },
        }
    }
}

/// Partial profile update; omitted fields are left untouched.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(custom(function = validate_username))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub avatar: Option<String>,
    #[validate(custom(function = validate_skin_id))]
    pub current_skin: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            avatar: request.avatar,
            current_skin: request.current_skin,
        }
    }
}

/// Aggregate player statistics body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub data: PlayerStatsDto,
}

/// Lifetime aggregates for one player.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsDto {
    pub total_score: i64,
    pub best_distance: f64,
    pub total_coins: i64,
    pub level: i32,
    pub experience: i64,
    pub achievements: Vec<String>,
    pub games_played: i64,
    pub average_score: f64,
}

impl From<PlayerStatsEntity> for StatsResponse {
    fn from(stats: PlayerStatsEntity) -> Self {
        Self {
            success: true,
            data: PlayerStatsDto {
                total_score: stats.total_score,
                best_distance: stats.best_distance,
                total_coins: stats.total_coins,
                level: stats.level,
                experience: stats.experience,
                achievements: stats.achievements,
                games_played: stats.games_played,
                average_score: stats.average_score,
            },
        }
    }
}

/// Unlocked achievement identifiers body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AchievementsResponse {
    pub success: bool,
    pub data: Vec<String>,
}

/// Payload replacing the stored achievement set wholesale.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAchievementsRequest {
    pub achievements: Vec<String>,
}

/// What kind of item a purchase buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Skin,
    Booster,
    Currency,
}

impl ItemType {
    /// Tag stored with the purchase row.
    pub fn tag(self) -> &'static str {
        match self {
            ItemType::Skin => "skin",
            ItemType::Booster => "booster",
            ItemType::Currency => "currency",
        }
    }
}

/// Currency a purchase is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyKind {
    Coins,
    RealMoney,
}

impl CurrencyKind {
    /// Tag stored with the purchase row.
    pub fn tag(self) -> &'static str {
        match self {
            CurrencyKind::Coins => "coins",
            CurrencyKind::RealMoney => "real_money",
        }
    }
}

/// Payload recording a completed purchase.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[validate(length(min = 1, max = 100))]
    pub item_id: String,
    pub item_type: ItemType,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub currency: CurrencyKind,
    #[validate(length(max = 200))]
    pub transaction_id: Option<String>,
}

/// Body returned after recording a purchase.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    pub success: bool,
    pub data: PurchaseDto,
}

/// One recorded purchase.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDto {
    pub id: Uuid,
    pub item_id: String,
    pub item_type: String,
    pub price: f64,
    pub currency: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub created_at: String,
}

impl From<PurchaseEntity> for PurchaseDto {
    fn from(purchase: PurchaseEntity) -> Self {
        Self {
            id: purchase.id,
            item_id: purchase.item_id,
            item_type: purchase.item_type,
            price: purchase.price,
            currency: purchase.currency,
            status: purchase.status,
            transaction_id: purchase.transaction_id,
            created_at: format_timestamp(purchase.created_at),
        }
    }
}

/// Purchase history body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchasesResponse {
    pub success: bool,
    pub data: Vec<PurchaseDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_enum_tags() {
        let request: PurchaseRequest = serde_json::from_value(serde_json::json!({
            "itemId": "coin_pack_small",
            "itemType": "currency",
            "price": 100.0,
            "currency": "coins"
        }))
        .unwrap();
        assert_eq!(request.item_type, ItemType::Currency);
        assert_eq!(request.currency, CurrencyKind::Coins);
        assert_eq!(request.item_type.tag(), "currency");
        assert_eq!(request.currency.tag(), "coins");
    }

    #[test]
    fn negative_price_fails_validation() {
        let request = PurchaseRequest {
            item_id: "skin_2".into(),
            item_type: ItemType::Skin,
            price: -1.0,
            currency: CurrencyKind::RealMoney,
            transaction_id: None,
        };
        assert!(request.validate().is_err());
    }
}
