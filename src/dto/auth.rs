use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::TokenPair,
    dao::models::PlayerEntity,
    dto::{format_timestamp, validation::validate_username},
};

/// Payload creating a new credentialed account.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = validate_username))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Login payload: either email+password credentials, or `isGuest` to mint an
/// anonymous account.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
}

/// Payload exchanging a refresh token for a fresh pair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Player projection returned by auth endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub total_score: i64,
    pub best_distance: f64,
    pub total_coins: i64,
    pub level: i32,
    pub experience: i64,
    pub achievements: Vec<String>,
    pub skins: Vec<String>,
    pub current_skin: String,
    pub is_guest: bool,
    pub last_sync_at: Option<String>,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            username: player.username,
            email: player.email,
            avatar: player.avatar,
            total_score: player.total_score,
            best_distance: player.best_distance,
            total_coins: player.total_coins,
            level: player.level,
            experience: player.experience,
            achievements: player.achievements,
            skins: player.skins,
            current_skin: player.current_skin,
            is_guest: player.is_guest,
            last_sync_at: player.last_sync_at.map(format_timestamp),
        }
    }
}

/// Body of a successful login or registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub data: AuthData,
}

/// The player plus their freshly issued token pair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub player: PlayerSummary,
    pub token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    /// Assemble the response from the stored player and a token pair.
    pub fn new(player: PlayerEntity, tokens: TokenPair) -> Self {
        Self {
            success: true,
            data: AuthData {
                player: player.into(),
                token: tokens.token,
                refresh_token: tokens.refresh_token,
            },
        }
    }
}

/// Body of a successful token refresh.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub success: bool,
    pub data: TokenData,
}

/// A bare token pair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for RefreshResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            success: true,
            data: TokenData {
                token: tokens.token,
                refresh_token: tokens.refresh_token,
            },
        }
    }
}
