use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        GameSessionEntity, NewGameSession, ProgressUpdate, SessionStatsEntity, TimeWindow,
        WindowStatsEntity,
    },
    dto::format_timestamp,
};
use time::OffsetDateTime;

/// Progress reported when a finished run is reconciled into the server-held
/// player state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[validate(range(min = 0))]
    pub score: i64,
    #[validate(range(min = 0.0))]
    pub distance: f64,
    #[validate(range(min = 0))]
    pub coins: i64,
    #[validate(range(min = 1))]
    pub level: i32,
    #[validate(range(min = 0))]
    pub experience: i64,
    /// When present, replaces the stored achievement set wholesale.
    #[serde(default)]
    pub achievements: Option<Vec<String>>,
    /// When present, one immutable session row is recorded with the sync.
    #[serde(default)]
    #[validate(nested)]
    pub game_session: Option<GameSessionInput>,
}

/// Session details accompanying a sync request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionInput {
    /// Run length in seconds.
    #[validate(range(min = 0))]
    pub duration: i64,
    #[validate(range(min = 0))]
    pub obstacles_hit: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub obstacles_avoided: i32,
    /// Coins the session itself reports. The aggregate credit uses the
    /// top-level `coins` field; the two are carried as-is, unreconciled.
    #[validate(range(min = 0))]
    pub coins_collected: i64,
    #[validate(range(min = 0))]
    pub power_ups_used: i32,
    /// Defaults to the request's top-level `level` when absent.
    #[serde(default)]
    pub level_reached: Option<i32>,
}

impl SyncRequest {
    /// Convert the validated request into the storage-layer update.
    pub fn into_progress(self, now: OffsetDateTime) -> ProgressUpdate {
        let level = self.level;
        ProgressUpdate {
            score: self.score,
            distance: self.distance,
            coins: self.coins,
            level,
            experience: self.experience,
            achievements: self.achievements,
            session: self.game_session.map(|session| NewGameSession {
                duration_seconds: session.duration,
                obstacles_avoided: session.obstacles_avoided,
                obstacles_hit: session.obstacles_hit,
                coins_collected: session.coins_collected,
                power_ups_used: session.power_ups_used,
                level_reached: session.level_reached.unwrap_or(level),
            }),
            now,
        }
    }
}

/// One recorded run in the session history.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: Uuid,
    pub score: i64,
    pub distance: f64,
    pub duration: i64,
    pub obstacles_avoided: i32,
    pub obstacles_hit: i32,
    pub coins_collected: i64,
    pub power_ups_used: i32,
    pub level_reached: i32,
    pub created_at: String,
}

impl From<GameSessionEntity> for SessionDto {
    fn from(session: GameSessionEntity) -> Self {
        Self {
            id: session.id,
            score: session.score,
            distance: session.distance,
            duration: session.duration_seconds,
            obstacles_avoided: session.obstacles_avoided,
            obstacles_hit: session.obstacles_hit,
            coins_collected: session.coins_collected,
            power_ups_used: session.power_ups_used,
            level_reached: session.level_reached,
            created_at: format_timestamp(session.created_at),
        }
    }
}

/// Session history page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionsResponse {
    pub success: bool,
    pub data: Vec<SessionDto>,
}

/// Pagination query for the session history.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SessionsParams {
    #[serde(default = "default_sessions_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_sessions_limit() -> i64 {
    20
}

/// Time window selector for the game statistics overview.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StatsParams {
    #[serde(default)]
    pub range: TimeWindow,
}

/// Game statistics overview body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GameStatsResponse {
    pub success: bool,
    pub data: GameStatsData,
}

/// Global leaderboard aggregates, plus the caller's own when authenticated.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStatsData {
    pub global: GlobalStatsDto,
    /// Absent for anonymous callers.
    pub player: Option<PlayerSessionStatsDto>,
    pub time_range: TimeWindow,
}

/// Aggregates over every leaderboard entry in the window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatsDto {
    pub total_players: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub average_distance: f64,
    pub highest_distance: f64,
}

/// Aggregates over the caller's sessions in the window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSessionStatsDto {
    pub games_played: i64,
    pub average_score: f64,
    pub best_score: i64,
    pub average_distance: f64,
    pub best_distance: f64,
    pub average_duration: f64,
}

impl GameStatsResponse {
    pub fn new(
        global: WindowStatsEntity,
        player: Option<SessionStatsEntity>,
        window: TimeWindow,
    ) -> Self {
        Self {
            success: true,
            data: GameStatsData {
                global: GlobalStatsDto {
                    total_players: global.unique_players,
                    average_score: global.average_score,
                    highest_score: global.highest_score,
                    average_distance: global.average_distance,
                    highest_distance: global.highest_distance,
                },
                player: player.map(|stats| PlayerSessionStatsDto {
                    games_played: stats.games_played,
                    average_score: stats.average_score,
                    best_score: stats.best_score,
                    average_distance: stats.average_distance,
                    best_distance: stats.best_distance,
                    average_duration: stats.average_duration,
                }),
                time_range: window,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn base_request() -> SyncRequest {
        SyncRequest {
            score: 80,
            distance: 420.0,
            coins: 12,
            level: 3,
            experience: 150,
            achievements: None,
            game_session: None,
        }
    }

    #[test]
    fn negative_fields_fail_validation() {
        let mut request = base_request();
        request.score = -1;
        assert!(request.validate().is_err());

        let mut request = base_request();
        request.coins = -5;
        assert!(request.validate().is_err());

        let mut request = base_request();
        request.level = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn session_level_defaults_to_request_level() {
        let mut request = base_request();
        request.game_session = Some(GameSessionInput {
            duration: 60,
            obstacles_hit: 2,
            obstacles_avoided: 0,
            coins_collected: 5,
            power_ups_used: 1,
            level_reached: None,
        });
        let progress = request.into_progress(OffsetDateTime::now_utc());
        assert_eq!(progress.session.unwrap().level_reached, 3);
    }

    #[test]
    fn camel_case_payload_deserializes() {
        let request: SyncRequest = serde_json::from_value(serde_json::json!({
            "score": 80,
            "distance": 420.0,
            "coins": 12,
            "level": 1,
            "experience": 0,
            "gameSession": {
                "duration": 60,
                "obstaclesHit": 2,
                "coinsCollected": 5,
                "powerUpsUsed": 1
            }
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        let session = request.game_session.unwrap();
        assert_eq!(session.obstacles_hit, 2);
        assert_eq!(session.coins_collected, 5);
    }
}
