use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        LeaderboardPage, RankedEntryEntity, SortField, SubmittedEntry, TimeWindow, TopCriteria,
        TopPlayerEntity, WindowStatsEntity,
    },
    dto::{common::Pagination, format_timestamp},
};

/// Query parameters for a paginated leaderboard listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Time window to list, defaults to `all`.
    #[serde(default)]
    pub range: TimeWindow,
    /// Field to order and rank by, defaults to `score`.
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Query parameters for a submission or rank lookup.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct WindowParams {
    #[serde(default)]
    pub range: TimeWindow,
    #[serde(default)]
    pub sort_by: SortField,
}

/// Payload submitting one run's result to a leaderboard window.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEntryRequest {
    #[validate(range(min = 0))]
    pub score: i64,
    #[validate(range(min = 0.0))]
    pub distance: f64,
    #[validate(range(min = 1))]
    pub level: i32,
}

/// Body returned after a submission is stored.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitEntryResponse {
    pub success: bool,
    pub data: SubmittedEntryDto,
}

/// The stored entry id and a best-effort rank snapshot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedEntryDto {
    pub entry_id: Uuid,
    /// 1-based rank at submission time; later submissions can displace it.
    pub rank: i64,
    pub time_range: TimeWindow,
}

impl SubmitEntryResponse {
    pub fn new(entry: SubmittedEntry, window: TimeWindow) -> Self {
        Self {
            success: true,
            data: SubmittedEntryDto {
                entry_id: entry.id,
                rank: entry.rank,
                time_range: window,
            },
        }
    }
}

/// One ranked leaderboard row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntryDto {
    pub id: Uuid,
    pub rank: i64,
    pub score: i64,
    pub distance: f64,
    pub level: i32,
    pub player: EntryPlayerDto,
    pub created_at: String,
}

/// Public player info attached to a leaderboard row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryPlayerDto {
    pub username: String,
    pub avatar: Option<String>,
    pub level: Option<i32>,
}

impl From<RankedEntryEntity> for RankedEntryDto {
    fn from(entry: RankedEntryEntity) -> Self {
        Self {
            id: entry.id,
            rank: entry.rank,
            score: entry.score,
            distance: entry.distance,
            level: entry.level,
            player: EntryPlayerDto {
                // Anonymous submissions and deleted accounts show as guests.
                username: entry.username.unwrap_or_else(|| "Guest".into()),
                avatar: entry.avatar,
                level: entry.player_level,
            },
            created_at: format_timestamp(entry.created_at),
        }
    }
}

/// One page of a leaderboard window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub success: bool,
    pub data: LeaderboardData,
}

/// Entries and pagination, echoing the window and sort they were taken from.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardData {
    pub entries: Vec<RankedEntryDto>,
    pub pagination: Pagination,
    pub time_range: TimeWindow,
    pub sort_by: SortField,
}

impl LeaderboardResponse {
    pub fn new(
        page: LeaderboardPage,
        window: TimeWindow,
        sort: SortField,
        limit: i64,
        offset: i64,
    ) -> Self {
        Self {
            success: true,
            data: LeaderboardData {
                entries: page.entries.into_iter().map(Into::into).collect(),
                pagination: Pagination::new(page.total, limit, offset),
                time_range: window,
                sort_by: sort,
            },
        }
    }
}

/// Query parameters for the top-players board.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TopParams {
    #[serde(default)]
    pub range: TimeWindow,
    #[serde(default)]
    pub criteria: TopCriteria,
    #[serde(default = "default_top_limit")]
    pub limit: i64,
}

fn default_top_limit() -> i64 {
    10
}

/// Top-players board body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopPlayersResponse {
    pub success: bool,
    pub data: TopPlayersData,
}

/// Ranked players, echoing the criteria and window they were ranked under.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPlayersData {
    pub players: Vec<TopPlayerDto>,
    pub criteria: TopCriteria,
    pub time_range: TimeWindow,
}

/// One player on the top board with their best windowed results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPlayerDto {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub level: i32,
    pub total_coins: i64,
    pub best_score: i64,
    pub best_distance: f64,
    pub best_level: i32,
    pub rank: i64,
}

impl From<TopPlayerEntity> for TopPlayerDto {
    fn from(player: TopPlayerEntity) -> Self {
        Self {
            id: player.id,
            username: player.username,
            avatar: player.avatar,
            level: player.level,
            total_coins: player.total_coins,
            best_score: player.best_score,
            best_distance: player.best_distance,
            best_level: player.best_level,
            rank: player.rank,
        }
    }
}

impl TopPlayersResponse {
    pub fn new(players: Vec<TopPlayerEntity>, criteria: TopCriteria, window: TimeWindow) -> Self {
        Self {
            success: true,
            data: TopPlayersData {
                players: players.into_iter().map(Into::into).collect(),
                criteria,
                time_range: window,
            },
        }
    }
}

/// Body of a player's own rank lookup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RankResponse {
    pub success: bool,
    pub data: RankedEntryDto,
}

/// Aggregate statistics body for one window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WindowStatsResponse {
    pub success: bool,
    pub data: WindowStatsDto,
}

/// Aggregates over every entry in a window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WindowStatsDto {
    pub time_range: TimeWindow,
    pub total_entries: i64,
    pub unique_players: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub average_distance: f64,
    pub highest_distance: f64,
    pub average_level: f64,
    pub highest_level: i32,
}

impl WindowStatsResponse {
    pub fn new(stats: WindowStatsEntity, window: TimeWindow) -> Self {
        Self {
            success: true,
            data: WindowStatsDto {
                time_range: window,
                total_entries: stats.total_entries,
                unique_players: stats.unique_players,
                average_score: stats.average_score,
                highest_score: stats.highest_score,
                average_distance: stats.average_distance,
                highest_distance: stats.highest_distance,
                average_level: stats.average_level,
                highest_level: stats.highest_level,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_defaults() {
        let params: ListParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params.range, TimeWindow::All);
        assert_eq!(params.sort_by, SortField::Score);
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn list_params_parse_window_and_sort() {
        let params: ListParams = serde_json::from_value(serde_json::json!({
            "range": "weekly",
            "sortBy": "distance",
            "limit": 10,
            "offset": 20
        }))
        .unwrap();
        assert_eq!(params.range, TimeWindow::Weekly);
        assert_eq!(params.sort_by, SortField::Distance);
    }

    #[test]
    fn unknown_window_is_rejected() {
        let params: Result<ListParams, _> =
            serde_json::from_value(serde_json::json!({ "range": "hourly" }));
        assert!(params.is_err());
    }

    #[test]
    fn anonymous_entries_render_as_guest() {
        let dto: RankedEntryDto = RankedEntryEntity {
            id: Uuid::new_v4(),
            rank: 1,
            score: 100,
            distance: 50.0,
            level: 2,
            username: None,
            avatar: None,
            player_level: None,
            created_at: time::OffsetDateTime::now_utc(),
        }
        .into();
        assert_eq!(dto.player.username, "Guest");
    }
}
