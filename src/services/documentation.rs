use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Touristoo Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::auth::logout,
        crate::routes::player::get_profile,
        crate::routes::player::update_profile,
        crate::routes::player::get_stats,
        crate::routes::player::get_achievements,
        crate::routes::player::update_achievements,
        crate::routes::player::record_purchase,
        crate::routes::player::list_purchases,
        crate::routes::game::sync_progress,
        crate::routes::game::list_sessions,
        crate::routes::game::game_stats,
        crate::routes::game::submit_entry,
        crate::routes::leaderboard::list_entries,
        crate::routes::leaderboard::top_players,
        crate::routes::leaderboard::my_rank,
        crate::routes::leaderboard::window_stats,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::ServiceStatus,
            crate::dto::common::ApiMessage,
            crate::dto::common::Pagination,
            crate::dto::auth::RegisterRequest,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::RefreshRequest,
            crate::dto::auth::AuthResponse,
            crate::dto::auth::AuthData,
            crate::dto::auth::PlayerSummary,
            crate::dto::auth::RefreshResponse,
            crate::dto::auth::TokenData,
            crate::dto::player::ProfileResponse,
            crate::dto::player::ProfileData,
            crate::dto::player::ProfileStats,
            crate::dto::player::UpdateProfileRequest,
            crate::dto::player::StatsResponse,
            crate::dto::player::PlayerStatsDto,
            crate::dto::player::AchievementsResponse,
            crate::dto::player::UpdateAchievementsRequest,
            crate::dto::player::ItemType,
            crate::dto::player::CurrencyKind,
            crate::dto::player::PurchaseRequest,
            crate::dto::player::PurchaseResponse,
            crate::dto::player::PurchaseDto,
            crate::dto::player::PurchasesResponse,
            crate::dto::game::SyncRequest,
            crate::dto::game::GameSessionInput,
            crate::dto::game::SessionDto,
            crate::dto::game::SessionsResponse,
            crate::dto::game::GameStatsResponse,
            crate::dto::game::GameStatsData,
            crate::dto::game::GlobalStatsDto,
            crate::dto::game::PlayerSessionStatsDto,
            crate::dto::leaderboard::SubmitEntryRequest,
            crate::dto::leaderboard::SubmitEntryResponse,
            crate::dto::leaderboard::SubmittedEntryDto,
            crate::dto::leaderboard::RankedEntryDto,
            crate::dto::leaderboard::EntryPlayerDto,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::LeaderboardData,
            crate::dto::leaderboard::TopPlayersResponse,
            crate::dto::leaderboard::TopPlayersData,
            crate::dto::leaderboard::TopPlayerDto,
            crate::dto::leaderboard::RankResponse,
            crate::dto::leaderboard::WindowStatsResponse,
            crate::dto::leaderboard::WindowStatsDto,
            crate::dao::models::TimeWindow,
            crate::dao::models::SortField,
            crate::dao::models::TopCriteria,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login, and token refresh"),
        (name = "player", description = "Player profile, statistics, and purchases"),
        (name = "game", description = "Progress sync and session history"),
        (name = "leaderboard", description = "Leaderboard listings and rank lookups"),
    )
)]
pub struct ApiDoc;
