/// Account registration, login, and token refresh.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Progress sync and session history.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Leaderboard submissions, listings, and rank lookups.
pub mod leaderboard_service;
/// Player profile, statistics, and purchases.
pub mod player_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
