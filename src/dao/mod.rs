/// Player, session, leaderboard, and purchase storage operations.
pub mod data_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
