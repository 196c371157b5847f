//! Client-side companion pieces: the typed API client, the local offline
//! cache, and the in-run state reducer used by the game loop.

pub mod api;
pub mod cache;
pub mod entities;
pub mod run_state;
