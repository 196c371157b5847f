//! Touristoo Runner backend and client core.
//!
//! The server side exposes the REST API for accounts, progress sync,
//! leaderboards, and purchases; the `client` feature adds the typed API
//! client, the local offline cache, and the in-run state reducer.

pub mod auth;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
