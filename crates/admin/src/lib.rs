//! DreamTrade Admin library.
//!
//! This crate provides the site settings service as a library,
//! allowing it to be tested and reused by the CLI.
//!
//! - [`settings`] - Repository, cache and editor session for the settings record
//! - [`routes`] - JSON API over the repository
//! - [`db`] - `PostgreSQL` access to the `admin.settings` table

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod settings;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Build the admin application router with its state attached.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    routes::routes().with_state(state)
}
