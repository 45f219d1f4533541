//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database reachable)
//!
//! # Settings
//! GET   /api/settings          - Merged settings record
//! GET   /api/settings/fields   - Field table (name, kind, group, default)
//! PATCH /api/settings          - Apply field edits and save
//! PUT   /api/settings          - Replace the whole record
//! POST  /api/settings/reset    - Restore defaults
//! ```

pub mod health;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the complete admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(settings::router())
}
