//! Site settings API.
//!
//! JSON endpoints over the [`SettingsRepository`](crate::settings::SettingsRepository).
//! Edits go through an [`EditorSession`] so a rejected field leaves the stored
//! record untouched.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::instrument;

use dreamtrade_core::{
    FieldError, FieldKind, FieldValue, ID_KEY, SettingsField, SettingsGroup, SiteSettings,
};

use crate::error::AppError;
use crate::settings::EditorSession;
use crate::state::AppState;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/settings",
            get(show).patch(update).put(replace),
        )
        .route("/api/settings/fields", get(fields))
        .route("/api/settings/reset", post(reset))
}

/// One row of the field table.
#[derive(Debug, Serialize)]
pub struct FieldInfo {
    pub name: &'static str,
    pub kind: FieldKind,
    pub group: SettingsGroup,
    pub default: JsonValue,
}

/// Current settings, merged onto defaults.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<SiteSettings> {
    Json(state.settings().load().await)
}

/// Every settings field in declaration order.
pub async fn fields() -> Json<Vec<FieldInfo>> {
    let defaults = SiteSettings::default();
    let table = SettingsField::ALL
        .iter()
        .map(|&field| FieldInfo {
            name: field.name(),
            kind: field.kind(),
            group: field.group(),
            default: defaults.get(field).to_json(),
        })
        .collect();
    Json(table)
}

/// Apply a partial set of field edits and save the result.
///
/// # Errors
///
/// Returns 400 if the body is not an object or any edit is rejected (nothing
/// is written), and 500 if the store write fails.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<SiteSettings>, AppError> {
    let JsonValue::Object(edits) = body else {
        return Err(AppError::BadRequest(
            "expected an object of field edits".to_string(),
        ));
    };

    let mut session = EditorSession::open(state.settings()).await;
    for (name, raw) in &edits {
        // Record identity is not editable.
        if name == ID_KEY {
            continue;
        }
        let value = FieldValue::from_json(raw)
            .ok_or_else(|| FieldError::UnsupportedValue { field: name.clone() })?;
        session.set_field(name, value)?;
    }

    tracing::info!(fields = ?session.dirty_fields(), "Updating site settings");
    let saved = session.save(state.settings()).await?;
    Ok(Json(saved))
}

/// Replace the whole record. Omitted fields fall back to their defaults.
///
/// # Errors
///
/// Returns 400 for unknown fields or values that do not fit their field, and
/// 500 if the store write fails.
#[instrument(skip(state, body))]
pub async fn replace(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<SiteSettings>, AppError> {
    let JsonValue::Object(edits) = body else {
        return Err(AppError::BadRequest(
            "expected a settings object".to_string(),
        ));
    };

    let mut record = SiteSettings::from_edits(&edits)?;
    if !edits.contains_key(ID_KEY) {
        record.id = state.settings().load().await.id;
    }

    tracing::info!("Replacing site settings");
    let saved = state.settings().save(record).await?;
    Ok(Json(saved))
}

/// Restore every field to its default.
///
/// # Errors
///
/// Returns 500 if the store write fails.
#[instrument(skip(state))]
pub async fn reset(State(state): State<AppState>) -> Result<Json<SiteSettings>, AppError> {
    tracing::info!("Resetting site settings to defaults");
    let saved = state.settings().reset().await?;
    Ok(Json(saved))
}
