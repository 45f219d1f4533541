//! Site settings commands.
//!
//! # Usage
//!
//! ```bash
//! # Show current settings, grouped
//! dt-cli settings show
//!
//! # Show the raw record as JSON
//! dt-cli settings show --json
//!
//! # List every field with its kind and default
//! dt-cli settings fields
//!
//! # Edit fields (numbers are parsed from text)
//! dt-cli settings set store_phone=01000000000 delivery_fee_cairo=60
//!
//! # Restore defaults
//! dt-cli settings reset
//! ```

use std::fmt::Write as _;

use dreamtrade_admin::config::{AdminConfig, ConfigError, StoreConfig};
use dreamtrade_admin::settings::{EditorSession, SessionError, SettingsError, SettingsRepository};
use dreamtrade_admin::state::AppState;
use dreamtrade_core::{FieldValue, SettingsField, SettingsGroup, SiteSettings};
use thiserror::Error;

/// Errors that can occur during settings commands.
#[derive(Debug, Error)]
pub enum SettingsCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings commands need a PostgreSQL settings store (SETTINGS_STORE=postgres)")]
    NoDatabase,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid assignment '{0}', expected <field>=<value>")]
    InvalidAssignment(String),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

async fn repository() -> Result<SettingsRepository, SettingsCommandError> {
    let config = AdminConfig::from_env()?;
    require_database(&config)?;
    let state = AppState::from_config(config).await?;
    Ok(state.settings().clone())
}

/// Print the current settings.
///
/// # Errors
///
/// Returns an error if configuration or the database connection fails.
pub async fn show(json: bool) -> Result<(), SettingsCommandError> {
    let settings = repository().await?.load().await;
    let output = if json {
        serde_json::to_string_pretty(&settings)?
    } else {
        render_grouped(&settings)
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

/// Print the field table.
pub fn fields() {
    let output = render_fields();

    #[allow(clippy::print_stdout)]
    {
        print!("{output}");
    }
}

/// Apply `field=value` assignments and save.
///
/// All assignments are validated before anything is written.
///
/// # Errors
///
/// Returns an error for malformed assignments, unknown fields, values that do
/// not fit their field, or a failed write.
pub async fn set(assignments: &[String]) -> Result<(), SettingsCommandError> {
    let edits = assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let repo = repository().await?;
    let mut session = EditorSession::open(&repo).await;
    for (name, value) in edits {
        session.set_field(name, FieldValue::from(value))?;
    }

    let changed = session.dirty_fields();
    if changed.is_empty() {
        tracing::info!("No changes to save");
        return Ok(());
    }

    session.save(&repo).await?;
    for field in changed {
        tracing::info!(field = field.name(), "Updated");
    }
    Ok(())
}

/// Restore every field to its default.
///
/// # Errors
///
/// Returns an error if configuration, the database connection or the write
/// fails.
pub async fn reset() -> Result<(), SettingsCommandError> {
    repository().await?.reset().await?;
    tracing::info!("Site settings reset to defaults");
    Ok(())
}

// A memory store lives only as long as this process, so reads would show
// defaults and writes would vanish on exit.
const fn require_database(config: &AdminConfig) -> Result<(), SettingsCommandError> {
    match config.store {
        StoreConfig::Postgres { .. } => Ok(()),
        StoreConfig::Memory => Err(SettingsCommandError::NoDatabase),
    }
}

fn parse_assignment(raw: &str) -> Result<(&str, &str), SettingsCommandError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(SettingsCommandError::InvalidAssignment(raw.to_owned())),
    }
}

fn render_grouped(settings: &SiteSettings) -> String {
    let mut out = String::new();
    if let Some(id) = &settings.id {
        let _ = writeln!(out, "id = {id}");
    }
    for &group in SettingsGroup::ALL {
        let _ = writeln!(out, "[{group}]");
        for field in SettingsField::in_group(group) {
            let _ = writeln!(out, "  {field} = {}", settings.get(field));
        }
    }
    out
}

fn render_fields() -> String {
    let defaults = SiteSettings::default();
    let mut out = String::new();
    for &field in SettingsField::ALL {
        let _ = writeln!(
            out,
            "{:<26} {:<7} {:<10} {}",
            field.name(),
            field.kind().to_string(),
            field.group().to_string(),
            defaults.get(field)
        );
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("store_phone=0100").unwrap(),
            ("store_phone", "0100")
        );
        // Only the first '=' separates name from value.
        assert_eq!(
            parse_assignment("seo_title=a=b").unwrap(),
            ("seo_title", "a=b")
        );
        assert_eq!(parse_assignment("about_content=").unwrap(), ("about_content", ""));
    }

    #[test]
    fn test_parse_assignment_rejects_malformed() {
        for raw in ["store_phone", "=0100", " =x"] {
            assert!(matches!(
                parse_assignment(raw),
                Err(SettingsCommandError::InvalidAssignment(_))
            ));
        }
    }

    #[test]
    fn test_memory_store_is_rejected() {
        let config =
            AdminConfig::from_lookup(|key| (key == "SETTINGS_STORE").then(|| "memory".to_string()))
                .unwrap();
        assert!(matches!(
            require_database(&config),
            Err(SettingsCommandError::NoDatabase)
        ));

        let config = AdminConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/dreamtrade".to_string())
        })
        .unwrap();
        assert!(require_database(&config).is_ok());
    }

    #[test]
    fn test_render_grouped() {
        let mut settings = SiteSettings::default();
        settings.id = Some("row-1".to_string());
        let out = render_grouped(&settings);

        assert!(out.starts_with("id = row-1\n[identity]\n"));
        assert!(out.contains("  store_name_en = Dream For Trade\n"));
        assert!(out.contains("[shipping]\n  delivery_fee_cairo = 50\n"));
    }

    #[test]
    fn test_render_fields_lists_every_field() {
        let out = render_fields();
        assert_eq!(out.lines().count(), SettingsField::ALL.len());
        assert!(out.lines().any(|line| line.starts_with("free_shipping_threshold")
            && line.contains("number")
            && line.ends_with("10000")));
    }
}
