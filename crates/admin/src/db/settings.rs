//! Settings table operations.
//!
//! Site-wide settings live in `admin.settings` as JSONB rows with a `NULL`
//! `admin_user_id`. Queries are checked at runtime so the crate builds
//! without a live database.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

/// Get a global setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<JsonValue>, sqlx::Error> {
    sqlx::query_scalar::<_, JsonValue>(
        r"
        SELECT value FROM admin.settings
        WHERE key = $1 AND admin_user_id IS NULL
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

/// Set a global setting value, replacing any previous one.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn set_setting(pool: &PgPool, key: &str, value: &JsonValue) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO admin.settings (key, value, admin_user_id)
        VALUES ($1, $2, NULL)
        ON CONFLICT (key) WHERE admin_user_id IS NULL
        DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}
