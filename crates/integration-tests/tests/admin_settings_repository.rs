//! Integration tests for loading, editing and saving site settings.
//!
//! These run the repository and editor session together against the
//! in-memory store, so no database is needed.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use dreamtrade_admin::settings::{EditorSession, MemoryStore, SessionError, SessionStatus};
use dreamtrade_core::{SettingsField, SiteSettings};
use dreamtrade_integration_tests::{SwitchableStore, repository};

const KEY: &str = "site_settings";

// =============================================================================
// Merge With Defaults
// =============================================================================

#[tokio::test]
async fn test_partial_payload_merges_onto_defaults() {
    let store = MemoryStore::with_entry(KEY, json!({"store_name": "Acme"}));
    let repo = repository(Arc::new(store));

    let settings = repo.load().await;
    let defaults = SiteSettings::default();

    assert_eq!(settings.store_name, "Acme");
    assert_eq!(settings.delivery_fee_giza, Decimal::from(50));
    for &field in SettingsField::ALL {
        if field != SettingsField::StoreName {
            assert_eq!(settings.get(field), defaults.get(field), "{field} kept its default");
        }
    }
}

#[tokio::test]
async fn test_every_missing_field_takes_its_default() {
    let store = MemoryStore::with_entry(
        KEY,
        json!({
            "id": "row-1",
            "store_phone": "0100",
            "delivery_fee_cairo": 75,
            "instagram_url": "https://instagram.com/acme",
        }),
    );
    let repo = repository(Arc::new(store));

    let settings = repo.load().await;
    let mut expected = SiteSettings::default();
    expected.id = Some("row-1".to_string());
    expected.store_phone = "0100".to_string();
    expected.delivery_fee_cairo = Decimal::from(75);
    expected.instagram_url = "https://instagram.com/acme".to_string();

    assert_eq!(settings, expected);
}

// =============================================================================
// Failure Isolation
// =============================================================================

#[tokio::test]
async fn test_unreadable_store_loads_defaults() {
    let store = Arc::new(SwitchableStore::new(MemoryStore::with_entry(
        KEY,
        json!({"store_name": "Acme"}),
    )));
    store.fail_reads(true);
    let repo = repository(store.clone());

    assert_eq!(repo.load().await, SiteSettings::default());

    // Once the store recovers, the persisted record is visible again.
    store.fail_reads(false);
    assert_eq!(repo.load().await.store_name, "Acme");
}

#[tokio::test]
async fn test_corrupt_payload_loads_defaults() {
    let store = MemoryStore::with_entry(KEY, json!("not a settings object"));
    let repo = repository(Arc::new(store));

    assert_eq!(repo.load().await, SiteSettings::default());
}

#[tokio::test]
async fn test_failed_save_keeps_draft_and_signals_error() {
    let store = Arc::new(SwitchableStore::new(MemoryStore::new()));
    let repo = repository(store.clone());
    let mut session = EditorSession::open(&repo).await;

    session.set_field("store_phone", "0100").unwrap();
    let draft_before = session.draft().clone();

    store.fail_writes(true);
    let err = session.save(&repo).await.unwrap_err();

    assert!(matches!(err, SessionError::Save(_)));
    assert_eq!(session.draft(), &draft_before);
    assert!(matches!(session.status(), SessionStatus::Failed { .. }));
    assert!(session.last_error().is_some());
    assert!(session.is_dirty());

    // Retrying after the store recovers succeeds with the same draft.
    store.fail_writes(false);
    let saved = session.save(&repo).await.unwrap();
    assert_eq!(saved.store_phone, "0100");
    assert_eq!(session.status(), &SessionStatus::Ready);
    assert!(!session.is_dirty());
}

// =============================================================================
// Editing
// =============================================================================

#[tokio::test]
async fn test_delivery_fee_edit_round_trip() {
    let store = MemoryStore::new();
    let repo = repository(Arc::new(store.clone()));

    let mut session = EditorSession::open(&repo).await;
    assert_eq!(session.draft().delivery_fee_cairo, Decimal::from(50));

    session.set_field("delivery_fee_cairo", 80).unwrap();
    assert_eq!(session.draft().delivery_fee_cairo, Decimal::from(80));

    session.save(&repo).await.unwrap();
    let stored = store.snapshot(KEY).await.unwrap();
    assert_eq!(stored["delivery_fee_cairo"], 80);

    let fresh = EditorSession::open(&repo).await;
    assert_eq!(fresh.draft().delivery_fee_cairo, Decimal::from(80));
}

#[tokio::test]
async fn test_single_field_edit_changes_nothing_else() {
    let repo = repository(Arc::new(MemoryStore::new()));
    let mut session = EditorSession::open(&repo).await;
    let before = session.draft().clone();

    session.set_field("delivery_fee_cairo", 75).unwrap();

    assert_eq!(
        session.draft().changed_fields(&before),
        vec![SettingsField::DeliveryFeeCairo]
    );
    assert_eq!(session.dirty_fields(), vec![SettingsField::DeliveryFeeCairo]);
}

#[tokio::test]
async fn test_rejected_edit_leaves_draft_unchanged() {
    let repo = repository(Arc::new(MemoryStore::new()));
    let mut session = EditorSession::open(&repo).await;
    let before = session.draft().clone();

    assert!(session.set_field("delivery_fee_cairo", "a lot").is_err());
    assert!(session.set_field("store_name", 12).is_err());
    assert!(session.set_field("not_a_field", "x").is_err());

    assert_eq!(session.draft(), &before);
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_save_then_load_returns_saved_record() {
    let repo = repository(Arc::new(MemoryStore::new()));

    let mut record = SiteSettings::default();
    record.store_email = "hello@acme.test".to_string();
    record.free_shipping_threshold = Decimal::new(75_050, 1);

    let saved = repo.save(record.clone()).await.unwrap();
    assert_eq!(saved, record);
    assert_eq!(repo.load().await, record);
}

#[tokio::test]
async fn test_long_fraction_fees_survive_save_and_reload() {
    let store = MemoryStore::new();
    let repo = repository(Arc::new(store.clone()));
    let mut session = EditorSession::open(&repo).await;

    session.set_field("delivery_fee_cairo", "12.345678901234567891").unwrap();
    session.set_field("free_shipping_threshold", "99999999999999999999.5").unwrap();
    let saved = session.save(&repo).await.unwrap();

    let loaded = repo.refresh().await;
    assert_eq!(loaded, saved);
    assert_eq!(loaded.delivery_fee_cairo.to_string(), "12.345678901234567891");

    let stored = store.snapshot(KEY).await.unwrap();
    assert_eq!(stored["delivery_fee_cairo"], "12.345678901234567891");
}

#[tokio::test]
async fn test_sessions_sharing_a_repository_see_each_others_saves() {
    let repo = repository(Arc::new(MemoryStore::new()));
    let mut first = EditorSession::open(&repo).await;
    let mut second = EditorSession::open(&repo).await;

    first.set_field("store_slogan", "Cool air").unwrap();
    first.save(&repo).await.unwrap();

    // The second session's canonical copy is stale until it reloads.
    assert_ne!(second.draft().store_slogan, "Cool air");
    second.reload(&repo).await;
    assert_eq!(second.draft().store_slogan, "Cool air");
}

#[tokio::test]
async fn test_reset_restores_defaults() {
    let store = MemoryStore::with_entry(KEY, json!({"id": "row-1", "store_name": "Acme"}));
    let repo = repository(Arc::new(store));

    let reset = repo.reset().await.unwrap();

    let mut expected = SiteSettings::default();
    expected.id = Some("row-1".to_string());
    assert_eq!(reset, expected);
    assert_eq!(repo.load().await, expected);
}
