//! Core types for the storefront site settings.
//!
//! This module provides the settings record, its declared field table, and
//! the coercion rules for field values.

pub mod field;
pub mod settings;
pub mod value;

pub use field::{FieldError, FieldKind, SettingsGroup};
pub use settings::{ID_KEY, MergeReport, PayloadError, SettingsField, SiteSettings};
pub use value::FieldValue;
