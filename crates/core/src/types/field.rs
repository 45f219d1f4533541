//! Field metadata: value kinds, logical groups, and assignment errors.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The primitive type a settings field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form text.
    Text,
    /// A decimal number (shipping fees and thresholds).
    Number,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
        }
    }
}

/// Logical grouping of settings fields.
///
/// Informational only: the admin form uses it to lay fields out in tabs, the
/// record itself is flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsGroup {
    /// Store name, logo, description and slogan.
    Identity,
    /// Address, phone numbers, email, `WhatsApp` and working hours.
    Contact,
    /// Social network profile links.
    Social,
    /// Analytics, tag manager and ad pixel identifiers.
    Analytics,
    /// Delivery fee schedule and shipping copy.
    Shipping,
    /// Search engine metadata.
    Seo,
    /// Homepage and footer copy.
    Content,
}

impl SettingsGroup {
    /// All groups in display order.
    pub const ALL: &'static [Self] = &[
        Self::Identity,
        Self::Contact,
        Self::Social,
        Self::Analytics,
        Self::Shipping,
        Self::Seo,
        Self::Content,
    ];
}

impl fmt::Display for SettingsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Contact => "contact",
            Self::Social => "social",
            Self::Analytics => "analytics",
            Self::Shipping => "shipping",
            Self::Seo => "seo",
            Self::Content => "content",
        };
        f.write_str(name)
    }
}

/// Errors raised when assigning a value to a settings field.
///
/// A failed assignment never modifies the record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The name does not match any declared field.
    #[error("unknown settings field: {0}")]
    UnknownField(String),
    /// The value's kind cannot be stored in the field.
    #[error("field {field} expects {expected}, got {found}")]
    TypeMismatch {
        /// Wire name of the field.
        field: &'static str,
        /// Kind declared for the field.
        expected: FieldKind,
        /// Kind of the rejected value.
        found: FieldKind,
    },
    /// Text given to a numeric field did not parse as a number.
    #[error("field {field} expects a number, got {input:?}")]
    InvalidNumber {
        /// Wire name of the field.
        field: &'static str,
        /// The rejected input.
        input: String,
    },
    /// A JSON value that is neither a string nor a number.
    #[error("field {field} must be text or a number")]
    UnsupportedValue {
        /// Name of the field as given by the caller.
        field: String,
    },
}
