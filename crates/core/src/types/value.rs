//! Field values and the coercion rules between them.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number as JsonNumber, Value as JsonValue};

use super::field::{FieldError, FieldKind};

/// A value for a single settings field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Value for a text field.
    Text(String),
    /// Value for a numeric field.
    Number(Decimal),
}

impl FieldValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
        }
    }

    /// Convert a JSON scalar into a field value.
    ///
    /// Strings become [`FieldValue::Text`], numbers become
    /// [`FieldValue::Number`]. Anything else (null, bool, arrays, objects,
    /// or numbers outside the decimal range) yields `None`.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(Self::Text(s.clone())),
            JsonValue::Number(n) => number_to_decimal(n).map(Self::Number),
            _ => None,
        }
    }

    /// Convert into a JSON value.
    ///
    /// Whole numbers are written as JSON integers. Other numbers are written
    /// as floats when the float reads back as the same decimal, and as exact
    /// decimal text otherwise; number fields parse that text on the way in.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Number(d) => decimal_to_json(*d),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(d) => write!(f, "{}", d.normalize()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        Self::Number(d)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(Decimal::from(n))
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(Decimal::from(n))
    }
}

fn number_to_decimal(n: &JsonNumber) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    // Floats print in shortest round-trip form, possibly with an exponent.
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn decimal_to_json(d: Decimal) -> JsonValue {
    if d.fract().is_zero()
        && let Some(n) = d.to_i64()
    {
        return JsonValue::from(n);
    }
    d.to_f64()
        .and_then(JsonNumber::from_f64)
        .filter(|n| number_to_decimal(n) == Some(d))
        .map_or_else(|| JsonValue::String(d.normalize().to_string()), JsonValue::Number)
}

/// Rust types that can back a settings field.
pub(crate) trait FieldType: Sized {
    /// Wrap the stored value for reading.
    fn to_value(&self) -> FieldValue;

    /// Coerce an incoming value for the named field.
    fn from_value(field: &'static str, value: FieldValue) -> Result<Self, FieldError>;
}

impl FieldType for String {
    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_value(field: &'static str, value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Text(s) => Ok(s),
            FieldValue::Number(_) => Err(FieldError::TypeMismatch {
                field,
                expected: FieldKind::Text,
                found: FieldKind::Number,
            }),
        }
    }
}

impl FieldType for Decimal {
    fn to_value(&self) -> FieldValue {
        FieldValue::Number(*self)
    }

    fn from_value(field: &'static str, value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Number(d) => Ok(d),
            // Form inputs arrive as text; parse rather than store the string.
            FieldValue::Text(s) => {
                Self::from_str(s.trim()).map_err(|_| FieldError::InvalidNumber { field, input: s })
            }
        }
    }
}
