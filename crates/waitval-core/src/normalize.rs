//! Canonical text form of column values
//!
//! Targets are plain strings, so every column value is rendered to the text
//! it is compared against. The rendering depends only on the value, never on
//! the driver it came from.

use std::fmt;
use waitval_rdbc::Value;

/// A column value in its comparable form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedValue {
    /// Canonical text of the value
    Text(String),
    /// No comparable form exists; never matches a target
    Absent,
}

impl NormalizedValue {
    /// Text form, `None` when absent
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Absent => None,
        }
    }

    /// Whether a comparable form exists
    #[inline]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Absent => f.write_str("<absent>"),
        }
    }
}

/// Render a value to the text it is compared by
///
/// | value       | text                                       |
/// |-------------|--------------------------------------------|
/// | Int         | decimal, sign kept                         |
/// | Float       | shortest round-trip decimal, no exponent   |
/// | Bool        | `true` / `false`                           |
/// | Text        | unchanged                                  |
/// | Bytes       | UTF-8, invalid sequences become U+FFFD     |
/// | Null        | `null`                                     |
/// | Unsupported | [`NormalizedValue::Absent`]                |
pub fn normalize(value: &Value) -> NormalizedValue {
    match value {
        Value::Int(n) => NormalizedValue::Text(n.to_string()),
        Value::Float(f) => NormalizedValue::Text(format_float(*f)),
        Value::Bool(b) => NormalizedValue::Text(b.to_string()),
        Value::Text(s) => NormalizedValue::Text(s.clone()),
        Value::Bytes(b) => NormalizedValue::Text(String::from_utf8_lossy(b).into_owned()),
        Value::Null => NormalizedValue::Text("null".to_owned()),
        Value::Unsupported { .. } => NormalizedValue::Absent,
    }
}

// `Display` for f64 already prints the shortest round-trip digits and never
// switches to exponent notation.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_owned()
    } else if f.is_infinite() {
        let sign = if f.is_sign_positive() { '+' } else { '-' };
        format!("{}Inf", sign)
    } else {
        f.to_string()
    }
}
