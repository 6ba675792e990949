//! Typed in-memory field values

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use uuid::Uuid;

/// A bound scalar value
///
/// "Unset" is represented as `Option::<Value>::None` by callers rather than a
/// null variant, so a `Value` always carries data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text
    String(String),
    /// Integer (both 32 and 64 bit columns)
    Integer(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without timezone
    DateTime(NaiveDateTime),
    /// UUID
    Uuid(Uuid),
    /// Arbitrary JSON
    Json(serde_json::Value),
}

impl Value {
    /// Borrow as text
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as integer
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Read as a number, widening integers
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Read as boolean
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// JSON view for the template layer
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Float(n) => serde_json::Value::from(*n),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Date(_) | Self::DateTime(_) | Self::Uuid(_) => {
                serde_json::Value::String(self.to_string())
            }
            Self::Json(value) => value.clone(),
        }
    }
}

/// Renders the value the way it is submitted back in a form
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Self::Uuid(id) => write!(f, "{id}"),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}
