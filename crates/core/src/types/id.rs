//! Numeric Admin API resource IDs.
//!
//! Shopify's REST endpoints differ in how strictly they type IDs in request
//! bodies. Fulfillment order IDs inside a fulfillment payload must be JSON
//! numbers, while order IDs only appear in the URL path and may arrive from
//! callers as either numbers or digit strings. Both rules are expressed here
//! as separate constructors rather than one shared policy.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON type of a value, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// Classify a JSON value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Lowercase type name as it appears in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when reading a [`ResourceId`] from JSON.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceIdError {
    /// The value has a JSON type that is not accepted.
    #[error("must be a number (received {received})")]
    WrongType {
        /// JSON type that was received.
        received: JsonKind,
    },
    /// The value is a number or string but not a positive integer.
    #[error("must be a positive integer (received {received})")]
    NotPositiveInteger {
        /// JSON type that was received.
        received: JsonKind,
    },
}

/// A positive integer Admin API resource ID (order, fulfillment order, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Create a new ID from a u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Accept only a JSON integer.
    ///
    /// `123` is accepted; `"123"` is rejected with the received type.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceIdError::WrongType`] for non-numbers and
    /// [`ResourceIdError::NotPositiveInteger`] for zero, negative or
    /// fractional numbers.
    pub fn from_strict_json(value: &Value) -> Result<Self, ResourceIdError> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .filter(|id| *id > 0)
                .map(Self)
                .ok_or(ResourceIdError::NotPositiveInteger {
                    received: JsonKind::Number,
                }),
            other => Err(ResourceIdError::WrongType {
                received: JsonKind::of(other),
            }),
        }
    }

    /// Accept a JSON integer or a string of ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceIdError::WrongType`] for non-number, non-string
    /// values and [`ResourceIdError::NotPositiveInteger`] for strings that are
    /// not all digits or values that are not positive.
    pub fn from_lenient_json(value: &Value) -> Result<Self, ResourceIdError> {
        match value {
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ResourceIdError::NotPositiveInteger {
                        received: JsonKind::String,
                    });
                }
                s.parse::<u64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .map(Self)
                    .ok_or(ResourceIdError::NotPositiveInteger {
                        received: JsonKind::String,
                    })
            }
            Value::Number(_) => Self::from_strict_json(value),
            other => Err(ResourceIdError::WrongType {
                received: JsonKind::of(other),
            }),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ResourceId> for u64 {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_strict_accepts_integer() {
        let id = ResourceId::from_strict_json(&json!(123)).unwrap();
        assert_eq!(id.as_u64(), 123);
        assert_eq!(id.to_string(), "123");
    }

    #[test]
    fn test_strict_rejects_numeric_string() {
        let err = ResourceId::from_strict_json(&json!("123")).unwrap_err();
        assert_eq!(
            err,
            ResourceIdError::WrongType {
                received: JsonKind::String
            }
        );
        assert_eq!(err.to_string(), "must be a number (received string)");
    }

    #[test]
    fn test_strict_rejects_non_positive() {
        assert!(ResourceId::from_strict_json(&json!(0)).is_err());
        assert!(ResourceId::from_strict_json(&json!(-5)).is_err());
        assert!(ResourceId::from_strict_json(&json!(1.5)).is_err());
    }

    #[test]
    fn test_lenient_accepts_both() {
        assert_eq!(
            ResourceId::from_lenient_json(&json!(450_789_469)).unwrap(),
            ResourceId::new(450_789_469)
        );
        assert_eq!(
            ResourceId::from_lenient_json(&json!("450789469")).unwrap(),
            ResourceId::new(450_789_469)
        );
    }

    #[test]
    fn test_lenient_rejects_path_like_strings() {
        assert!(ResourceId::from_lenient_json(&json!("12/../34")).is_err());
        assert!(ResourceId::from_lenient_json(&json!("gid://shopify/Order/1")).is_err());
        assert!(ResourceId::from_lenient_json(&json!("")).is_err());
    }

    #[test]
    fn test_lenient_rejects_other_types() {
        let err = ResourceId::from_lenient_json(&json!(true)).unwrap_err();
        assert_eq!(
            err,
            ResourceIdError::WrongType {
                received: JsonKind::Boolean
            }
        );
        assert!(ResourceId::from_lenient_json(&Value::Null).is_err());
    }

    #[test]
    fn test_json_kind_names() {
        assert_eq!(JsonKind::of(&json!({})).as_str(), "object");
        assert_eq!(JsonKind::of(&json!([])).as_str(), "array");
        assert_eq!(JsonKind::of(&Value::Null).as_str(), "null");
    }
}
