//! Declared parameter types and per-request coerced values.
//!
//! The contract declares a [`ParamType`] for every path parameter. At dispatch
//! time the raw path segments bound by the router are coerced into
//! [`ParamValue`]s, collected in [`PathArgs`] and handed to the handler.

use serde::{Deserialize, Serialize};

use crate::error::CoercionError;

/// The declared type of a path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// A non-empty string segment.
    String,
    /// A signed 64-bit integer.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A 64-bit float.
    Number,
}

impl ParamType {
    /// Coerces a raw path segment to this type.
    ///
    /// String coercion rejects the empty segment: a path like `/hello/`
    /// binds `""` to the parameter, and an empty value is a type mismatch,
    /// not a valid argument.
    pub fn coerce(self, name: &str, raw: &str) -> Result<ParamValue, CoercionError> {
        let mismatch = || CoercionError {
            name: name.to_string(),
            value: raw.to_string(),
            expected: self,
        };

        match self {
            Self::String => {
                if raw.is_empty() {
                    Err(mismatch())
                } else {
                    Ok(ParamValue::String(raw.to_string()))
                }
            }
            Self::Integer => raw.parse::<i64>().map(ParamValue::Integer).map_err(|_| mismatch()),
            Self::Boolean => match raw {
                "true" => Ok(ParamValue::Boolean(true)),
                "false" => Ok(ParamValue::Boolean(false)),
                _ => Err(mismatch()),
            },
            Self::Number => raw.parse::<f64>().map(ParamValue::Number).map_err(|_| mismatch()),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Number => "number",
        };
        f.write_str(name)
    }
}

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value.
    Boolean(bool),
    /// A float value.
    Number(f64),
}

impl ParamValue {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the float value, if this is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// The coerced path arguments for a single dispatch.
///
/// Created by the dispatcher per request; scoped to that request's lifetime.
///
/// # Example
///
/// ```
/// use portico_core::{ParamValue, PathArgs};
///
/// let mut args = PathArgs::new();
/// args.insert("user", ParamValue::String("world".to_string()));
///
/// assert_eq!(args.str("user"), Some("world"));
/// assert_eq!(args.str("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathArgs {
    inner: Vec<(String, ParamValue)>,
}

impl PathArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named argument.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.inner.push((name.into(), value));
    }

    /// Returns the value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.inner.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Shorthand for a string-typed argument.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over the (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }
}
