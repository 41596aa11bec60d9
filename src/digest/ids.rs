//! Identifier types for remote resources.
//!
//! Conversation and user identifiers travel as strings but must be
//! numeric-shaped before they can be placed in a request path.
//! [`NumericId`] carries that guarantee so it is checked once, at the
//! boundary, instead of ad hoc in every fetcher.

use core::fmt;
use core::str::FromStr;

use super::error::{DigestError, DigestResult};

/// An identifier guaranteed to be representable as a finite number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericId(String);

impl NumericId {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the value is blank or not a finite number.
    pub fn parse(raw: &str) -> DigestResult<Self> {
        let trimmed = raw.trim();
        let finite = !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite);
        if finite {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DigestError::InvalidArgument(format!(
                "identifier must be numeric, got {raw:?}"
            )))
        }
    }

    /// Borrow the identifier text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NumericId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NumericId {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Serde adapter for wire ids that may arrive as JSON strings or numbers.
pub mod wire_id {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Deserialize a string or number into its string form.
    ///
    /// # Errors
    /// Returns an error for any other JSON type.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number id, got {other}"
            ))),
        }
    }
}
