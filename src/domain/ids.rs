//! Domain identifier types with validation
//!
//! CPQ identifiers are opaque strings (GUIDs for most records, numbers for
//! some settings). The newtype guarantees the value is non-empty before it is
//! spliced into a request path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a CPQ record (quote, quote item, customer, term, tab, user)
///
/// Accepts either a JSON string or a JSON number when deserialized, since
/// callers frequently pass numeric user IDs.
///
/// # Examples
///
/// ```
/// use cpq_bridge::domain::ids::RecordId;
/// use std::str::FromStr;
///
/// let id = RecordId::from_str("4a1c7f30-2d8e-4c0b-9a51-0f6e2b7d9c11").unwrap();
/// assert_eq!(id.as_str(), "4a1c7f30-2d8e-4c0b-9a51-0f6e2b7d9c11");
/// assert!(RecordId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawId", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new RecordId, trimming surrounding whitespace
    ///
    /// # Returns
    ///
    /// Returns `Err` if the identifier is empty after trimming
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Record ID cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl TryFrom<RawId> for RecordId {
    type Error = String;

    fn try_from(raw: RawId) -> Result<Self, Self::Error> {
        match raw {
            RawId::Text(text) => RecordId::new(text),
            RawId::Number(number) => RecordId::new(number.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_trims_whitespace() {
        let id = RecordId::new("  abc-123 ").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_record_id_rejects_empty() {
        assert!(RecordId::new("").is_err());
        assert!(RecordId::from_str("\t").is_err());
    }

    #[test]
    fn test_record_id_deserializes_from_string_and_number() {
        let from_text: RecordId = serde_json::from_str(r#""q-1""#).unwrap();
        assert_eq!(from_text.as_str(), "q-1");

        let from_number: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(from_number.as_str(), "42");
    }

    #[test]
    fn test_record_id_deserialize_rejects_blank() {
        let result = serde_json::from_str::<RecordId>(r#""  ""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_id_serializes_as_plain_string() {
        let id = RecordId::new("q-9").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""q-9""#);
    }
}
