//! Common types and deserialization helpers shared across models.
//!
//! The backends are not consistent about number encodings: identifiers and
//! quantities arrive as JSON numbers from some endpoints and as numeric
//! strings from others (decimal columns in particular).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a backend record.
///
/// Kept as text so form values round-trip unchanged; numeric identifiers are
/// sent back to the backends as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `None` for blank form values (an unselected `<select>`).
    pub fn from_form(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => EntityId(n.to_string()),
            RawId::Str(s) => EntityId(s),
        })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // only text that survives the i64 round trip goes out as a number
        match self.0.parse::<i64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_i64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

/// Name of a joined record (`"categories": {"name": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinedName {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Float(f64),
    Str(String),
    Null,
}

/// Accept `12.5`, `"12.50"` or `null` (as zero).
pub fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Float(n) => Ok(n),
        RawNumber::Str(s) if s.trim().is_empty() => Ok(0.0),
        RawNumber::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {s}"))),
        RawNumber::Null => Ok(0.0),
    }
}

/// Accept `7`, `"7"`, `7.0` or `null` (as zero).
pub fn flexible_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = flexible_f64(deserializer)?;
    if value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!("expected an integer, got {value}")));
    }
    Ok(value as i64)
}

/// Format a money amount with two decimals.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}
