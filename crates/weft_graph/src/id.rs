// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-scoped identifiers for nodes and output sockets.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const BASE62: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Separator between the node and socket parts of a [`LocalPropertyId`]
/// string. Socket keys must not contain it.
const PROPERTY_SEPARATOR: char = '/';

/// Unique identifier for a node within one graph.
///
/// Stored as a 128-bit value, written as base-62 text. The zero value is
/// reserved as the [`LocalId::NONE`] sentinel and is never produced by either
/// generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(u128);

impl LocalId {
    /// Reserved sentinel distinct from any generated id.
    pub const NONE: LocalId = LocalId(0);

    /// Create a new random 128-bit id for persisted, long-lived entities.
    pub fn new() -> Self {
        loop {
            let raw = Uuid::new_v4().as_u128();
            if raw != 0 {
                return Self(raw);
            }
        }
    }

    /// Create a short random id, legible in diagnostics (at most six
    /// base-62 digits).
    ///
    /// Collision probability is negligible for one graph's lifetime but not
    /// adversarially secure.
    pub fn new_short() -> Self {
        loop {
            let raw = Uuid::new_v4().as_u128() as u32;
            if raw != 0 {
                return Self(u128::from(raw));
            }
        }
    }

    /// Whether this is the reserved sentinel.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; 22];
        let mut pos = buf.len();
        let mut rest = self.0;
        loop {
            pos -= 1;
            buf[pos] = BASE62[(rest % 62) as usize];
            rest /= 62;
            if rest == 0 {
                break;
            }
        }
        // Slice of the alphabet, always valid UTF-8.
        f.write_str(std::str::from_utf8(&buf[pos..]).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for LocalId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError::Empty);
        }
        let mut value: u128 = 0;
        for c in s.bytes() {
            let digit = BASE62
                .iter()
                .position(|&b| b == c)
                .ok_or(ParseIdError::InvalidDigit(c as char))? as u128;
            value = value
                .checked_mul(62)
                .and_then(|v| v.checked_add(digit))
                .ok_or(ParseIdError::Overflow)?;
        }
        Ok(Self(value))
    }
}

impl Serialize for LocalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// Error parsing an identifier from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseIdError {
    /// Empty input
    #[error("identifier is empty")]
    Empty,

    /// A character outside the base-62 alphabet
    #[error("invalid identifier digit: {0:?}")]
    InvalidDigit(char),

    /// Value does not fit in 128 bits
    #[error("identifier value out of range")]
    Overflow,

    /// A property id without the node/socket separator
    #[error("property id missing '/' separator")]
    MissingSeparator,
}

/// Reference to one output socket on one node: `(node id, socket key)`.
///
/// Held by value inside input fields. It is a reference by identity, never an
/// owning relationship: removing the referenced node leaves the reference
/// dangling, which resolution detects rather than dereferencing blindly.
/// The [`LocalPropertyId::NONE`] sentinel means "not connected".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalPropertyId {
    /// The referenced node.
    pub node: LocalId,
    /// The referenced output socket's key on that node.
    pub socket: String,
}

impl LocalPropertyId {
    /// The "not connected" sentinel.
    pub const NONE: LocalPropertyId = LocalPropertyId {
        node: LocalId::NONE,
        socket: String::new(),
    };

    /// Create a reference to `socket` on `node`.
    pub fn new(node: LocalId, socket: impl Into<String>) -> Self {
        Self {
            node,
            socket: socket.into(),
        }
    }

    /// Whether this is the "not connected" sentinel.
    pub fn is_none(&self) -> bool {
        self.node.is_none()
    }
}

impl fmt::Display for LocalPropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else {
            write!(f, "{}{}{}", self.node, PROPERTY_SEPARATOR, self.socket)
        }
    }
}

impl FromStr for LocalPropertyId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "none" {
            return Ok(Self::NONE);
        }
        let (node, socket) = s
            .split_once(PROPERTY_SEPARATOR)
            .ok_or(ParseIdError::MissingSeparator)?;
        Ok(Self {
            node: node.parse()?,
            socket: socket.to_string(),
        })
    }
}

impl Serialize for LocalPropertyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalPropertyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trips_through_text() {
        let id = LocalId::new();
        let parsed: LocalId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        let short = LocalId::new_short();
        assert!(short.to_string().len() <= 6);
        let parsed: LocalId = short.to_string().parse().unwrap();
        assert_eq!(parsed, short);
    }

    #[test]
    fn test_generated_ids_are_never_the_sentinel() {
        for _ in 0..64 {
            assert!(!LocalId::new().is_none());
            assert!(!LocalId::new_short().is_none());
        }
    }

    #[test]
    fn test_id_parse_rejects_garbage() {
        assert_eq!("".parse::<LocalId>(), Err(ParseIdError::Empty));
        assert_eq!(
            "ab-cd".parse::<LocalId>(),
            Err(ParseIdError::InvalidDigit('-'))
        );
        assert!("zzzzzzzzzzzzzzzzzzzzzzzzzz".parse::<LocalId>().is_err());
    }

    #[test]
    fn test_property_id_equality_is_structural() {
        let node = LocalId::new_short();
        let a = LocalPropertyId::new(node, "result");
        let b = LocalPropertyId::new(node, "result");
        let c = LocalPropertyId::new(node, "other");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_property_id_none_sentinel() {
        assert!(LocalPropertyId::NONE.is_none());
        assert_eq!(LocalPropertyId::NONE.to_string(), "none");
        assert_eq!("none".parse::<LocalPropertyId>().unwrap(), LocalPropertyId::NONE);
        assert!(!LocalPropertyId::new(LocalId::new(), "x").is_none());
    }

    #[test]
    fn test_property_id_round_trips_through_text() {
        let id = LocalPropertyId::new(LocalId::new_short(), "result");
        let parsed: LocalPropertyId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_property_id_serde_is_a_string() {
        let id = LocalPropertyId::new(LocalId::new_short(), "out");
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with('"'));
        let back: LocalPropertyId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let none: LocalPropertyId = serde_json::from_str("\"none\"").unwrap();
        assert!(none.is_none());
    }
}
