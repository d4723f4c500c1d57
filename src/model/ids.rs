// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::str::FromStr;

use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

/// Identity of a saved diagram.
///
/// Ids are opaque strings assigned at save time (UUID v4 for locally generated ones). Files written
/// by other tools may carry any non-empty string, so only emptiness is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiagramId {
    value: String,
}

impl DiagramId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self { value })
    }

    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self {
            value: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for DiagramId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for DiagramId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for DiagramId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for DiagramId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiagramId> for String {
    fn from(id: DiagramId) -> Self {
        id.value
    }
}

impl JsonSchema for DiagramId {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("DiagramId")
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "minLength": 1
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    InvalidGroupId { value: String },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::InvalidGroupId { value } => {
                write!(f, "group id must be a positive integer (got {value:?})")
            }
        }
    }
}

impl std::error::Error for IdError {}

/// Identity of one grouped row. Assigned monotonically and never renumbered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct GroupId(u32);

impl GroupId {
    pub const FIRST: GroupId = GroupId(1);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .map(Self)
            .ok_or_else(|| IdError::InvalidGroupId {
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagramId, GroupId, IdError};

    #[test]
    fn diagram_id_rejects_empty_and_blank() {
        assert_eq!(DiagramId::new(""), Err(IdError::Empty));
        assert_eq!(DiagramId::new("   "), Err(IdError::Empty));
    }

    #[test]
    fn generated_diagram_ids_are_distinct_uuids() {
        let a = DiagramId::generate();
        let b = DiagramId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn diagram_id_deserialization_rejects_empty_string() {
        let result: Result<DiagramId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let id: DiagramId = serde_json::from_str("\"abc\"").expect("id");
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn group_id_parses_positive_integers_only() {
        assert_eq!("3".parse::<GroupId>(), Ok(GroupId::new(3)));
        assert!("0".parse::<GroupId>().is_err());
        assert!("x".parse::<GroupId>().is_err());
        assert_eq!(GroupId::new(u32::MAX).next(), GroupId::new(u32::MAX));
    }
}
