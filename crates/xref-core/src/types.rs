//! Core data model: keys, cross-reference rows and member entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a member entity (a regular precinct)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberKey(pub String);

/// Identifier of an aggregation group (a voting precinct)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub String);

impl MemberKey {
    /// Create new member key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl GroupKey {
    /// Create new group key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Self-group key: the member is its own group
    #[inline]
    #[must_use]
    pub fn from_member(member: &MemberKey) -> Self {
        Self(member.0.clone())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! key_conversions {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

key_conversions!(MemberKey);
key_conversions!(GroupKey);

/// One record of the raw cross-reference table
///
/// `member_keys_raw` is `None` when the member list field is null or absent,
/// which is malformed. `Some("")` is a group with zero members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReferenceRow {
    /// Group the listed members belong to
    pub group_key: GroupKey,
    /// Whitespace separated member keys, possibly repeated
    pub member_keys_raw: Option<String>,
}

impl CrossReferenceRow {
    /// Create row with a member list
    #[inline]
    #[must_use]
    pub fn new(group_key: impl Into<GroupKey>, member_keys_raw: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            member_keys_raw: Some(member_keys_raw.into()),
        }
    }

    /// Create row whose member list field is null
    #[inline]
    #[must_use]
    pub fn null_members(group_key: impl Into<GroupKey>) -> Self {
        Self {
            group_key: group_key.into(),
            member_keys_raw: None,
        }
    }
}

/// One unit of the member dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberEntity {
    /// Unique identifier within the member dataset
    pub member_key: MemberKey,
    /// Assigned aggregation group, `None` until joined or filled
    pub group_key: Option<GroupKey>,
    /// Remaining columns, carried through untouched
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl MemberEntity {
    /// Create unassigned member without attributes
    #[inline]
    #[must_use]
    pub fn new(member_key: impl Into<MemberKey>) -> Self {
        Self {
            member_key: member_key.into(),
            group_key: None,
            attributes: Map::new(),
        }
    }

    /// With an initial group assignment
    #[inline]
    #[must_use]
    pub fn with_group(mut self, group_key: impl Into<GroupKey>) -> Self {
        self.group_key = Some(group_key.into());
        self
    }

    /// With attribute columns
    #[inline]
    #[must_use]
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Check if member has a group assignment
    #[inline]
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.group_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_group_key_matches_member() {
        let member = MemberKey::from("P7");
        assert_eq!(GroupKey::from_member(&member).as_str(), "P7");
    }

    #[test]
    fn keys_serialize_transparently() {
        let json = serde_json::to_string(&GroupKey::from("V1")).unwrap();
        assert_eq!(json, "\"V1\"");
    }

    #[test]
    fn member_entity_builder() {
        let member = MemberEntity::new("P1").with_group("V1");
        assert!(member.is_assigned());
        assert_eq!(member.group_key, Some(GroupKey::from("V1")));
        assert!(member.attributes.is_empty());
    }

    #[test]
    fn null_member_row_differs_from_empty() {
        assert_ne!(
            CrossReferenceRow::null_members("V1"),
            CrossReferenceRow::new("V1", "")
        );
    }
}
