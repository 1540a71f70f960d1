//! Aggregation boundary
//!
//! [`Aggregator`] is the seam where a dissolve-by-key implementation plugs in.
//! Geometry merging lives outside this crate; [`KeyedDissolve`] performs the
//! attribute-level grouping so a run can be checked without it.

use crate::error::XrefError;
use crate::types::{GroupKey, MemberEntity, MemberKey};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One dissolved output unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputUnit {
    /// Shared group key of the merged members
    pub group_key: GroupKey,
    /// Members merged into this unit, in dataset order
    pub member_keys: Vec<MemberKey>,
}

impl OutputUnit {
    /// Number of merged members
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.member_keys.len()
    }

    /// Check if this unit is a self-group of a single member
    #[inline]
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        matches!(self.member_keys.as_slice(), [only] if only.as_str() == self.group_key.as_str())
    }
}

/// Merge members sharing a group key into output units
pub trait Aggregator {
    /// Aggregate members, one unit per distinct group key
    ///
    /// # Errors
    /// Returns [`XrefError::UnassignedMember`] if any member lacks a group key.
    fn aggregate(&self, members: &[MemberEntity]) -> Result<Vec<OutputUnit>, XrefError>;

    /// Aggregator name for logs
    fn name(&self) -> &'static str;
}

/// Attribute-level dissolve by group key
///
/// Units are ordered by the first appearance of their group key.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedDissolve;

impl KeyedDissolve {
    /// Create new keyed dissolve
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Aggregator for KeyedDissolve {
    fn aggregate(&self, members: &[MemberEntity]) -> Result<Vec<OutputUnit>, XrefError> {
        let mut units: IndexMap<&GroupKey, Vec<MemberKey>> = IndexMap::new();

        for (index, member) in members.iter().enumerate() {
            let group = member
                .group_key
                .as_ref()
                .ok_or_else(|| XrefError::UnassignedMember {
                    member_key: member.member_key.clone(),
                    index,
                })?;
            units.entry(group).or_default().push(member.member_key.clone());
        }

        let units: Vec<_> = units
            .into_iter()
            .map(|(group_key, member_keys)| OutputUnit {
                group_key: group_key.clone(),
                member_keys,
            })
            .collect();

        tracing::info!(records = units.len(), "records after dissolve");
        Ok(units)
    }

    fn name(&self) -> &'static str {
        "KeyedDissolve"
    }
}
