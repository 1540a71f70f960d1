//! Key mapping resolver
//!
//! Turns the many-to-many cross-reference table into a member → group function.
//!
//! # Tie-break
//!
//! A member listed by more than one row is resolved by [`ConflictPolicy`].
//! The default, [`ConflictPolicy::LastWriteWins`], keeps the assignment of the
//! last row in input order. Repeats within a single row are collapsed first and
//! never count as conflicts.

use crate::error::XrefError;
use crate::types::{CrossReferenceRow, GroupKey, MemberKey};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Policy for a member listed under two different groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Later row replaces the earlier assignment (default)
    #[default]
    LastWriteWins,

    /// Earlier row keeps its assignment
    FirstWriteWins,

    /// Fail resolution on the first conflict
    Reject,
}

impl ConflictPolicy {
    /// Policy name as used in configuration
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LastWriteWins => "last_write_wins",
            Self::FirstWriteWins => "first_write_wins",
            Self::Reject => "reject",
        }
    }
}

impl std::str::FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_write_wins" | "last" => Ok(Self::LastWriteWins),
            "first_write_wins" | "first" => Ok(Self::FirstWriteWins),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown conflict policy: {other}")),
        }
    }
}

/// Member assigned to two groups across rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConflict {
    /// Member listed twice
    pub member_key: MemberKey,
    /// Group the mapping ended up with
    pub kept: GroupKey,
    /// Group that lost
    pub discarded: GroupKey,
    /// Row that produced the conflict
    pub row_index: usize,
}

/// Resolved member → group mapping
///
/// Keys are unique by construction. Iteration follows the order in which
/// members were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMapping {
    entries: IndexMap<MemberKey, GroupKey>,
    conflicts: Vec<MappingConflict>,
}

impl ResolvedMapping {
    /// Create empty mapping
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group assigned to a member
    #[inline]
    #[must_use]
    pub fn get(&self, member: &MemberKey) -> Option<&GroupKey> {
        self.entries.get(member)
    }

    /// Check if member is mapped
    #[inline]
    #[must_use]
    pub fn contains(&self, member: &MemberKey) -> bool {
        self.entries.contains_key(member)
    }

    /// Number of mapped members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if mapping is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct groups referenced
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.entries.values().collect::<IndexSet<_>>().len()
    }

    /// Conflicts seen while resolving
    #[inline]
    #[must_use]
    pub fn conflicts(&self) -> &[MappingConflict] {
        &self.conflicts
    }

    /// Iterate over (member, group) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&MemberKey, &GroupKey)> {
        self.entries.iter()
    }

    /// Exploded one-to-one table, one row per member
    #[must_use]
    pub fn to_rows(&self) -> Vec<(MemberKey, GroupKey)> {
        self.entries
            .iter()
            .map(|(m, g)| (m.clone(), g.clone()))
            .collect()
    }
}

/// Resolver from raw cross-reference rows to [`ResolvedMapping`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMappingResolver {
    policy: ConflictPolicy,
}

impl KeyMappingResolver {
    /// Create resolver with the default last-write-wins policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set conflict policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active conflict policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Resolve rows in input order
    ///
    /// # Errors
    /// Returns [`XrefError::MalformedRow`] for a blank group key or a null
    /// member list, and [`XrefError::ConflictingAssignment`] under
    /// [`ConflictPolicy::Reject`]. No partial mapping is returned.
    pub fn resolve(&self, rows: &[CrossReferenceRow]) -> Result<ResolvedMapping, XrefError> {
        let mut mapping = ResolvedMapping::new();

        for (row_index, row) in rows.iter().enumerate() {
            if row.group_key.as_str().trim().is_empty() {
                return Err(XrefError::malformed_row(row_index, "group key is blank"));
            }
            let raw = row
                .member_keys_raw
                .as_deref()
                .ok_or_else(|| XrefError::malformed_row(row_index, "member list is null"))?;

            let members: IndexSet<&str> = raw.split_whitespace().collect();
            tracing::debug!(
                row = row_index,
                group = %row.group_key,
                members = members.len(),
                "exploding cross-reference row"
            );

            for member in members {
                self.assign(&mut mapping, MemberKey::from(member), &row.group_key, row_index)?;
            }
        }

        tracing::info!(
            mapped = mapping.len(),
            groups = mapping.group_count(),
            conflicts = mapping.conflicts.len(),
            "members have a group assigned"
        );
        Ok(mapping)
    }

    fn assign(
        &self,
        mapping: &mut ResolvedMapping,
        member: MemberKey,
        group: &GroupKey,
        row_index: usize,
    ) -> Result<(), XrefError> {
        let Some(existing) = mapping.entries.get_mut(&member) else {
            mapping.entries.insert(member, group.clone());
            return Ok(());
        };
        if existing == group {
            return Ok(());
        }

        let conflict = match self.policy {
            ConflictPolicy::Reject => {
                return Err(XrefError::ConflictingAssignment {
                    member_key: member,
                    existing: existing.clone(),
                    conflicting: group.clone(),
                    row_index,
                    processed: row_index,
                });
            }
            ConflictPolicy::LastWriteWins => MappingConflict {
                member_key: member,
                kept: group.clone(),
                discarded: std::mem::replace(existing, group.clone()),
                row_index,
            },
            ConflictPolicy::FirstWriteWins => MappingConflict {
                member_key: member,
                kept: existing.clone(),
                discarded: group.clone(),
                row_index,
            },
        };

        tracing::warn!(
            member = %conflict.member_key,
            kept = %conflict.kept,
            discarded = %conflict.discarded,
            row = row_index,
            policy = self.policy.name(),
            "member listed under more than one group"
        );
        mapping.conflicts.push(conflict);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(&str, &str)]) -> Vec<CrossReferenceRow> {
        pairs
            .iter()
            .map(|(g, m)| CrossReferenceRow::new(*g, *m))
            .collect()
    }

    fn group_of(mapping: &ResolvedMapping, member: &str) -> Option<String> {
        mapping
            .get(&MemberKey::from(member))
            .map(|g| g.as_str().to_string())
    }

    #[test]
    fn resolves_each_listed_member() {
        let mapping = KeyMappingResolver::new()
            .resolve(&rows(&[("V1", "P1 P2"), ("V2", "P3")]))
            .unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.group_count(), 2);
        assert_eq!(group_of(&mapping, "P1").as_deref(), Some("V1"));
        assert_eq!(group_of(&mapping, "P2").as_deref(), Some("V1"));
        assert_eq!(group_of(&mapping, "P3").as_deref(), Some("V2"));
        assert!(mapping.conflicts().is_empty());
    }

    #[test]
    fn collapses_repeats_within_row() {
        let mapping = KeyMappingResolver::new()
            .resolve(&rows(&[("V1", "P1 P1 P2")]))
            .unwrap();

        assert_eq!(mapping.len(), 2);
        assert!(mapping.conflicts().is_empty());
    }

    #[test]
    fn splits_on_any_whitespace() {
        let mapping = KeyMappingResolver::new()
            .resolve(&rows(&[("V1", "  P1\tP2\n P3  ")]))
            .unwrap();

        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn last_write_wins_by_default() {
        let mapping = KeyMappingResolver::new()
            .resolve(&rows(&[("V1", "P1"), ("V2", "P1")]))
            .unwrap();

        assert_eq!(group_of(&mapping, "P1").as_deref(), Some("V2"));
        assert_eq!(mapping.conflicts().len(), 1);
        let conflict = &mapping.conflicts()[0];
        assert_eq!(conflict.kept, GroupKey::from("V2"));
        assert_eq!(conflict.discarded, GroupKey::from("V1"));
        assert_eq!(conflict.row_index, 1);
    }

    #[test]
    fn first_write_wins_keeps_earlier_group() {
        let mapping = KeyMappingResolver::new()
            .with_policy(ConflictPolicy::FirstWriteWins)
            .resolve(&rows(&[("V1", "P1"), ("V2", "P1")]))
            .unwrap();

        assert_eq!(group_of(&mapping, "P1").as_deref(), Some("V1"));
        assert_eq!(mapping.conflicts().len(), 1);
    }

    #[test]
    fn reject_policy_fails_on_conflict() {
        let err = KeyMappingResolver::new()
            .with_policy(ConflictPolicy::Reject)
            .resolve(&rows(&[("V1", "P1"), ("V2", "P2"), ("V3", "P1")]))
            .unwrap_err();

        match err {
            XrefError::ConflictingAssignment {
                member_key,
                existing,
                conflicting,
                row_index,
                processed,
            } => {
                assert_eq!(member_key, MemberKey::from("P1"));
                assert_eq!(existing, GroupKey::from("V1"));
                assert_eq!(conflicting, GroupKey::from("V3"));
                assert_eq!(row_index, 2);
                assert_eq!(processed, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn same_group_twice_is_not_a_conflict() {
        let mapping = KeyMappingResolver::new()
            .with_policy(ConflictPolicy::Reject)
            .resolve(&rows(&[("V1", "P1"), ("V1", "P1 P2")]))
            .unwrap();

        assert_eq!(mapping.len(), 2);
        assert!(mapping.conflicts().is_empty());
    }

    #[test]
    fn empty_member_list_contributes_nothing() {
        let mapping = KeyMappingResolver::new()
            .resolve(&rows(&[("V1", "")]))
            .unwrap();

        assert!(mapping.is_empty());
    }

    #[test]
    fn null_member_list_is_malformed() {
        let input = vec![
            CrossReferenceRow::new("V1", "P1"),
            CrossReferenceRow::null_members("V2"),
        ];
        let err = KeyMappingResolver::new().resolve(&input).unwrap_err();

        assert!(matches!(
            err,
            XrefError::MalformedRow {
                row_index: 1,
                processed: 1,
                ..
            }
        ));
    }

    #[test]
    fn blank_group_key_is_malformed() {
        let err = KeyMappingResolver::new()
            .resolve(&rows(&[("  ", "P1")]))
            .unwrap_err();

        assert!(matches!(err, XrefError::MalformedRow { row_index: 0, .. }));
    }

    #[test]
    fn rows_keep_first_seen_order() {
        let mapping = KeyMappingResolver::new()
            .resolve(&rows(&[("V1", "P2 P1"), ("V2", "P3 P2")]))
            .unwrap();

        let members: Vec<_> = mapping
            .to_rows()
            .into_iter()
            .map(|(m, g)| format!("{m}:{g}"))
            .collect();
        assert_eq!(members, vec!["P2:V2", "P1:V1", "P3:V2"]);
    }

    #[test]
    fn policy_parses_from_config_names() {
        assert_eq!(
            "last_write_wins".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::LastWriteWins
        );
        assert_eq!("first".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::FirstWriteWins);
        assert!("newest".parse::<ConflictPolicy>().is_err());
    }
}
