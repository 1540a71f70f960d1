//! Grouping key join
//!
//! Left join of the resolved mapping onto the member dataset on the member key.
//! Cardinality is preserved exactly; the dataset is validated for unique keys
//! before anything is written.

use crate::error::XrefError;
use crate::resolver::ResolvedMapping;
use crate::types::{MemberEntity, MemberKey};
use std::collections::HashMap;

/// Outcome of a join pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinReport {
    /// Members found in the mapping
    pub matched: usize,
    /// Members left without a group key
    pub unmatched: usize,
}

impl JoinReport {
    /// Total members joined
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.matched + self.unmatched
    }
}

/// Check the member dataset has unique keys
///
/// # Errors
/// Returns [`XrefError::DuplicateMemberKey`] on the first repeated key.
pub fn validate_unique_members(members: &[MemberEntity]) -> Result<(), XrefError> {
    let mut seen: HashMap<&MemberKey, usize> = HashMap::with_capacity(members.len());

    for (index, member) in members.iter().enumerate() {
        if let Some(&first_index) = seen.get(&member.member_key) {
            return Err(XrefError::DuplicateMemberKey {
                member_key: member.member_key.clone(),
                first_index,
                duplicate_index: index,
                processed: index,
            });
        }
        seen.insert(&member.member_key, index);
    }

    Ok(())
}

/// Attach resolved group keys to members
///
/// Members absent from the mapping end with `group_key == None`, including
/// any that carried a stale assignment in.
///
/// # Errors
/// Returns [`XrefError::DuplicateMemberKey`] without touching any record.
pub fn join_group_keys(
    members: &mut [MemberEntity],
    mapping: &ResolvedMapping,
) -> Result<JoinReport, XrefError> {
    validate_unique_members(members)?;

    let mut report = JoinReport::default();
    for member in members.iter_mut() {
        member.group_key = mapping.get(&member.member_key).cloned();
        if member.group_key.is_some() {
            report.matched += 1;
        } else {
            report.unmatched += 1;
        }
    }

    tracing::info!(
        records = report.total(),
        matched = report.matched,
        unmatched = report.unmatched,
        "records after join"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::KeyMappingResolver;
    use crate::types::{CrossReferenceRow, GroupKey};

    fn mapping(pairs: &[(&str, &str)]) -> ResolvedMapping {
        let rows: Vec<_> = pairs
            .iter()
            .map(|(g, m)| CrossReferenceRow::new(*g, *m))
            .collect();
        KeyMappingResolver::new().resolve(&rows).unwrap()
    }

    #[test]
    fn left_join_preserves_cardinality() {
        let mut members: Vec<_> = ["P1", "P2", "P3", "P4"]
            .into_iter()
            .map(MemberEntity::new)
            .collect();

        let report =
            join_group_keys(&mut members, &mapping(&[("V1", "P1 P2"), ("V2", "P3")])).unwrap();

        assert_eq!(members.len(), 4);
        assert_eq!(report, JoinReport { matched: 3, unmatched: 1 });
        assert_eq!(members[0].group_key, Some(GroupKey::from("V1")));
        assert_eq!(members[2].group_key, Some(GroupKey::from("V2")));
        assert_eq!(members[3].group_key, None);
    }

    #[test]
    fn mapping_entries_without_members_are_ignored() {
        let mut members = vec![MemberEntity::new("P1")];
        let report = join_group_keys(&mut members, &mapping(&[("V1", "P1 P8 P9")])).unwrap();

        assert_eq!(report.total(), 1);
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn stale_assignment_is_replaced() {
        let mut members = vec![
            MemberEntity::new("P1").with_group("OLD"),
            MemberEntity::new("P2").with_group("OLD"),
        ];
        join_group_keys(&mut members, &mapping(&[("V1", "P1")])).unwrap();

        assert_eq!(members[0].group_key, Some(GroupKey::from("V1")));
        assert_eq!(members[1].group_key, None);
    }

    #[test]
    fn duplicate_key_fails_before_mutation() {
        let mut members = vec![
            MemberEntity::new("P1"),
            MemberEntity::new("P2"),
            MemberEntity::new("P1"),
        ];
        let before = members.clone();

        let err = join_group_keys(&mut members, &mapping(&[("V1", "P1 P2")])).unwrap_err();

        assert_eq!(
            err,
            XrefError::DuplicateMemberKey {
                member_key: MemberKey::from("P1"),
                first_index: 0,
                duplicate_index: 2,
                processed: 2,
            }
        );
        assert_eq!(members, before);
    }

    #[test]
    fn empty_dataset_is_valid() {
        assert!(validate_unique_members(&[]).is_ok());
    }
}
