//! Default-assignment filler
//!
//! Members the cross-reference never mentioned become their own group. Without
//! this, every unmapped member would share a null group key and be dissolved
//! into a single unit.

use crate::types::{GroupKey, MemberEntity};

/// Outcome of a fill pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillReport {
    /// Records given a self-group key
    pub patched: usize,
    /// Records inspected
    pub total: usize,
}

/// Assign `group_key = member_key` to every member without a group
///
/// Idempotent: a second pass patches nothing.
pub fn fill_missing_groups(members: &mut [MemberEntity]) -> FillReport {
    let mut report = FillReport {
        patched: 0,
        total: members.len(),
    };

    for member in members.iter_mut().filter(|m| m.group_key.is_none()) {
        tracing::debug!(member = %member.member_key, "self-group fallback");
        member.group_key = Some(GroupKey::from_member(&member.member_key));
        report.patched += 1;
    }

    tracing::info!(patched = report.patched, total = report.total, "rows updated");
    report
}
