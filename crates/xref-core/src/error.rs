//! Error types for cross-reference resolution
//!
//! Every failure is detected before the member dataset is mutated:
//! - Malformed cross-reference rows abort resolution
//! - Duplicate member keys abort the join
//! - Unassigned members abort aggregation

use crate::types::{GroupKey, MemberKey};

/// Main error type for resolution, join and aggregation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XrefError {
    /// Cross-reference row cannot be parsed into a group key and member list
    #[error("malformed cross-reference row {row_index}: {reason} ({processed} rows processed)")]
    MalformedRow {
        /// Zero-based position in the input sequence
        row_index: usize,
        /// What was wrong with the row
        reason: String,
        /// Rows fully processed before the failure
        processed: usize,
    },

    /// Member dataset repeats a key, making the join ambiguous
    #[error(
        "duplicate member key '{member_key}' at records {first_index} and {duplicate_index} ({processed} records checked)"
    )]
    DuplicateMemberKey {
        /// Repeated key
        member_key: MemberKey,
        /// First record carrying the key
        first_index: usize,
        /// Record that repeated it
        duplicate_index: usize,
        /// Records checked before the failure
        processed: usize,
    },

    /// Member referenced by two groups while the reject policy is active
    #[error(
        "member '{member_key}' assigned to '{existing}' and '{conflicting}' (row {row_index}, {processed} rows processed)"
    )]
    ConflictingAssignment {
        /// Member referenced twice
        member_key: MemberKey,
        /// Assignment already recorded
        existing: GroupKey,
        /// Assignment from the later row
        conflicting: GroupKey,
        /// Row carrying the conflicting assignment
        row_index: usize,
        /// Rows fully processed before the failure
        processed: usize,
    },

    /// Member reached aggregation without a group key
    #[error("member '{member_key}' has no group key at record {index}")]
    UnassignedMember {
        /// Member without assignment
        member_key: MemberKey,
        /// Record position
        index: usize,
    },
}

impl XrefError {
    /// Create malformed row error
    #[inline]
    pub fn malformed_row(row_index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            row_index,
            reason: reason.into(),
            processed: row_index,
        }
    }

    /// Check if error is caused by bad input data rather than misuse of the API
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::UnassignedMember { .. })
    }

    /// Number of records processed before the failure
    #[inline]
    #[must_use]
    pub fn records_processed(&self) -> usize {
        match self {
            Self::MalformedRow { processed, .. }
            | Self::DuplicateMemberKey { processed, .. }
            | Self::ConflictingAssignment { processed, .. } => *processed,
            Self::UnassignedMember { index, .. } => *index,
        }
    }
}
