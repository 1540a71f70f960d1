//! Resolve → join → fill → aggregate
//!
//! Stages run strictly in sequence on an owned copy of the member dataset.
//! All validation happens before the first write, so a failed run leaves the
//! caller's data untouched and yields no partial output.

use crate::dissolve::{Aggregator, OutputUnit};
use crate::error::XrefError;
use crate::fill::fill_missing_groups;
use crate::join::{join_group_keys, validate_unique_members};
use crate::resolver::{KeyMappingResolver, ResolvedMapping};
use crate::types::{CrossReferenceRow, MemberEntity};
use serde::{Deserialize, Serialize};

/// Diagnostic counts for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Cross-reference rows read
    pub rows_read: usize,
    /// Member → group entries resolved
    pub mappings_resolved: usize,
    /// Members listed under more than one group
    pub conflicts: usize,
    /// Members in the dataset
    pub members_total: usize,
    /// Members that received a group from the mapping
    pub members_joined: usize,
    /// Members given a self-group by the fallback
    pub members_patched: usize,
    /// Members with a group key after the fill
    pub members_grouped: usize,
    /// Units produced by aggregation
    pub output_units: usize,
}

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Resolved member → group mapping
    pub mapping: ResolvedMapping,
    /// Member dataset with every group key populated
    pub members: Vec<MemberEntity>,
    /// Aggregated units
    pub units: Vec<OutputUnit>,
    /// Run counts
    pub summary: PipelineSummary,
}

/// Cross-reference pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    resolver: KeyMappingResolver,
}

impl Pipeline {
    /// Create pipeline around a resolver
    #[inline]
    #[must_use]
    pub fn new(resolver: KeyMappingResolver) -> Self {
        Self { resolver }
    }

    /// Run resolution, join and fill without aggregating
    ///
    /// # Errors
    /// Returns the first [`XrefError`] from resolution or validation.
    pub fn assign(
        &self,
        rows: &[CrossReferenceRow],
        mut members: Vec<MemberEntity>,
    ) -> Result<(ResolvedMapping, Vec<MemberEntity>, PipelineSummary), XrefError> {
        tracing::info!(
            rows = rows.len(),
            members = members.len(),
            policy = self.resolver.policy().name(),
            "starting cross-reference resolution"
        );

        let mapping = self.resolver.resolve(rows)?;
        validate_unique_members(&members)?;

        let joined = join_group_keys(&mut members, &mapping)?;
        let filled = fill_missing_groups(&mut members);

        let summary = PipelineSummary {
            rows_read: rows.len(),
            mappings_resolved: mapping.len(),
            conflicts: mapping.conflicts().len(),
            members_total: members.len(),
            members_joined: joined.matched,
            members_patched: filled.patched,
            members_grouped: members.iter().filter(|m| m.is_assigned()).count(),
            output_units: 0,
        };
        tracing::info!(
            grouped = summary.members_grouped,
            "members with a group assigned after update"
        );

        Ok((mapping, members, summary))
    }

    /// Run the full pipeline
    ///
    /// # Errors
    /// Returns the first [`XrefError`] raised by any stage.
    pub fn run(
        &self,
        rows: &[CrossReferenceRow],
        members: Vec<MemberEntity>,
        aggregator: &dyn Aggregator,
    ) -> Result<PipelineOutput, XrefError> {
        let (mapping, members, mut summary) = self.assign(rows, members)?;

        let units = aggregator.aggregate(&members)?;
        summary.output_units = units.len();
        tracing::info!(
            aggregator = aggregator.name(),
            units = units.len(),
            singletons = units.iter().filter(|u| u.is_singleton()).count(),
            "output units created"
        );

        Ok(PipelineOutput {
            mapping,
            members,
            units,
            summary,
        })
    }
}
