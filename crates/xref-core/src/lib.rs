//! Precinct cross-reference resolution
//!
//! Resolves a many-to-many cross-reference table (voting precinct → list of
//! regular precincts) into a total member → group assignment that a
//! dissolve-by-key operation can consume.
//!
//! # Core Concepts
//!
//! - [`KeyMappingResolver`]: explodes raw rows into a [`ResolvedMapping`]
//! - [`join_group_keys`]: left join of the mapping onto the member dataset
//! - [`fill_missing_groups`]: self-group fallback for unmapped members
//! - [`Aggregator`]: seam for dissolve-by-key, with [`KeyedDissolve`] built in
//! - [`Pipeline`]: runs the stages in order and reports a [`PipelineSummary`]
//!
//! # Example
//!
//! ```
//! use xref_core::{CrossReferenceRow, KeyedDissolve, MemberEntity, Pipeline};
//!
//! let rows = vec![
//!     CrossReferenceRow::new("V1", "P1 P2"),
//!     CrossReferenceRow::new("V2", "P3"),
//! ];
//! let members = ["P1", "P2", "P3", "P4"].into_iter().map(MemberEntity::new).collect();
//!
//! let output = Pipeline::default().run(&rows, members, &KeyedDissolve).unwrap();
//! assert_eq!(output.summary.members_patched, 1);
//! assert_eq!(output.units.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod dissolve;
mod error;
mod fill;
mod join;
mod pipeline;
mod resolver;
mod types;

// Re-exports
pub use dissolve::{Aggregator, KeyedDissolve, OutputUnit};
pub use error::XrefError;
pub use fill::{fill_missing_groups, FillReport};
pub use join::{join_group_keys, validate_unique_members, JoinReport};
pub use pipeline::{Pipeline, PipelineOutput, PipelineSummary};
pub use resolver::{ConflictPolicy, KeyMappingResolver, MappingConflict, ResolvedMapping};
pub use types::{CrossReferenceRow, GroupKey, MemberEntity, MemberKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
