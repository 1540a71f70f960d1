//! Table and configuration I/O for precinct cross-reference runs
//!
//! Reads member and cross-reference tables (JSON or YAML), maps their columns
//! onto the [`xref_core`] data model and writes results back out.
//!
//! # Example
//!
//! ```rust,ignore
//! use xref_core::KeyedDissolve;
//! use xref_io::{PipelineConfig, WorkspaceContext, run_workspace};
//!
//! let config = PipelineConfig::load(Path::new("pipeline.toml"))?;
//! let ctx = WorkspaceContext::setup(&config)?;
//! let summary = run_workspace(&config, &ctx, &KeyedDissolve)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod error;
mod run;
mod table;
mod workspace;

// Re-exports
pub use config::{
    FieldNames, InputConfig, PipelineConfig, ResolutionConfig, WorkspaceConfig,
    DEFAULT_GROUP_FIELD, DEFAULT_LIST_FIELD, DEFAULT_MEMBER_FIELD,
};
pub use error::{LoadError, LoadResult};
pub use run::{run_workspace, RunError};
pub use table::{
    cross_reference_rows, explode_records, grouped_member_records, member_entities, read_records,
    unit_records, write_table, Record, TableFormat,
};
pub use workspace::{
    WorkspaceContext, EXPLODE_TABLE, GROUPED_MEMBERS_TABLE, OUTPUT_FILES, OUTPUT_UNITS_TABLE,
    SUMMARY_FILE,
};
