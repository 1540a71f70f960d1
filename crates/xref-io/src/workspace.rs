//! Workspace context
//!
//! Resolved, checked locations for one run. Replaces process-wide path state:
//! the context is built once from a [`PipelineConfig`] and passed along.

use crate::config::PipelineConfig;
use crate::error::{LoadError, LoadResult};
use std::path::{Path, PathBuf};

/// Exploded member → group table
pub const EXPLODE_TABLE: &str = "xref_explode.json";
/// Member table with group keys populated
pub const GROUPED_MEMBERS_TABLE: &str = "members_grouped.json";
/// Dissolved output units
pub const OUTPUT_UNITS_TABLE: &str = "voting_precincts.json";
/// Run summary
pub const SUMMARY_FILE: &str = "summary.json";
/// Every file a run writes to the output directory
pub const OUTPUT_FILES: [&str; 4] = [EXPLODE_TABLE, GROUPED_MEMBERS_TABLE, OUTPUT_UNITS_TABLE, SUMMARY_FILE];

const STAGING_PREFIX: &str = ".partial-";

/// Checked locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    members: PathBuf,
    cross_reference: PathBuf,
    output_dir: PathBuf,
}

impl WorkspaceContext {
    /// Resolve and check every location in the configuration
    ///
    /// The project directory and both input tables must exist. The output
    /// directory is created if missing.
    ///
    /// # Errors
    /// Returns [`LoadError::Workspace`] for a missing location and
    /// [`LoadError::Io`] if the output directory cannot be created.
    pub fn setup(config: &PipelineConfig) -> LoadResult<Self> {
        let project_dir = config.workspace.project_dir.clone();
        if !project_dir.is_dir() {
            return Err(LoadError::Workspace(format!(
                "can't find the project directory {}",
                project_dir.display()
            )));
        }
        tracing::info!(path = %project_dir.display(), "project directory");

        let members = project_dir.join(&config.inputs.members);
        let cross_reference = project_dir.join(&config.inputs.cross_reference);
        for (label, path) in [("member table", &members), ("cross-reference table", &cross_reference)] {
            if !path.is_file() {
                return Err(LoadError::Workspace(format!(
                    "can't find input {label}: {}",
                    path.display()
                )));
            }
        }

        let output_dir = project_dir.join(&config.workspace.output_dir);
        std::fs::create_dir_all(&output_dir).map_err(|e| LoadError::io_error(&output_dir, e))?;
        tracing::info!(
            members = %members.display(),
            cross_reference = %cross_reference.display(),
            output = %output_dir.display(),
            "workspace ready"
        );

        Ok(Self {
            members,
            cross_reference,
            output_dir,
        })
    }

    /// Member table path
    #[inline]
    #[must_use]
    pub fn members_path(&self) -> &Path {
        &self.members
    }

    /// Cross-reference table path
    #[inline]
    #[must_use]
    pub fn cross_reference_path(&self) -> &Path {
        &self.cross_reference
    }

    /// Output directory
    #[inline]
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of a named output file
    #[inline]
    #[must_use]
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Path an output file is written to before it is moved into place
    ///
    /// Keeps the extension so the table format is unchanged.
    #[inline]
    #[must_use]
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{STAGING_PREFIX}{name}"))
    }

    /// Remove outputs left by an earlier run
    ///
    /// # Errors
    /// Returns [`LoadError::Io`] if an existing output cannot be removed.
    pub fn clear_outputs(&self) -> LoadResult<()> {
        for name in OUTPUT_FILES {
            let path = self.output_path(name);
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "stale output removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(LoadError::io_error(&path, e)),
            }
        }
        Ok(())
    }
}
