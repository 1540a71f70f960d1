//! Run configuration
//!
//! A [`PipelineConfig`] is read from TOML. Every section is optional and
//! defaults to the precinct table layout (`Precinct`, `VotePrec`, `_Precincts`).

use crate::error::{LoadError, LoadResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xref_core::{ConflictPolicy, KeyMappingResolver};

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Project and output locations
    pub workspace: WorkspaceConfig,
    /// Input tables, relative to the project directory
    pub inputs: InputConfig,
    /// Column names
    pub fields: FieldNames,
    /// Conflict handling
    pub resolution: ResolutionConfig,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`LoadError::Toml`] if the text is not a valid configuration.
    pub fn from_toml(text: &str, origin: impl Into<PathBuf>) -> LoadResult<Self> {
        toml::from_str(text).map_err(|source| LoadError::Toml {
            path: origin.into(),
            source,
        })
    }

    /// Load from a TOML file
    ///
    /// A relative `project_dir` is resolved against the file's directory.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io_error(path, e))?;
        let mut config = Self::from_toml(&text, path)?;

        if config.workspace.project_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.workspace.project_dir = base.join(&config.workspace.project_dir);
        }
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Resolver configured with the conflict policy
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> KeyMappingResolver {
        KeyMappingResolver::new().with_policy(self.resolution.conflict_policy)
    }
}

/// Project and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Root directory every other path is relative to
    pub project_dir: PathBuf,
    /// Directory results are written to, created if absent
    pub output_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            output_dir: PathBuf::from("out"),
        }
    }
}

/// Input table locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Member (regular precinct) table
    pub members: PathBuf,
    /// Cross-reference table
    pub cross_reference: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            members: PathBuf::from("Precincts/precincts.json"),
            cross_reference: PathBuf::from("Precincts/cross_reference.json"),
        }
    }
}

/// Default member key column
pub const DEFAULT_MEMBER_FIELD: &str = "Precinct";
/// Default group key column
pub const DEFAULT_GROUP_FIELD: &str = "VotePrec";
/// Default member list column
pub const DEFAULT_LIST_FIELD: &str = "_Precincts";

/// Column names of the member and cross-reference tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNames {
    /// Member key column, shared by the member table and the exploded table
    pub member_key: String,
    /// Group key column, shared by the cross-reference and output tables
    pub group_key: String,
    /// Whitespace separated member list column of the cross-reference
    pub member_list: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            member_key: DEFAULT_MEMBER_FIELD.to_string(),
            group_key: DEFAULT_GROUP_FIELD.to_string(),
            member_list: DEFAULT_LIST_FIELD.to_string(),
        }
    }
}

/// Conflict handling for members listed under two groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionConfig {
    /// Policy applied by the resolver
    pub conflict_policy: ConflictPolicy,
}
