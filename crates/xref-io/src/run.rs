//! End-to-end run over a workspace: load, resolve, write

use crate::config::PipelineConfig;
use crate::error::LoadError;
use crate::table::{
    cross_reference_rows, explode_records, grouped_member_records, member_entities, read_records,
    unit_records, write_table,
};
use crate::workspace::{
    WorkspaceContext, EXPLODE_TABLE, GROUPED_MEMBERS_TABLE, OUTPUT_UNITS_TABLE, SUMMARY_FILE,
};
use serde::Serialize;
use xref_core::{Aggregator, Pipeline, PipelineSummary, XrefError};

/// Failure of a workspace run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Reading or writing failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Input data violated a pipeline invariant
    #[error(transparent)]
    Xref(#[from] XrefError),
}

impl RunError {
    /// Check if the failure is caused by the content of the input tables
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Xref(e) => e.is_input_error(),
            Self::Load(e) => e.is_input_error(),
        }
    }
}

/// Output files written under staging names, moved into place on commit
///
/// Staged files that were never committed are removed on drop.
struct StagedOutputs<'a> {
    ctx: &'a WorkspaceContext,
    staged: Vec<&'static str>,
}

impl<'a> StagedOutputs<'a> {
    fn new(ctx: &'a WorkspaceContext) -> Self {
        Self {
            ctx,
            staged: Vec::new(),
        }
    }

    fn write<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        content: &T,
    ) -> Result<(), LoadError> {
        self.staged.push(name);
        write_table(&self.ctx.staging_path(name), content)
    }

    fn commit(mut self) -> Result<(), LoadError> {
        while let Some(&name) = self.staged.first() {
            let to = self.ctx.output_path(name);
            std::fs::rename(self.ctx.staging_path(name), &to).map_err(|e| LoadError::io_error(&to, e))?;
            self.staged.remove(0);
        }
        Ok(())
    }
}

impl Drop for StagedOutputs<'_> {
    fn drop(&mut self) {
        for name in self.staged.drain(..) {
            let path = self.ctx.staging_path(name);
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "staged output not removed");
                }
            }
        }
    }
}

/// Run the pipeline over the workspace tables and write every output
///
/// Outputs of an earlier run are removed first. New outputs are staged and
/// only moved into place once all of them have been written, so a failed run
/// leaves the output directory without results.
///
/// # Errors
/// Returns [`RunError`] from the first failing load, stage or write.
pub fn run_workspace(
    config: &PipelineConfig,
    ctx: &WorkspaceContext,
    aggregator: &dyn Aggregator,
) -> Result<PipelineSummary, RunError> {
    let fields = &config.fields;
    ctx.clear_outputs()?;

    let members = member_entities(&read_records(ctx.members_path())?, fields)?;
    let rows = cross_reference_rows(&read_records(ctx.cross_reference_path())?, fields)?;

    let output = Pipeline::new(config.resolver()).run(&rows, members, aggregator)?;

    let mut staged = StagedOutputs::new(ctx);
    staged.write(EXPLODE_TABLE, &explode_records(&output.mapping, fields))?;
    staged.write(
        GROUPED_MEMBERS_TABLE,
        &grouped_member_records(&output.members, fields),
    )?;
    staged.write(OUTPUT_UNITS_TABLE, &unit_records(&output.units, fields))?;
    staged.write(SUMMARY_FILE, &output.summary)?;
    staged.commit()?;

    tracing::info!(
        units = output.summary.output_units,
        output = %ctx.output_dir().display(),
        "voting precincts created"
    );
    Ok(output.summary)
}
