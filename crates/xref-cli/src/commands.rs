//! Subcommand implementations

use anyhow::{Context, Result};
use std::path::Path;
use xref_core::{validate_unique_members, ConflictPolicy, KeyMappingResolver, KeyedDissolve, PipelineSummary};
use xref_io::{
    cross_reference_rows, explode_records, member_entities, read_records, run_workspace,
    write_table, FieldNames, PipelineConfig, WorkspaceContext,
};

/// `run`: full pipeline driven by a configuration file
pub(crate) fn run(config_path: &Path) -> Result<PipelineSummary> {
    let config = PipelineConfig::load(config_path)
        .with_context(|| format!("loading configuration {}", config_path.display()))?;
    let ctx = WorkspaceContext::setup(&config).context("setting up workspace")?;

    let summary = run_workspace(&config, &ctx, &KeyedDissolve)?;
    Ok(summary)
}

/// `explode`: resolve a cross-reference table into the member → group table
pub(crate) fn explode(
    xref_path: &Path,
    fields: &FieldNames,
    policy: ConflictPolicy,
    out: Option<&Path>,
) -> Result<usize> {
    let records = read_records(xref_path)
        .with_context(|| format!("reading cross-reference {}", xref_path.display()))?;
    let rows = cross_reference_rows(&records, fields)?;
    let mapping = KeyMappingResolver::new().with_policy(policy).resolve(&rows)?;
    let exploded = explode_records(&mapping, fields);

    match out {
        Some(path) => write_table(path, &exploded)?,
        None => println!("{}", serde_json::to_string_pretty(&exploded)?),
    }
    Ok(mapping.len())
}

/// `check`: validate the member table has unique keys
pub(crate) fn check(members_path: &Path, fields: &FieldNames) -> Result<usize> {
    let records = read_records(members_path)
        .with_context(|| format!("reading member table {}", members_path.display()))?;
    let members = member_entities(&records, fields)?;
    validate_unique_members(&members)?;
    Ok(members.len())
}

/// Print a run summary
pub(crate) fn print_summary(summary: &PipelineSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Cross-Reference Run Summary");
    println!("===========================");
    println!("  Rows read:          {}", summary.rows_read);
    println!("  Mappings resolved:  {}", summary.mappings_resolved);
    println!("  Conflicts:          {}", summary.conflicts);
    println!("  Members:            {}", summary.members_total);
    println!("  Joined:             {}", summary.members_joined);
    println!("  Patched (fallback): {}", summary.members_patched);
    println!("  Grouped:            {}", summary.members_grouped);
    println!("  Output units:       {}", summary.output_units);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn explode_writes_table() {
        let dir = tempfile::tempdir().unwrap();
        let xref = write(
            dir.path(),
            "xref.json",
            r#"[{"VotePrec": "V1", "_Precincts": "P1 P1 P2"}]"#,
        );
        let out = dir.path().join("explode.json");

        let count = explode(&xref, &FieldNames::default(), ConflictPolicy::default(), Some(&out)).unwrap();

        assert_eq!(count, 2);
        assert_eq!(read_records(&out).unwrap().len(), 2);
    }

    #[test]
    fn check_reports_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let members = write(
            dir.path(),
            "members.json",
            r#"[{"Precinct": "P1"}, {"Precinct": "P1"}]"#,
        );

        let err = check(&members, &FieldNames::default()).unwrap_err();
        assert!(err.downcast_ref::<xref_core::XrefError>().is_some());
    }

    #[test]
    fn run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "members.json", r#"[{"Precinct": "P1"}, {"Precinct": "P2"}]"#);
        write(dir.path(), "xref.json", r#"[{"VotePrec": "V1", "_Precincts": "P1"}]"#);
        let config = write(
            dir.path(),
            "pipeline.toml",
            "[inputs]\nmembers = \"members.json\"\ncross_reference = \"xref.json\"\n",
        );

        let summary = run(&config).unwrap();

        assert_eq!(summary.output_units, 2);
        assert!(dir.path().join("out").join("summary.json").is_file());
    }
}
