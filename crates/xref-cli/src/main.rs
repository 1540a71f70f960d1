//! `precinct-xref`: resolve precinct cross-references and dissolve by voting precinct

mod commands;
mod logging;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use xref_core::{ConflictPolicy, XrefError};
use xref_io::{
    FieldNames, LoadError, RunError, DEFAULT_GROUP_FIELD, DEFAULT_LIST_FIELD, DEFAULT_MEMBER_FIELD,
};

fn field_args() -> [Arg; 3] {
    [
        Arg::new("member-field")
            .long("member-field")
            .default_value(DEFAULT_MEMBER_FIELD)
            .help("Member key column"),
        Arg::new("group-field")
            .long("group-field")
            .default_value(DEFAULT_GROUP_FIELD)
            .help("Group key column"),
        Arg::new("list-field")
            .long("list-field")
            .default_value(DEFAULT_LIST_FIELD)
            .help("Whitespace separated member list column"),
    ]
}

fn cli() -> Command {
    Command::new("precinct-xref")
        .version(xref_core::VERSION)
        .about("Resolve precinct cross-references into voting precinct groups")
        .subcommand_required(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log line format (verbosity via RUST_LOG)"),
        )
        .subcommand(
            Command::new("run")
                .about("Run resolve, join, fill and dissolve over a workspace")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline configuration (TOML)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print summary as JSON"),
                ),
        )
        .subcommand(
            Command::new("explode")
                .about("Explode a cross-reference table into one row per member")
                .arg(
                    Arg::new("xref")
                        .long("xref")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Cross-reference table (JSON or YAML)"),
                )
                .arg(
                    Arg::new("policy")
                        .long("policy")
                        .default_value("last_write_wins")
                        .value_parser(["last_write_wins", "first_write_wins", "reject"])
                        .help("Policy for a member listed under two groups"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output table (stdout if omitted)"),
                )
                .args(field_args()),
        )
        .subcommand(
            Command::new("check")
                .about("Check the member table has unique keys")
                .arg(
                    Arg::new("members")
                        .long("members")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Member table (JSON or YAML)"),
                )
                .args(field_args()),
        )
}

fn fields_from(args: &ArgMatches) -> FieldNames {
    let defaults = FieldNames::default();
    let get = |name: &str, fallback: String| args.get_one::<String>(name).cloned().unwrap_or(fallback);
    FieldNames {
        member_key: get("member-field", defaults.member_key),
        group_key: get("group-field", defaults.group_key),
        member_list: get("list-field", defaults.member_list),
    }
}

fn required_path(args: &ArgMatches, name: &str) -> anyhow::Result<PathBuf> {
    args.get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing --{name}"))
}

fn dispatch(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("run", args)) => {
            let summary = commands::run(&required_path(args, "config")?)?;
            commands::print_summary(&summary, args.get_flag("json"))
        }
        Some(("explode", args)) => {
            let policy = args
                .get_one::<String>("policy")
                .map(|p| p.parse::<ConflictPolicy>())
                .transpose()
                .map_err(anyhow::Error::msg)?
                .unwrap_or_default();
            let out = args.get_one::<PathBuf>("out");
            let count = commands::explode(
                &required_path(args, "xref")?,
                &fields_from(args),
                policy,
                out.map(PathBuf::as_path),
            )?;
            tracing::info!(members = count, "members have a group assigned");
            Ok(())
        }
        Some(("check", args)) => {
            let count = commands::check(&required_path(args, "members")?, &fields_from(args))?;
            println!("{count} members, all keys unique");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// 2 for bad input data, 1 for everything else
fn exit_code(err: &anyhow::Error) -> u8 {
    let input = err.chain().any(|cause| {
        cause
            .downcast_ref::<XrefError>()
            .is_some_and(XrefError::is_input_error)
            || cause
                .downcast_ref::<LoadError>()
                .is_some_and(LoadError::is_input_error)
            || cause
                .downcast_ref::<RunError>()
                .is_some_and(RunError::is_input_error)
    });
    if input {
        2
    } else {
        1
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    let format = matches
        .get_one::<String>("log-format")
        .map_or(logging::LogFormat::Text, |f| logging::LogFormat::parse(f));
    logging::init(format);

    match dispatch(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn explode_defaults_to_precinct_fields() {
        let matches = cli()
            .try_get_matches_from(["precinct-xref", "explode", "--xref", "x.json"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        assert_eq!(fields_from(args), FieldNames::default());
    }

    #[test]
    fn unknown_policy_is_rejected_by_parser() {
        let result = cli().try_get_matches_from([
            "precinct-xref",
            "explode",
            "--xref",
            "x.json",
            "--policy",
            "newest",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn input_errors_exit_with_two() {
        let err = anyhow::Error::new(XrefError::malformed_row(0, "member list is null"));
        assert_eq!(exit_code(&err), 2);

        let io = anyhow::anyhow!("disk on fire");
        assert_eq!(exit_code(&io), 1);
    }

    fn table(dir: &std::path::Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn empty_member_key_in_check_exits_with_two() {
        let dir = tempfile::tempdir().unwrap();
        let members = table(dir.path(), "members.json", r#"[{"Precinct": null}]"#);

        let err = commands::check(&members, &FieldNames::default()).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn missing_group_column_in_explode_exits_with_two() {
        let dir = tempfile::tempdir().unwrap();
        let xref = table(dir.path(), "xref.json", r#"[{"_Precincts": "P1"}]"#);

        let err = commands::explode(&xref, &FieldNames::default(), ConflictPolicy::default(), None)
            .unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn unreadable_table_exits_with_one() {
        let dir = tempfile::tempdir().unwrap();

        let err = commands::check(&dir.path().join("absent.json"), &FieldNames::default())
            .unwrap_err();
        assert_eq!(exit_code(&err), 1);
    }
}
