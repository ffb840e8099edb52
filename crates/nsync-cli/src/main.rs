use clap::{builder::PossibleValuesParser, value_parser, Arg, ArgAction, ArgMatches, Command};
use nsync_cli::{commands, observability, DeployOptions, LogFormat, PayloadShape};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("nsync")
        .version(nsync_cli::VERSION)
        .about("Reconcile declarative notification schemes against a remote")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(PossibleValuesParser::new(["text", "json"]))
                .help("Log line format on stderr"),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the event operations a deploy would issue")
                .arg(
                    Arg::new("after")
                        .long("after")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Desired scheme snapshot (JSON or YAML)"),
                )
                .arg(
                    Arg::new("before")
                        .long("before")
                        .value_parser(value_parser!(PathBuf))
                        .help("Previously deployed snapshot; omit for a new scheme"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a payload file against the expected shape")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Payload file (JSON or YAML)"),
                )
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("remote")
                        .value_parser(PossibleValuesParser::new(PayloadShape::NAMES))
                        .help("Payload shape"),
                ),
        )
        .subcommand(
            Command::new("deploy")
                .about("Apply change records to the configured remote")
                .arg(
                    Arg::new("changes")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Change records file (JSON or YAML)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .env("NSYNC_CONFIG")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory receiving updated schemes"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

async fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let mut out = std::io::stdout().lock();

    match matches.subcommand() {
        Some(("plan", args)) => {
            let after = args
                .get_one::<PathBuf>("after")
                .ok_or_else(|| anyhow::anyhow!("--after is required"))?;
            let before = args.get_one::<PathBuf>("before");
            commands::plan(before.map(PathBuf::as_path), after, args.get_flag("json"), &mut out)?;
            Ok(true)
        }
        Some(("validate", args)) => {
            let file = args
                .get_one::<PathBuf>("file")
                .ok_or_else(|| anyhow::anyhow!("file is required"))?;
            let shape = args
                .get_one::<String>("kind")
                .and_then(|kind| PayloadShape::parse(kind))
                .unwrap_or_default();
            commands::validate(file, shape, &mut out)
        }
        Some(("deploy", args)) => {
            let options = DeployOptions {
                config: args.get_one::<PathBuf>("config").cloned(),
                changes: args
                    .get_one::<PathBuf>("changes")
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("changes file is required"))?,
                out_dir: args.get_one::<PathBuf>("out").cloned(),
                json: args.get_flag("json"),
            };
            commands::deploy(&options, &mut out).await
        }
        _ => anyhow::bail!("unknown command"),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let format = matches
        .get_one::<String>("log-format")
        .and_then(|f| LogFormat::parse(f))
        .unwrap_or_default();
    observability::init(format);

    let code = match run(&matches).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_deploy_arguments() {
        let matches = cli()
            .try_get_matches_from(["nsync", "deploy", "changes.yaml", "--out", "applied", "--json"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();

        assert_eq!(name, "deploy");
        assert_eq!(args.get_one::<PathBuf>("changes").unwrap(), &PathBuf::from("changes.yaml"));
        assert!(args.get_flag("json"));
    }

    #[test]
    fn rejects_unknown_validate_kind() {
        assert!(cli()
            .try_get_matches_from(["nsync", "validate", "x.json", "--kind", "page"])
            .is_err());
    }
}
