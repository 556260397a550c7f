use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("TOC file (YAML)")
}

fn in_place_arg() -> Arg {
    Arg::new("in-place")
        .long("in-place")
        .short('i')
        .action(ArgAction::SetTrue)
        .help("Write the result back to the file instead of stdout")
}

fn cli() -> Command {
    Command::new("doctree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check, reshape and render repository TOC files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with remove_policy, max_depth and default_position"),
        )
        .subcommand(
            Command::new("validate")
                .about("Decode a TOC file and check its depth")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("render")
                .about("Render a TOC file as an HTML outline")
                .arg(file_arg())
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .help("Path prefix joined to relative urls, e.g. /owner/repo"),
                ),
        )
        .subcommand(
            Command::new("fmt")
                .about("Rewrite a TOC file in canonical form")
                .arg(file_arg())
                .arg(in_place_arg()),
        )
        .subcommand(
            Command::new("move")
                .about("Move an entry and its children relative to another entry")
                .arg(file_arg())
                .arg(
                    Arg::new("node")
                        .long("node")
                        .required(true)
                        .help("Entry to move: index, doc:<id> or url:<url>"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .required(true)
                        .help("Entry to move relative to"),
                )
                .arg(
                    Arg::new("position")
                        .long("position")
                        .help("before, after or child (left/right accepted)"),
                )
                .arg(in_place_arg()),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove the entries of a document")
                .arg(file_arg())
                .arg(
                    Arg::new("doc")
                        .long("doc")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Document id"),
                )
                .arg(
                    Arg::new("cascade")
                        .long("cascade")
                        .action(ArgAction::SetTrue)
                        .help("Remove children too instead of promoting them"),
                )
                .arg(in_place_arg()),
        )
        .subcommand(
            Command::new("build")
                .about("Build the default TOC from a JSON list of documents")
                .arg(
                    Arg::new("documents")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of {id, title, slug}"),
                ),
        )
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = commands::load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("validate", args)) => {
            let file = required_path(args, "file")?;
            print!("{}", commands::validate(file, &config)?);
        }
        Some(("render", args)) => {
            let file = required_path(args, "file")?;
            let prefix = args.get_one::<String>("prefix").map(String::as_str);
            print!("{}", commands::render(file, prefix)?);
        }
        Some(("fmt", args)) => {
            let file = required_path(args, "file")?;
            let text = commands::format(file)?;
            commands::emit(file, &text, args.get_flag("in-place"))?;
        }
        Some(("move", args)) => {
            let file = required_path(args, "file")?;
            let text = commands::move_entry(
                file,
                required_str(args, "node")?,
                required_str(args, "target")?,
                args.get_one::<String>("position").map(String::as_str),
                &config,
            )?;
            commands::emit(file, &text, args.get_flag("in-place"))?;
        }
        Some(("remove", args)) => {
            let file = required_path(args, "file")?;
            let doc = args
                .get_one::<i64>("doc")
                .copied()
                .ok_or_else(|| anyhow::anyhow!("missing --doc"))?;
            let text = commands::remove(file, doc, args.get_flag("cascade"), &config)?;
            commands::emit(file, &text, args.get_flag("in-place"))?;
        }
        Some(("build", args)) => {
            print!("{}", commands::build(required_path(args, "documents")?)?);
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a std::path::Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .ok_or_else(|| anyhow::anyhow!("missing <{name}>"))
}

fn required_str<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("missing --{name}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    run(&cli().get_matches())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_move_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "doctree", "--config", "toc.toml", "move", "toc.yml", "--node", "doc:3", "--target", "0",
                "--position", "left", "-i",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "move");
        assert_eq!(required_str(args, "node").unwrap(), "doc:3");
        assert_eq!(args.get_one::<String>("position").map(String::as_str), Some("left"));
        assert!(args.get_flag("in-place"));
        assert!(matches.get_one::<PathBuf>("config").is_some());
    }

    #[test]
    fn remove_requires_numeric_doc() {
        assert!(cli()
            .try_get_matches_from(["doctree", "remove", "toc.yml", "--doc", "abc"])
            .is_err());
    }
}
