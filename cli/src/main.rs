use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use quarry::{describe_schema, load_schema_dir, regenerate, Outcome};
use quarry_compiler::error::QuarryError;

#[derive(Debug, Parser)]
#[command(name = "quarry", version)]
#[command(about = "Regenerate packet handling code from a protocol schema", long_about = None)]
struct Cli {
    /// Directory holding protocol.json, mappings.json and an optional quarry.json
    #[arg(long, default_value = "./assets")]
    schema_dir: PathBuf,

    /// Project root the target file path is resolved against
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Exit with status 1 if the target file is out of date, without writing it
    #[arg(long)]
    check: bool,

    /// Print the verified schema as JSON instead of generating
    #[arg(long)]
    dump: bool,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<ExitCode, QuarryError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.dump {
        let generator = load_schema_dir(&cli.schema_dir)?;
        println!("{}", describe_schema(&generator)?);
        return Ok(ExitCode::SUCCESS);
    }

    match regenerate(&cli.schema_dir, &cli.project_dir, cli.check)? {
        Outcome::Written(path) => println!("Updated {}", path.display()),
        Outcome::Unchanged(path) => println!("{} is up to date", path.display()),
        Outcome::Stale(path) => {
            eprintln!("{} is out of date", path.display());
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["quarry"]).unwrap();
        assert_eq!(cli.schema_dir, PathBuf::from("./assets"));
        assert_eq!(cli.project_dir, PathBuf::from("."));
        assert!(!cli.check);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "quarry", "--schema-dir", "schema", "--project-dir", "server", "--check", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.schema_dir, PathBuf::from("schema"));
        assert_eq!(cli.project_dir, PathBuf::from("server"));
        assert!(cli.check);
        assert_eq!(directive_for_verbosity(cli.verbose), "trace");
    }
}
