mod commands;
mod logging;

use clap::Parser;
use ffparity_core::ParityError;
use std::path::PathBuf;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let parity_error = error.as_parity_error();
            eprintln!("{}", parity_error.diagnostic_line());
            if let Some(summary_line) = parity_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            parity_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("ffparity".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();

    match Cli::try_parse_from(&full_args) {
        Ok(cli) => {
            logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "ffparity",
    version,
    about = "Check force-field energy reports against a trusted reference"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG refines it
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write log output to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Reconcile one candidate report against one reference report
    Check(commands::CheckArgs),
    /// Reconcile every report pair listed in a batch manifest
    Batch(commands::BatchArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Check(args) => commands::run_check_command(args),
        CliCommand::Batch(args) => commands::run_batch_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(ParityError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_parity_error(&self) -> ParityError {
        match self {
            Self::Usage(message) => {
                ParityError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => ParityError::internal("SYS.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};
    use ffparity_core::ParityErrorCategory;

    #[test]
    fn help_and_version_exit_cleanly() {
        assert_eq!(run(["--help"]).expect("help should succeed"), 0);
        assert_eq!(run(["--version"]).expect("version should succeed"), 0);
        assert_eq!(run(["check", "--help"]).expect("help should succeed"), 0);
    }

    #[test]
    fn missing_subcommand_is_a_usage_error() {
        let error = run(Vec::<String>::new()).expect_err("no subcommand should fail");
        assert!(matches!(error, CliError::Usage(_)));
        let parity_error = error.as_parity_error();
        assert_eq!(parity_error.exit_code(), 2);
        assert_eq!(parity_error.placeholder(), "INPUT.CLI_USAGE");
    }

    #[test]
    fn check_requires_molecule_names() {
        let error = run(["check", "--candidate", "a.log", "--reference", "b.log"])
            .expect_err("names are required");
        assert!(matches!(error, CliError::Usage(_)));
    }

    #[test]
    fn unknown_variant_is_rejected_by_the_parser() {
        let error = run(["batch", "--manifest", "m.json", "-f", "UFF"])
            .expect_err("unknown variant should fail");
        assert!(matches!(error, CliError::Usage(ref message) if message.contains("UFF")));
    }

    #[test]
    fn internal_errors_map_to_exit_code_five() {
        let error = CliError::Internal(anyhow::anyhow!("subscriber already set"));
        let parity_error = error.as_parity_error();
        assert_eq!(parity_error.category(), ParityErrorCategory::InternalError);
        assert_eq!(parity_error.exit_code(), 5);
    }
}
