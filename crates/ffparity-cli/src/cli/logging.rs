use super::CliError;
use anyhow::Context;
use ffparity_core::ParityError;
use std::fs::File;
use std::path::Path;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

pub(super) fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// `-v`/`-q` set the default level. `RUST_LOG` directives refine it unless
/// output is silenced.
pub(super) fn log_filter(verbosity: u8, quiet: bool, directives: Option<&str>) -> EnvFilter {
    let level = level_filter(verbosity, quiet);
    let directives = match directives {
        Some(extra) if !quiet && !extra.trim().is_empty() => format!("{level},{extra}"),
        _ => level.to_string(),
    };
    EnvFilter::builder().parse_lossy(directives)
}

pub(super) fn setup_logging(
    verbosity: u8,
    quiet: bool,
    log_file: Option<&Path>,
) -> Result<(), CliError> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = tracing_subscriber::registry()
        .with(log_filter(verbosity, quiet, directives.as_deref()))
        .with(stderr_layer);

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| {
                CliError::Compute(ParityError::io_system(
                    "IO.LOG_FILE",
                    format!("failed to create log file '{}': {}", path.display(), source),
                ))
            })?;
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true);
            subscriber
                .with(file_layer)
                .try_init()
                .context("failed to install the log subscriber")?;
        }
        None => {
            subscriber
                .try_init()
                .context("failed to install the log subscriber")?;
        }
    }
    Ok(())
}
