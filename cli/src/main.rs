//! fq - describe files matching a glob as JSON, optionally piped through a
//! filter command such as `jq`.

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use std::process::ExitCode;

mod logging;
mod output;

use fq_core::{Config, ExternalCommand, collect, emit, render_chain};

#[cfg(test)]
use {assert_cmd as _, predicates as _, serde_json as _, tempfile as _};

/// List files matching a glob pattern with their metadata as a JSON array.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Glob pattern selecting the files (e.g. "*.txt" or "src/*/*.rs").
    pattern: Option<String>,

    /// Filter command that receives the JSON on its standard input (e.g. `jq .`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Report `err` on stderr and return the failure exit code.
fn die(err: &anyhow::Error) -> ExitCode {
    tracing::debug!(error = ?err, "Aborting");
    output::eprintln(format_args!("Error: {}; aborting.", render_chain(err.as_ref())));
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let config = Config::from_env();
    let _log_guard = match logging::init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            output::eprintln(format_args!(
                "Warning: failed to initialize logging: {}",
                render_chain(e.as_ref())
            ));
            None
        },
    };

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return if e.print().is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        },
        Err(e) => return die(&anyhow::Error::new(e).context("Invalid arguments")),
    };

    let Some(pattern) = args.pattern else {
        return die(&anyhow::anyhow!("Any argument must be passed"));
    };

    match run(pattern, ExternalCommand::from_argv(args.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => die(&e),
    }
}

/// Collect the records for `pattern` and emit them.
fn run(pattern: String, command: Option<ExternalCommand>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    runtime.block_on(async {
        tracing::info!(pattern = %pattern, "Collecting files");
        let records = tokio::task::spawn_blocking(move || collect(&pattern))
            .await
            .context("Task join error")?
            .context("Failed to query files from the glob")?;

        match &command {
            Some(command) => {
                tracing::info!(command = %command, count = records.len(), "Piping file list");
                emit(&records, Some(command))
                    .await
                    .with_context(|| format!("Failed to pipe the file list through `{command}`"))
            },
            None => emit(&records, None)
                .await
                .context("Failed to write the file list"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_pattern_only() {
        let args = CliArgs::try_parse_from(["fq", "*.txt"]).unwrap();
        assert_eq!(args.pattern.as_deref(), Some("*.txt"));
        assert!(args.command.is_empty());
    }

    #[test]
    fn test_no_arguments() {
        let args = CliArgs::try_parse_from(["fq"]).unwrap();
        assert_eq!(args.pattern, None);
    }

    #[test]
    fn test_command_keeps_its_flags() {
        let args = CliArgs::try_parse_from(["fq", "*.txt", "jq", "-r", ".[].name"]).unwrap();
        assert_eq!(args.pattern.as_deref(), Some("*.txt"));
        assert_eq!(args.command, ["jq", "-r", ".[].name"]);
    }

    #[test]
    fn test_help_is_reported_as_display() {
        let err = CliArgs::try_parse_from(["fq", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
