//! JSON output: straight to standard output, or streamed into the standard
//! input of an external filter command.
//!
//! When a command is given, its standard output and standard error are
//! inherited untouched. A separate task waits for the child to exit and hands
//! the outcome back over a oneshot channel while the main flow writes the
//! payload into the child's input.

use std::fmt;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::record::FileRecord;

/// Name used for the process's own standard output in error messages.
const STDOUT_TARGET: &str = "standard output";

/// External filter command, e.g. `jq .`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Program to run, resolved through `PATH`.
    program: String,
    /// Arguments passed to the program.
    args: Vec<String>,
}

impl ExternalCommand {
    /// Build a command from a full argv; `None` when `argv` is empty.
    #[must_use]
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next()?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }

    /// Program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Program arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Lifecycle of the sink while an external command is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Nothing has happened yet.
    NotStarted,
    /// The command is being spawned.
    SpawnPending,
    /// The payload is being written to the command's input.
    Piping,
    /// Input is closed; waiting for the command to exit.
    AwaitingExit,
    /// The command exited successfully.
    Succeeded,
    /// Some phase failed.
    Failed,
}

impl fmt::Display for SinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not-started",
            Self::SpawnPending => "spawn-pending",
            Self::Piping => "piping",
            Self::AwaitingExit => "awaiting-exit",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Serialize `records` as one compact JSON array followed by a newline.
///
/// # Errors
///
/// Returns [`Error::Encode`] if a record cannot be represented as JSON
/// (for example a path that is not valid UTF-8).
pub fn encode(records: &[FileRecord]) -> Result<Vec<u8>> {
    let mut payload = serde_json::to_vec(records).map_err(Error::Encode)?;
    payload.push(b'\n');
    Ok(payload)
}

/// Encode `records` and write them to `writer` in a single write.
///
/// # Errors
///
/// Returns [`Error::Encode`] before anything is written if encoding fails,
/// or [`Error::Pipe`] if writing or flushing fails.
pub async fn write_json<W>(records: &[FileRecord], writer: &mut W, target: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = encode(records)?;
    let pipe_error = |source: io::Error| Error::Pipe {
        target: target.to_string(),
        source,
    };

    writer.write_all(&payload).await.map_err(pipe_error)?;
    writer.flush().await.map_err(pipe_error)?;
    Ok(())
}

/// Emit `records` to standard output, or through `command` if one is given.
///
/// # Errors
///
/// Without a command, fails with [`Error::Encode`] or [`Error::Pipe`].
/// With a command, additionally fails with [`Error::Spawn`] if it cannot be
/// started (nothing is written in that case) and with
/// [`Error::Subprocess`]/[`Error::Wait`] if it exits unsuccessfully.
pub async fn emit(records: &[FileRecord], command: Option<&ExternalCommand>) -> Result<()> {
    match command {
        None => {
            let mut stdout = tokio::io::stdout();
            write_json(records, &mut stdout, STDOUT_TARGET).await
        },
        Some(command) => {
            let mut pipeline = Pipeline::new(command);
            let result = pipeline.run(records).await;
            match &result {
                Ok(()) => pipeline.advance(SinkState::Succeeded),
                Err(e) => {
                    tracing::debug!(command = %command, error = %e, "External command failed");
                    pipeline.advance(SinkState::Failed);
                },
            }
            result
        },
    }
}

/// One run of records through an external command.
struct Pipeline<'a> {
    /// Command being fed.
    command: &'a ExternalCommand,
    /// Current lifecycle state.
    state: SinkState,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline in the `NotStarted` state.
    const fn new(command: &'a ExternalCommand) -> Self {
        Self {
            command,
            state: SinkState::NotStarted,
        }
    }

    /// Move to `next`, logging the transition.
    fn advance(&mut self, next: SinkState) {
        tracing::debug!(command = %self.command, from = %self.state, to = %next, "Sink state change");
        self.state = next;
    }

    /// Name of the child's input stream for error messages.
    fn input_target(&self) -> String {
        format!("the standard input of `{}`", self.command.program)
    }

    /// Spawn, pipe, and wait.
    async fn run(&mut self, records: &[FileRecord]) -> Result<()> {
        self.advance(SinkState::SpawnPending);

        let program = self.command.program.clone();
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| Error::Pipe {
            target: self.input_target(),
            source: io::Error::other("input stream was not captured"),
        })?;

        let (exit_tx, exit_rx) = oneshot::channel();
        tokio::spawn(async move {
            if exit_tx.send(child.wait().await).is_err() {
                tracing::debug!("Exit status receiver dropped");
            }
        });

        self.advance(SinkState::Piping);
        write_json(records, &mut stdin, &self.input_target()).await?;
        stdin.shutdown().await.map_err(|source| Error::Pipe {
            target: self.input_target(),
            source,
        })?;
        drop(stdin);

        self.advance(SinkState::AwaitingExit);
        let status = exit_rx
            .await
            .map_err(|_| Error::Wait {
                program: program.clone(),
                source: io::Error::other("exit watcher stopped before reporting"),
            })?
            .map_err(|source| Error::Wait {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(Error::Subprocess { program, status });
        }

        Ok(())
    }
}
