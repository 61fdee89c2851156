//! Error taxonomy shared by the collector and the sink.
//!
//! Every variant keeps its underlying cause reachable through
//! [`std::error::Error::source`], and its own message names only the step
//! that failed. [`render_chain`] joins the two into the
//! `message (Caused by: cause)` form shown to users.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::sink::SinkState;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised while collecting or emitting file records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The glob pattern is not valid glob syntax.
    #[error("Failed to match from the glob `{pattern}`")]
    Glob {
        /// Pattern as given on the command line.
        pattern: String,
        /// Parser diagnostic.
        #[source]
        source: glob::PatternError,
    },

    /// Metadata of a matched path could not be read.
    #[error("Failed to stat the file {}", .path.display())]
    Stat {
        /// Path whose metadata was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A mandatory timestamp is not exposed for the file.
    #[error("Failed to fetch timestamps of the file {}", .path.display())]
    Timestamp {
        /// Path whose timestamps were requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The external command could not be started.
    #[error("Failed to start `{program}`")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing the JSON payload (or closing the stream) failed.
    #[error("I/O error while writing to {target}")]
    Pipe {
        /// Human readable name of the stream being written.
        target: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The records could not be serialized.
    #[error("Failed to encode to JSON")]
    Encode(#[source] serde_json::Error),

    /// The external command ran but reported failure.
    #[error("`{program}` exited with {status}")]
    Subprocess {
        /// Program that failed.
        program: String,
        /// Exit status it reported.
        status: ExitStatus,
    },

    /// Waiting for the external command to exit failed.
    #[error("Failed to wait `{program}` to exit")]
    Wait {
        /// Program being waited on.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid glob pattern.
    Glob,
    /// Metadata read failure.
    Stat,
    /// Timestamp read failure.
    Timestamp,
    /// External command could not start.
    Spawn,
    /// Output stream I/O failure.
    Pipe,
    /// JSON serialization failure.
    Encode,
    /// External command failed or could not be waited on.
    Subprocess,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Glob { .. } => ErrorKind::Glob,
            Self::Stat { .. } => ErrorKind::Stat,
            Self::Timestamp { .. } => ErrorKind::Timestamp,
            Self::Spawn { .. } => ErrorKind::Spawn,
            Self::Pipe { .. } => ErrorKind::Pipe,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Subprocess { .. } | Self::Wait { .. } => ErrorKind::Subprocess,
        }
    }

    /// Sink state in which this error occurred.
    ///
    /// Collection errors happen before the sink starts and return `None`.
    #[must_use]
    pub const fn state(&self) -> Option<SinkState> {
        match self {
            Self::Glob { .. } | Self::Stat { .. } | Self::Timestamp { .. } => None,
            Self::Spawn { .. } => Some(SinkState::SpawnPending),
            Self::Pipe { .. } | Self::Encode(_) => Some(SinkState::Piping),
            Self::Subprocess { .. } | Self::Wait { .. } => Some(SinkState::AwaitingExit),
        }
    }
}

/// Render an error and all of its causes as
/// `outer (Caused by: inner (Caused by: innermost))`.
#[must_use]
pub fn render_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let messages: Vec<String> = std::iter::successors(Some(err), |e| e.source())
        .map(ToString::to_string)
        .collect();

    messages
        .into_iter()
        .rev()
        .reduce(|inner, outer| format!("{outer} (Caused by: {inner})"))
        .unwrap_or_default()
}
