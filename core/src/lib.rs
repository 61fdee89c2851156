//! fq core library
//!
//! Expands a glob pattern into file metadata records and emits them as JSON,
//! either on standard output or through an external filter command.

pub mod collector;
pub mod config;
pub mod error;
pub mod record;
pub mod sink;

pub use collector::collect;

pub use config::Config;

pub use error::{Error, ErrorKind, Result, render_chain};

pub use record::FileRecord;

pub use sink::{ExternalCommand, SinkState, emit};
