//! File metadata record emitted for every matched regular file.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Error, Result};

/// Metadata of one matched file.
///
/// Optional timestamps serialize as `null` when the filesystem does not
/// expose them; they are never replaced by a default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path exactly as produced by glob expansion.
    pub path: PathBuf,
    /// Final path component.
    pub name: String,
    /// File type and permission bits.
    pub mode: u32,
    /// Birth time, if the filesystem records one.
    pub created_at: Option<DateTime<Local>>,
    /// Last metadata change time, if the platform exposes one.
    pub changed_at: Option<DateTime<Local>>,
    /// Last content modification time.
    pub modified_at: DateTime<Local>,
    /// Last access time.
    pub last_accessed_at: DateTime<Local>,
}

impl FileRecord {
    /// Build a record from a path and the metadata already read for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timestamp`] if the modification or access time
    /// cannot be read.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Result<Self> {
        let modified_at = timestamp(&path, metadata.modified())?;
        let last_accessed_at = timestamp(&path, metadata.accessed())?;

        let created_at = match metadata.created() {
            Ok(time) => Some(DateTime::from(time)),
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "Birth time unavailable");
                None
            },
        };

        let name = path.file_name().map_or_else(
            || path.to_string_lossy().into_owned(),
            |n| n.to_string_lossy().into_owned(),
        );

        Ok(Self {
            name,
            mode: file_mode(metadata),
            created_at,
            changed_at: change_time(metadata),
            modified_at,
            last_accessed_at,
            path,
        })
    }
}

/// Convert a mandatory platform timestamp.
fn timestamp(path: &Path, time: io::Result<SystemTime>) -> Result<DateTime<Local>> {
    time.map(DateTime::from).map_err(|source| Error::Timestamp {
        path: path.to_path_buf(),
        source,
    })
}

/// Raw `st_mode` bits.
#[cfg(unix)]
fn file_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

/// Regular file bits synthesised from the read-only flag.
#[cfg(not(unix))]
fn file_mode(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o100_444
    } else {
        0o100_666
    }
}

/// Inode change time (`st_ctime`).
#[cfg(unix)]
fn change_time(metadata: &Metadata) -> Option<DateTime<Local>> {
    use std::os::unix::fs::MetadataExt;
    let nanos = u32::try_from(metadata.ctime_nsec()).ok()?;
    DateTime::from_timestamp(metadata.ctime(), nanos).map(|t| t.with_timezone(&Local))
}

#[cfg(not(unix))]
fn change_time(_metadata: &Metadata) -> Option<DateTime<Local>> {
    None
}
