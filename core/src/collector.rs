//! Glob expansion and per-file metadata collection.

use glob::MatchOptions;
use std::fs;

use crate::error::{Error, Result};
use crate::record::FileRecord;

/// `*` and `?` stay within one path component, like shell globbing, but
/// may match a leading dot.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `pattern` and describe every regular file it matches.
///
/// Records come back in glob expansion order. Directories are skipped, and
/// a pattern that matches nothing (including a literal path that does not
/// exist) yields an empty list. Directories that cannot be read while the
/// pattern is expanded contribute no matches.
///
/// # Errors
///
/// The first failure aborts the whole collection:
/// - [`Error::Glob`] if the pattern is not valid glob syntax
/// - [`Error::Stat`] if the metadata of a matched path cannot be read
/// - [`Error::Timestamp`] if a file's mandatory timestamps are unavailable
pub fn collect(pattern: &str) -> Result<Vec<FileRecord>> {
    let paths = glob::glob_with(pattern, MATCH_OPTIONS).map_err(|source| Error::Glob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut records = Vec::new();

    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(path = %e.path().display(), error = %e.error(), "Skipping unreadable directory");
                continue;
            },
        };

        let metadata = fs::metadata(&path).map_err(|source| Error::Stat {
            path: path.clone(),
            source,
        })?;

        if metadata.is_dir() {
            tracing::trace!(path = %path.display(), "Skipping directory");
            continue;
        }

        let record = FileRecord::from_metadata(path, &metadata)?;
        tracing::trace!(path = %record.path.display(), mode = record.mode, "Collected file");
        records.push(record);
    }

    tracing::debug!(pattern, count = records.len(), "Glob collection finished");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::Path;

    /// Glob pattern rooted at `dir`, with the directory itself escaped.
    fn pattern_in(dir: &Path, tail: &str) -> String {
        let base = glob::Pattern::escape(&dir.to_string_lossy());
        format!("{base}/{tail}")
    }

    #[test]
    fn test_no_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = collect(&pattern_in(dir.path(), "*.txt")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_literal_path_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = collect(&pattern_in(dir.path(), "does-not-exist.txt")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_matches_in_expansion_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("c.log"), "c").unwrap();

        let records = collect(&pattern_in(dir.path(), "*.txt")).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, ["a.txt", "b.txt"]);
        assert_eq!(records[0].path, dir.path().join("a.txt"));
    }

    #[test]
    fn test_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("folder.txt")).unwrap();
        fs::create_dir(dir.path().join("other")).unwrap();
        fs::write(dir.path().join("file.txt"), "x").unwrap();

        let records = collect(&pattern_in(dir.path(), "*")).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, ["file.txt"]);
    }

    #[test]
    fn test_only_directories_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("one")).unwrap();
        fs::create_dir(dir.path().join("two")).unwrap();

        let records = collect(&pattern_in(dir.path(), "*")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.txt"), "x").unwrap();
        fs::write(dir.path().join("top.txt"), "x").unwrap();

        let shallow = collect(&pattern_in(dir.path(), "*.txt")).unwrap();
        assert_eq!(shallow.len(), 1);
        assert_eq!(shallow[0].name, "top.txt");

        let nested = collect(&pattern_in(dir.path(), "*/*.txt")).unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].name, "deep.txt");
    }

    #[test]
    fn test_wildcard_matches_leading_dot() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();

        let records = collect(&pattern_in(dir.path(), "*")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, ".hidden");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = collect("a***").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Glob);
        assert!(err.to_string().contains("a***"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_stat_error() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("link.txt")).unwrap();

        let err = collect(&pattern_in(dir.path(), "*.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Stat);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let open = dir.path().join("open");
        let locked = dir.path().join("locked");
        fs::create_dir(&open).unwrap();
        fs::create_dir(&locked).unwrap();
        fs::write(open.join("a.txt"), "a").unwrap();
        fs::write(locked.join("b.txt"), "b").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = collect(&pattern_in(dir.path(), "*/*.txt"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let names: Vec<String> = result.unwrap().into_iter().map(|r| r.name).collect();
        assert!(names.contains(&"a.txt".to_string()), "readable match missing: {names:?}");
        assert!(names.iter().all(|n| n == "a.txt" || n == "b.txt"));
    }
}
