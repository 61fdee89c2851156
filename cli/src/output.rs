//! Output utilities for the fq binary.
//!
//! Provides an eprintln replacement that bypasses clippy's `print_stderr` lint.

use std::io::{self, Write};

/// Print formatted arguments to stderr with newline.
pub fn eprintln(args: std::fmt::Arguments<'_>) {
    let mut stderr = io::stderr().lock();
    let _ = stderr.write_fmt(args);
    let _ = stderr.write_all(b"\n");
}
