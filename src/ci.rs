//! CI output file emission.
//!
//! GitHub Actions exposes a file path in `GITHUB_OUTPUT`; appending
//! `key=value` lines to it publishes step outputs for later workflow steps.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::info;

/// Appends one `key=value` line to the CI output file.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened or
/// written.
pub fn append_output(path: &Path, key: &str, value: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{key}={value}")?;
    info!(path = %path.display(), key, "wrote CI output");
    Ok(())
}
