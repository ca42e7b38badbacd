//! Postman environment file read/update/rewrite.
//!
//! The file is a JSON document with shape
//! `{ "values": [ { "key": ..., "value": ..., ... }, ... ], ... }`.
//! Only the entry whose key matches the configured target is mutated; the
//! target key must pre-exist. The rewrite keeps the upstream tab-indented
//! formatting so diffs against tooling-managed files stay minimal.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

/// Errors that can occur while updating the environment file.
#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
    /// I/O error reading the environment file.
    #[error("failed to read environment file '{path}': {source}")]
    Read {
        /// Path of the environment file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file content is not valid JSON.
    #[error("environment file '{path}' is not valid JSON: {source}")]
    Parse {
        /// Path of the environment file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The document has no `values` array.
    #[error("environment file '{path}' has no 'values' array")]
    MissingValues {
        /// Path of the environment file.
        path: String,
    },

    /// No entry with the expected key. This is a configuration-schema
    /// violation: the flow only updates the entry, it never creates it.
    #[error("environment file '{path}' has no entry with key '{key}'")]
    MissingKey {
        /// Path of the environment file.
        path: String,
        /// The expected entry key.
        key: String,
    },

    /// Serialization of the updated document failed.
    #[error("failed to serialize environment file '{path}': {source}")]
    Serialize {
        /// Path of the environment file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// I/O error writing the environment file back.
    #[error("failed to write environment file '{path}': {source}")]
    Write {
        /// Path of the environment file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Overwrites the value of the entry whose key equals `key`, then rewrites
/// the whole file in a single write with tab-indented JSON.
///
/// The file is untouched when the key is absent.
///
/// # Errors
///
/// Returns [`EnvFileError`] when the file cannot be read or parsed, when
/// the `values` array or the target key is missing, or when the rewrite
/// fails.
pub fn update_value(path: &Path, key: &str, new_value: &str) -> Result<(), EnvFileError> {
    let path_display = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|source| EnvFileError::Read {
        path: path_display.clone(),
        source,
    })?;
    let mut document: Value =
        serde_json::from_str(&content).map_err(|source| EnvFileError::Parse {
            path: path_display.clone(),
            source,
        })?;

    let values = document
        .get_mut("values")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| EnvFileError::MissingValues {
            path: path_display.clone(),
        })?;

    let entry = values
        .iter_mut()
        .find(|entry| entry.get("key").and_then(Value::as_str) == Some(key))
        .ok_or_else(|| EnvFileError::MissingKey {
            path: path_display.clone(),
            key: key.to_string(),
        })?;
    entry["value"] = Value::String(new_value.to_string());
    debug!(key, "updated environment entry in memory");

    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|source| EnvFileError::Serialize {
            path: path_display.clone(),
            source,
        })?;

    fs::write(path, buffer).map_err(|source| EnvFileError::Write {
        path: path_display.clone(),
        source,
    })?;
    info!(path = %path_display, key, "environment file updated");
    Ok(())
}
