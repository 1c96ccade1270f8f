//! Loading the diff document.
//!
//! This is the one fatal input condition of a run: without a readable
//! document there is nothing to compare, and the caller renders a failure
//! report instead of a diff.

use crate::models::DiffInput;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Why the diff document could not be used.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read diff results from {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse diff results from {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode the diff document at `path`.
pub fn load_diff_input(path: &Path) -> Result<DiffInput, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let input: DiffInput = serde_json::from_str(&content).map_err(|source| {
        debug!("Diff document content:\n{}", content);
        InputError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!(
        "Loaded diff results for {} files from {}",
        input.files.len(),
        path.display()
    );
    Ok(input)
}
