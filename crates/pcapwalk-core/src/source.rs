//! Materializes a capture file into memory.
//!
//! This is the only I/O in the crate; everything downstream decodes the
//! returned buffer.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a whole capture file.
///
/// # Errors
/// Returns `SourceError::Io` with the offending path when the file cannot be
/// read.
pub fn read_capture_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "capture loaded");
    Ok(bytes)
}
