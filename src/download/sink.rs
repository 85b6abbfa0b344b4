//! Filesystem operations for a download run

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Owns every on-disk mutation of a run
///
/// Callers are responsible for keeping paths under the chosen output root.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl FileSink {
    pub fn new() -> Self {
        Self
    }

    /// Create a directory and its parents if missing
    pub async fn ensure_dir(&self, path: &Path) -> Result<(), SinkError> {
        fs::create_dir_all(path)
            .await
            .map_err(|source| SinkError::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Ensured directory: {}", path.display());
        Ok(())
    }

    /// Write a file, replacing any existing content
    pub async fn write(&self, path: &Path, data: &[u8]) -> Result<(), SinkError> {
        fs::write(path, data).await.map_err(|source| SinkError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Wrote {} bytes: {}", data.len(), path.display());
        Ok(())
    }

    /// Remove a file or directory tree; a missing path is not an error
    pub async fn delete_recursive(&self, path: &Path) -> Result<(), SinkError> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Nothing to delete at {}", path.display());
                return Ok(());
            }
            Err(source) => {
                return Err(SinkError::Delete {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        result.map_err(|source| SinkError::Delete {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Deleted: {}", path.display());
        Ok(())
    }
}
