//! Error types for replik

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for replik operations
#[derive(Debug, Error)]
pub enum ReplikError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (logic checks)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failed to read a source entry
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or write a destination entry
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to apply metadata (mode, ownership, xattrs, times) to an entry
    #[error("failed to apply metadata to {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Entry kind or attribute that cannot be replicated at the current
    /// privilege level (device nodes, fifos, sockets, foreign ownership,
    /// privileged xattr namespaces)
    #[error("unsupported entry {path}: {detail}")]
    Unsupported { path: PathBuf, detail: String },
}

impl ReplikError {
    /// Build a source-read error with path context
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReplikError::Read {
            path: path.into(),
            source,
        }
    }

    /// Build a destination-write error with path context
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReplikError::Write {
            path: path.into(),
            source,
        }
    }

    /// Build a metadata-application error with path context
    pub fn metadata(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReplikError::Metadata {
            path: path.into(),
            source,
        }
    }

    /// Build an unsupported-entry error with path context
    pub fn unsupported(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        ReplikError::Unsupported {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// The offending path, when the error carries one
    pub fn path(&self) -> Option<&Path> {
        match self {
            ReplikError::Read { path, .. }
            | ReplikError::Write { path, .. }
            | ReplikError::Metadata { path, .. }
            | ReplikError::Unsupported { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Check if this error names something replication cannot express
    /// at the current privilege level (candidate for the skip policy)
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ReplikError::Unsupported { .. })
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ReplikError::Validation(_) | ReplikError::Config(_))
    }
}
