//! Error types for handle acquisition

use crate::policy::PolicyError;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse class of an [`AcquireError`], for callers that branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    ParentDirectoryMissing,
    SharingContention,
    PermissionDenied,
    Io,
    InvalidPolicy,
}

/// Terminal failure of an acquisition.
///
/// Every filesystem variant keeps the original `std::io::Error` as its
/// source.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Parent directory does not exist and could not or may not be created
    #[error("Parent directory of {path} does not exist: {source}")]
    ParentDirectoryMissing {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Another writer holds the file in an incompatible sharing mode
    #[error("{path} is locked by another writer after {attempts} attempt(s): {source}")]
    SharingContention {
        path: PathBuf,
        attempts: u32,
        source: std::io::Error,
    },

    /// Filesystem refused access
    #[error("Permission denied on {path}: {source}")]
    PermissionDenied {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Any other I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Policy failed validation before any attempt was made
    #[error("Invalid creation policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}

impl AcquireError {
    /// Wrap a non-retryable I/O error, splitting out permission denials.
    pub(crate) fn terminal(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            AcquireError::PermissionDenied { path, source }
        } else {
            AcquireError::Io { path, source }
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AcquireError::ParentDirectoryMissing { .. } => ErrorClass::ParentDirectoryMissing,
            AcquireError::SharingContention { .. } => ErrorClass::SharingContention,
            AcquireError::PermissionDenied { .. } => ErrorClass::PermissionDenied,
            AcquireError::Io { .. } => ErrorClass::Io,
            AcquireError::InvalidPolicy(_) => ErrorClass::InvalidPolicy,
        }
    }

    /// The underlying OS error, when there is one
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            AcquireError::ParentDirectoryMissing { source, .. }
            | AcquireError::SharingContention { source, .. }
            | AcquireError::PermissionDenied { source, .. }
            | AcquireError::Io { source, .. } => Some(source),
            AcquireError::InvalidPolicy(_) => None,
        }
    }
}

impl From<AcquireError> for std::io::Error {
    fn from(err: AcquireError) -> Self {
        let kind = match err.io_error() {
            Some(source) => source.kind(),
            None => std::io::ErrorKind::InvalidInput,
        };
        std::io::Error::new(kind, err)
    }
}
