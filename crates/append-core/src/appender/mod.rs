//! File appenders
//!
//! An appender owns the path, its lifecycle timestamps and at most one live
//! handle. Two kinds exist:
//!
//! - [`SingleProcessAppender`]: acquires once, keeps the handle open and
//!   buffers writes.
//! - [`RetryingMultiProcessAppender`]: acquires a handle per write and
//!   releases it immediately, so independent processes interleave at record
//!   boundaries.
//!
//! Dropping an appender closes it exactly once.

mod lifecycle;
mod retrying;
mod single;

pub use lifecycle::AppenderLifecycle;
pub use retrying::RetryingMultiProcessAppender;
pub use single::SingleProcessAppender;

use crate::io::AcquireError;
use crate::policy::CreationPolicy;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// OS-reported facts about the file behind an appender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub creation_time: DateTime<Utc>,
    pub last_write_time: DateTime<Utc>,
    pub length: u64,
}

impl FileInfo {
    /// Creation time falls back to modification time where the filesystem
    /// does not record birth time.
    pub fn from_metadata(meta: &Metadata) -> std::io::Result<Self> {
        let modified: DateTime<Utc> = meta.modified()?.into();
        let created = meta.created().map(DateTime::<Utc>::from).unwrap_or(modified);
        Ok(Self {
            creation_time: created,
            last_write_time: modified,
            length: meta.len(),
        })
    }
}

/// Errors from appender operations
#[derive(Error, Debug)]
pub enum AppendError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Appender for {path} is closed")]
    Closed { path: PathBuf },
}

/// Capability every appender kind provides to the logging sink
pub trait FileAppender {
    fn lifecycle(&self) -> &AppenderLifecycle;

    fn lifecycle_mut(&mut self) -> &mut AppenderLifecycle;

    /// Append `bytes`, acquiring a handle first if none is held.
    fn write(&mut self, bytes: &[u8]) -> Result<(), AppendError>;

    fn flush(&mut self) -> Result<(), AppendError>;

    /// Release the handle. Idempotent.
    fn close(&mut self) -> Result<(), AppendError>;

    /// Query the OS for the file's timestamps and length.
    ///
    /// `None` when the query fails; callers use this for best-effort
    /// staleness checks.
    fn file_info(&self) -> Option<FileInfo>;

    fn path(&self) -> &Path {
        self.lifecycle().path()
    }

    fn open_time(&self) -> DateTime<Utc> {
        self.lifecycle().open_time()
    }

    fn last_write_time(&self) -> Option<DateTime<Utc>> {
        self.lifecycle().last_write_time()
    }

    fn touch(&mut self) {
        self.lifecycle_mut().touch();
    }

    fn touch_at(&mut self, timestamp: DateTime<Utc>) {
        self.lifecycle_mut().touch_at(timestamp);
    }
}

/// Which appender a policy calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppenderKind {
    SingleProcess,
    RetryingMultiProcess,
}

impl AppenderKind {
    pub fn for_policy(policy: &CreationPolicy) -> Self {
        if policy.concurrent_writes && !policy.keep_file_open {
            AppenderKind::RetryingMultiProcess
        } else {
            AppenderKind::SingleProcess
        }
    }
}

/// Build the appender the policy calls for. No handle is acquired yet.
pub fn open_appender(
    path: impl Into<PathBuf>,
    policy: CreationPolicy,
) -> Result<Box<dyn FileAppender + Send>, AcquireError> {
    let path = path.into();
    let appender: Box<dyn FileAppender + Send> = match AppenderKind::for_policy(&policy) {
        AppenderKind::SingleProcess => Box::new(SingleProcessAppender::new(path, policy)?),
        AppenderKind::RetryingMultiProcess => {
            Box::new(RetryingMultiProcessAppender::new(path, policy)?)
        }
    };
    Ok(appender)
}

fn query_file_info(path: &Path, meta: std::io::Result<Metadata>) -> Option<FileInfo> {
    match meta.and_then(|m| FileInfo::from_metadata(&m)) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "file info query failed");
            None
        }
    }
}
