//! Appender that acquires a handle for every write

use super::{AppendError, AppenderLifecycle, FileAppender, FileInfo, query_file_info};
use crate::io::{AcquireError, HandleOpener, Jitter, OsOpener, RetryingAcquirer, ThreadRngJitter};
use crate::policy::CreationPolicy;
use std::io::Write;
use std::path::PathBuf;

/// Opens, writes one record and releases, on every call to `write`.
///
/// Each record goes out in a single `write_all` on an append-mode handle, so
/// records from different processes never interleave mid-record. Always
/// requests shared writing.
#[derive(Debug)]
pub struct RetryingMultiProcessAppender<O: HandleOpener = OsOpener, J: Jitter = ThreadRngJitter> {
    lifecycle: AppenderLifecycle,
    acquirer: RetryingAcquirer<O, J>,
    closed: bool,
}

impl RetryingMultiProcessAppender {
    pub fn new(path: impl Into<PathBuf>, policy: CreationPolicy) -> Result<Self, AcquireError> {
        Ok(Self::with_acquirer(path, RetryingAcquirer::new(policy)?))
    }
}

impl<O: HandleOpener, J: Jitter> RetryingMultiProcessAppender<O, J> {
    pub fn with_acquirer(path: impl Into<PathBuf>, acquirer: RetryingAcquirer<O, J>) -> Self {
        Self {
            lifecycle: AppenderLifecycle::new(path),
            acquirer,
            closed: false,
        }
    }
}

impl<O: HandleOpener, J: Jitter> FileAppender for RetryingMultiProcessAppender<O, J> {
    fn lifecycle(&self) -> &AppenderLifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut AppenderLifecycle {
        &mut self.lifecycle
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), AppendError> {
        if self.closed {
            return Err(AppendError::Closed {
                path: self.lifecycle.path().to_path_buf(),
            });
        }
        let mut file = self.acquirer.acquire(self.lifecycle.path(), true)?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|source| AppendError::Io {
                path: self.lifecycle.path().to_path_buf(),
                source,
            })?;
        drop(file);
        self.lifecycle.touch();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AppendError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), AppendError> {
        self.closed = true;
        Ok(())
    }

    fn file_info(&self) -> Option<FileInfo> {
        let path = self.lifecycle.path();
        query_file_info(path, std::fs::metadata(path))
    }
}
