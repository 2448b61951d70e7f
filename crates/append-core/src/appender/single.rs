//! Appender that keeps its handle open between writes

use super::{AppendError, AppenderLifecycle, FileAppender, FileInfo, query_file_info};
use crate::io::{AcquireError, HandleOpener, Jitter, OsOpener, RetryingAcquirer, ThreadRngJitter};
use crate::policy::CreationPolicy;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Holds one buffered handle from the first write until close.
///
/// Shared writing is requested only when the policy expects concurrent
/// writers.
#[derive(Debug)]
pub struct SingleProcessAppender<O: HandleOpener = OsOpener, J: Jitter = ThreadRngJitter> {
    lifecycle: AppenderLifecycle,
    acquirer: RetryingAcquirer<O, J>,
    writer: Option<BufWriter<File>>,
    closed: bool,
}

impl SingleProcessAppender {
    pub fn new(path: impl Into<PathBuf>, policy: CreationPolicy) -> Result<Self, AcquireError> {
        Ok(Self::with_acquirer(path, RetryingAcquirer::new(policy)?))
    }
}

impl<O: HandleOpener, J: Jitter> SingleProcessAppender<O, J> {
    pub fn with_acquirer(path: impl Into<PathBuf>, acquirer: RetryingAcquirer<O, J>) -> Self {
        Self {
            lifecycle: AppenderLifecycle::new(path),
            acquirer,
            writer: None,
            closed: false,
        }
    }

    /// Whether a handle is currently held
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn io_error(&self, source: std::io::Error) -> AppendError {
        AppendError::Io {
            path: self.lifecycle.path().to_path_buf(),
            source,
        }
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, AppendError> {
        if self.closed {
            return Err(AppendError::Closed {
                path: self.lifecycle.path().to_path_buf(),
            });
        }
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                let shared = self.acquirer.policy().concurrent_writes;
                let capacity = self.acquirer.policy().buffer_size_bytes;
                let file = self.acquirer.acquire(self.lifecycle.path(), shared)?;
                BufWriter::with_capacity(capacity, file)
            }
        };
        Ok(self.writer.insert(writer))
    }
}

impl<O: HandleOpener, J: Jitter> FileAppender for SingleProcessAppender<O, J> {
    fn lifecycle(&self) -> &AppenderLifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut AppenderLifecycle {
        &mut self.lifecycle
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), AppendError> {
        let result = self.writer()?.write_all(bytes);
        if let Err(e) = result {
            // drop the handle; the next write re-acquires
            self.writer = None;
            return Err(self.io_error(e));
        }
        self.lifecycle.touch();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AppendError> {
        let result = match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        };
        result.map_err(|e| self.io_error(e))
    }

    fn close(&mut self) -> Result<(), AppendError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        let result = writer.flush();
        drop(writer);
        result.map_err(|e| self.io_error(e))
    }

    fn file_info(&self) -> Option<FileInfo> {
        let meta = match self.writer.as_ref() {
            Some(writer) => writer.get_ref().metadata(),
            None => std::fs::metadata(self.lifecycle.path()),
        };
        query_file_info(self.lifecycle.path(), meta)
    }
}

impl<O: HandleOpener, J: Jitter> Drop for SingleProcessAppender<O, J> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(path = %self.lifecycle.path().display(), error = %e, "close on drop failed");
        }
    }
}
