//! Open/last-write timestamps of an appender

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Path and timestamps for one appender instance.
///
/// `open_time` is fixed at construction. `last_write_time` starts as `None`
/// (never written) and is advanced by [`touch`](Self::touch) or stamped with
/// an explicit value by [`touch_at`](Self::touch_at).
#[derive(Debug, Clone)]
pub struct AppenderLifecycle {
    path: PathBuf,
    open_time: DateTime<Utc>,
    last_write_time: Option<DateTime<Utc>>,
}

impl AppenderLifecycle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            open_time: Utc::now(),
            last_write_time: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open_time(&self) -> DateTime<Utc> {
        self.open_time
    }

    /// `None` until the first write
    pub fn last_write_time(&self) -> Option<DateTime<Utc>> {
        self.last_write_time
    }

    pub fn touch(&mut self) {
        self.last_write_time = Some(Utc::now());
    }

    /// Stamp an externally observed write time. No monotonicity check.
    pub fn touch_at(&mut self, timestamp: DateTime<Utc>) {
        self.last_write_time = Some(timestamp);
    }
}
