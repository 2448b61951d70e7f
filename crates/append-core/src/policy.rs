//! Creation policy consumed by every acquisition step

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_ATTEMPTS: u32 = 10;
const DEFAULT_ATTEMPT_DELAY_MS: u64 = 1;
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// Platform file attribute bits, handed verbatim to the native open call.
///
/// On Windows these are `FILE_ATTRIBUTE_*` / `FILE_FLAG_*` values. Other
/// platforms carry them around without interpreting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileAttributes(pub u32);

impl FileAttributes {
    /// `FILE_ATTRIBUTE_NORMAL`
    pub const NORMAL: FileAttributes = FileAttributes(0x80);

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl Default for FileAttributes {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Rejected policy values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("concurrent_write_attempts must be at least 1")]
    ZeroAttempts,

    #[error("buffer_size_bytes must be greater than 0")]
    ZeroBufferSize,
}

/// How a file appender is allowed to open and share its target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreationPolicy {
    /// Other writers may contend for the path; gates retry on contention
    pub concurrent_writes: bool,
    /// Attempt budget for one acquisition
    pub concurrent_write_attempts: u32,
    /// Initial backoff upper bound in milliseconds
    pub concurrent_write_attempt_delay_ms: u64,
    /// Create missing parent directories
    pub create_dirs: bool,
    /// Let other writers delete or rename the path while it is open
    pub enable_file_delete: bool,
    /// Never use the native strategy
    pub force_managed: bool,
    pub buffer_size_bytes: usize,
    pub file_attributes: FileAttributes,
    /// Keep the handle open between writes. When false and
    /// `concurrent_writes` is set, a handle is acquired per write.
    pub keep_file_open: bool,
}

impl Default for CreationPolicy {
    fn default() -> Self {
        Self {
            concurrent_writes: true,
            concurrent_write_attempts: DEFAULT_ATTEMPTS,
            concurrent_write_attempt_delay_ms: DEFAULT_ATTEMPT_DELAY_MS,
            create_dirs: true,
            enable_file_delete: true,
            force_managed: false,
            buffer_size_bytes: DEFAULT_BUFFER_SIZE,
            file_attributes: FileAttributes::NORMAL,
            keep_file_open: true,
        }
    }
}

impl CreationPolicy {
    /// Check the numeric invariants the acquirer relies on.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.concurrent_write_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if self.buffer_size_bytes == 0 {
            return Err(PolicyError::ZeroBufferSize);
        }
        Ok(())
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.concurrent_write_attempt_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = CreationPolicy::default();
        assert!(policy.validate().is_ok());
        assert!(policy.concurrent_writes);
        assert_eq!(policy.concurrent_write_attempts, 10);
        assert_eq!(policy.file_attributes, FileAttributes::NORMAL);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let policy = CreationPolicy {
            concurrent_write_attempts: 0,
            ..Default::default()
        };
        assert_eq!(policy.validate(), Err(PolicyError::ZeroAttempts));
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let policy = CreationPolicy {
            buffer_size_bytes: 0,
            ..Default::default()
        };
        assert_eq!(policy.validate(), Err(PolicyError::ZeroBufferSize));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let policy: CreationPolicy = toml::from_str(
            r#"
            concurrent_write_attempts = 3
            force_managed = true
            file_attributes = 2
            "#,
        )
        .unwrap();
        assert_eq!(policy.concurrent_write_attempts, 3);
        assert!(policy.force_managed);
        assert_eq!(policy.file_attributes.bits(), 2);
        assert!(policy.create_dirs);
        assert_eq!(policy.buffer_size_bytes, 32 * 1024);
    }

    #[test]
    fn test_initial_backoff() {
        let policy = CreationPolicy {
            concurrent_write_attempt_delay_ms: 25,
            ..Default::default()
        };
        assert_eq!(policy.initial_backoff(), Duration::from_millis(25));
    }
}
