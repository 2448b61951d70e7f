//! Handle acquisition strategies
//!
//! - **Native**: the platform's own open call with explicit share-mode and
//!   attribute flags. Only Windows has one; elsewhere it reports itself
//!   unavailable.
//! - **Portable**: `std::fs` append-mode open. On Windows the coarse
//!   read/write sharing bits go through `share_mode`; on Unix, where `open`
//!   has no sharing modes, the write bit is emulated with an advisory
//!   `flock` held for the life of the handle.

use crate::platform::PlatformKind;
use crate::policy::CreationPolicy;
use crate::sharing::SharingDescriptor;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

/// Which open path produced (or failed to produce) a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Native,
    Portable,
}

impl Strategy {
    /// Whether this strategy may be tried at all for the given host and policy
    pub fn is_eligible(self, platform: PlatformKind, policy: &CreationPolicy) -> bool {
        match self {
            Strategy::Native => platform.has_native_file_api() && !policy.force_managed,
            Strategy::Portable => true,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Native => f.write_str("native"),
            Strategy::Portable => f.write_str("portable"),
        }
    }
}

/// Failure of a single strategy invocation
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The host refuses the capability itself; the caller should fall back
    #[error("{strategy} open unavailable: {reason}")]
    Unavailable { strategy: Strategy, reason: String },

    /// The open call ran and failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Everything a strategy needs to open one path
#[derive(Debug, Clone, Copy)]
pub struct OpenRequest<'a> {
    pub path: &'a Path,
    pub sharing: SharingDescriptor,
    pub policy: &'a CreationPolicy,
}

/// Seam between the acquirer and the operating system.
pub trait HandleOpener {
    fn open(&self, strategy: Strategy, request: &OpenRequest<'_>) -> Result<File, StrategyError>;
}

/// Opens real files through the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct OsOpener;

impl HandleOpener for OsOpener {
    fn open(&self, strategy: Strategy, request: &OpenRequest<'_>) -> Result<File, StrategyError> {
        match strategy {
            Strategy::Native => open_native(request),
            Strategy::Portable => open_portable(request),
        }
    }
}

#[cfg(windows)]
fn open_native(request: &OpenRequest<'_>) -> Result<File, StrategyError> {
    use std::io::{Seek, SeekFrom};
    use std::os::windows::fs::OpenOptionsExt;

    let sharing = if request.policy.enable_file_delete {
        request.sharing.with_delete()
    } else {
        request.sharing
    };

    // append + create without truncate = OPEN_ALWAYS with FILE_APPEND_DATA
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .share_mode(sharing.to_share_mode())
        .attributes(request.policy.file_attributes.bits())
        .open(request.path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::Unsupported => StrategyError::Unavailable {
                strategy: Strategy::Native,
                reason: e.to_string(),
            },
            _ => StrategyError::Io(e),
        })?;
    file.seek(SeekFrom::End(0))?;
    Ok(file)
}

#[cfg(not(windows))]
fn open_native(_request: &OpenRequest<'_>) -> Result<File, StrategyError> {
    Err(StrategyError::Unavailable {
        strategy: Strategy::Native,
        reason: "no share-mode open call on this host".to_string(),
    })
}

fn open_portable(request: &OpenRequest<'_>) -> Result<File, StrategyError> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    apply_share_mode(&mut options, request.sharing);

    let file = options.open(request.path)?;
    advise_sharing(&file, request.sharing)?;
    Ok(file)
}

#[cfg(windows)]
fn apply_share_mode(options: &mut OpenOptions, sharing: SharingDescriptor) {
    use std::os::windows::fs::OpenOptionsExt;
    options.share_mode(sharing.to_share_mode());
}

#[cfg(not(windows))]
fn apply_share_mode(_options: &mut OpenOptions, _sharing: SharingDescriptor) {}

#[cfg(unix)]
fn advise_sharing(file: &File, sharing: SharingDescriptor) -> std::io::Result<()> {
    use fs2::FileExt;

    // Fully qualified: std::fs::File has inherent lock methods of the same name.
    if sharing.write {
        FileExt::try_lock_shared(file)
    } else {
        FileExt::try_lock_exclusive(file)
    }
}

#[cfg(not(unix))]
fn advise_sharing(_file: &File, _sharing: SharingDescriptor) -> std::io::Result<()> {
    Ok(())
}
