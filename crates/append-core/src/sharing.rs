//! Sharing mode resolution
//!
//! A [`SharingDescriptor`] lists what *other* openers of the same path may do
//! while our handle is open.

use crate::platform::PlatformKind;

/// Permissions granted to concurrent openers of the same path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SharingDescriptor {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl SharingDescriptor {
    /// Map the descriptor onto Win32 `FILE_SHARE_*` bits.
    pub fn to_share_mode(self) -> u32 {
        const FILE_SHARE_READ: u32 = 0x1;
        const FILE_SHARE_WRITE: u32 = 0x2;
        const FILE_SHARE_DELETE: u32 = 0x4;

        let mut mode = 0;
        if self.read {
            mode |= FILE_SHARE_READ;
        }
        if self.write {
            mode |= FILE_SHARE_WRITE;
        }
        if self.delete {
            mode |= FILE_SHARE_DELETE;
        }
        mode
    }

    /// Same descriptor with the delete bit set.
    pub fn with_delete(self) -> Self {
        Self {
            delete: true,
            ..self
        }
    }
}

/// Resolve the sharing descriptor for an open.
///
/// Readers are always admitted. On Windows the delete bit stays clear here:
/// delete sharing there is granted only by the native strategy's own flag,
/// never by the portable open.
pub fn resolve(
    allow_shared_writing: bool,
    enable_file_delete: bool,
    platform: PlatformKind,
) -> SharingDescriptor {
    SharingDescriptor {
        read: true,
        write: allow_shared_writing,
        delete: enable_file_delete && platform != PlatformKind::Windows,
    }
}
