//! Platform detection

use serde::{Deserialize, Serialize};

/// Operating system family, as far as file sharing semantics are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformKind {
    /// Windows: sharing modes are enforced by the kernel at open time
    Windows,
    /// Linux, macOS, BSDs: no open-time sharing modes, deletes always allowed
    UnixLike,
    /// Anything else (wasm, embedded targets)
    Other,
}

impl PlatformKind {
    /// Detect the current platform
    pub fn detect() -> Self {
        Self::from_family(std::env::consts::FAMILY)
    }

    fn from_family(family: &str) -> Self {
        match family {
            "windows" => PlatformKind::Windows,
            "unix" => PlatformKind::UnixLike,
            other => {
                tracing::warn!(family = other, "unknown OS family, treating as Other");
                PlatformKind::Other
            }
        }
    }

    /// Whether the platform exposes a native open call with share-mode flags
    pub fn has_native_file_api(self) -> bool {
        matches!(self, PlatformKind::Windows)
    }
}
