//! Retrying handle acquisition
//!
//! One attempt walks the strategy chain: native first when eligible, portable
//! when native is ineligible or reports itself unavailable. A missing parent
//! directory is created (policy permitting) and the same strategy is tried
//! once more inside the same attempt. Only sharing contention consumes the
//! attempt budget, with a jittered, doubling sleep between attempts.

use crate::io::backoff::{Backoff, Jitter, ThreadRngJitter};
use crate::io::error::AcquireError;
use crate::io::strategy::{HandleOpener, OpenRequest, OsOpener, Strategy, StrategyError};
use crate::platform::PlatformKind;
use crate::policy::CreationPolicy;
use crate::sharing::{self, SharingDescriptor};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

#[cfg(windows)]
const ERROR_SHARING_VIOLATION: i32 = 32;
#[cfg(windows)]
const ERROR_LOCK_VIOLATION: i32 = 33;

/// Acquires append handles for one policy.
///
/// Not meant to be shared between threads mid-acquisition; each appender
/// owns its own acquirer.
#[derive(Debug)]
pub struct RetryingAcquirer<O = OsOpener, J = ThreadRngJitter> {
    policy: CreationPolicy,
    platform: PlatformKind,
    opener: O,
    jitter: J,
}

impl RetryingAcquirer {
    /// Acquirer for the current platform with OS opens and thread-RNG jitter.
    pub fn new(policy: CreationPolicy) -> Result<Self, AcquireError> {
        Self::with_parts(policy, PlatformKind::detect(), OsOpener, ThreadRngJitter)
    }
}

impl<O: HandleOpener, J: Jitter> RetryingAcquirer<O, J> {
    pub fn with_parts(
        policy: CreationPolicy,
        platform: PlatformKind,
        opener: O,
        jitter: J,
    ) -> Result<Self, AcquireError> {
        policy.validate()?;
        Ok(Self {
            policy,
            platform,
            opener,
            jitter,
        })
    }

    pub fn policy(&self) -> &CreationPolicy {
        &self.policy
    }

    pub fn platform(&self) -> PlatformKind {
        self.platform
    }

    /// Sharing descriptor this acquirer would request
    pub fn sharing(&self, allow_shared_writing: bool) -> SharingDescriptor {
        sharing::resolve(
            allow_shared_writing,
            self.policy.enable_file_delete,
            self.platform,
        )
    }

    /// Open `path` for appending.
    ///
    /// Blocks the calling thread for the backoff sleeps. Returns the first
    /// handle obtained or the first terminal error.
    pub fn acquire(&mut self, path: &Path, allow_shared_writing: bool) -> Result<File, AcquireError> {
        let request = OpenRequest {
            path,
            sharing: self.sharing(allow_shared_writing),
            policy: &self.policy,
        };
        let budget = self.policy.concurrent_write_attempts;
        let mut backoff = Backoff::new(self.policy.initial_backoff(), &mut self.jitter);
        let mut attempt: u32 = 1;

        loop {
            let source = match attempt_once(&self.opener, self.platform, &request) {
                Ok(file) => {
                    debug!(path = %path.display(), attempt, "acquired append handle");
                    return Ok(file);
                }
                Err(AttemptFailure::Terminal(err)) => return Err(err),
                Err(AttemptFailure::Contention(source)) => source,
            };

            if !request.policy.concurrent_writes || attempt >= budget {
                return Err(AcquireError::SharingContention {
                    path: path.to_path_buf(),
                    attempts: attempt,
                    source,
                });
            }

            let delay = backoff.next_delay();
            warn!(
                path = %path.display(),
                attempt,
                budget,
                delay_ms = delay.as_millis() as u64,
                error = %source,
                "file held by another writer, backing off"
            );
            std::thread::sleep(delay);
            attempt += 1;
        }
    }
}

enum AttemptFailure {
    Contention(std::io::Error),
    Terminal(AcquireError),
}

fn attempt_once<O: HandleOpener>(
    opener: &O,
    platform: PlatformKind,
    request: &OpenRequest<'_>,
) -> Result<File, AttemptFailure> {
    if Strategy::Native.is_eligible(platform, request.policy) {
        match open_creating_dirs(opener, Strategy::Native, request) {
            Err(StrategyError::Unavailable { reason, .. }) => {
                debug!(
                    path = %request.path.display(),
                    reason = %reason,
                    "native open unavailable, falling back to portable"
                );
            }
            other => return other.map_err(|e| classify(request.path, e)),
        }
    }

    open_creating_dirs(opener, Strategy::Portable, request).map_err(|e| classify(request.path, e))
}

/// Run one strategy, creating the parent chain and retrying once on
/// `NotFound` when the policy allows creating it.
///
/// Existence of the parent is not checked here, since another writer may
/// create it concurrently. `create_dir_all` is a no-op on an existing chain.
fn open_creating_dirs<O: HandleOpener>(
    opener: &O,
    strategy: Strategy,
    request: &OpenRequest<'_>,
) -> Result<File, StrategyError> {
    match opener.open(strategy, request) {
        Err(StrategyError::Io(e)) if request.policy.create_dirs && e.kind() == ErrorKind::NotFound => {
            let Some(parent) = non_empty_parent(request.path) else {
                return Err(StrategyError::Io(e));
            };
            info!(dir = %parent.display(), "creating missing log directory");
            fs::create_dir_all(parent)?;
            opener.open(strategy, request)
        }
        other => other,
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn classify(path: &Path, err: StrategyError) -> AttemptFailure {
    let source = match err {
        StrategyError::Io(source) => source,
        StrategyError::Unavailable { strategy, reason } => {
            return AttemptFailure::Terminal(AcquireError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    ErrorKind::Unsupported,
                    format!("{strategy} open unavailable: {reason}"),
                ),
            });
        }
    };

    if is_contention(&source) {
        AttemptFailure::Contention(source)
    } else if is_parent_missing(path, &source) {
        AttemptFailure::Terminal(AcquireError::ParentDirectoryMissing {
            path: path.to_path_buf(),
            source,
        })
    } else {
        AttemptFailure::Terminal(AcquireError::terminal(path, source))
    }
}

fn is_parent_missing(path: &Path, err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::NotFound && non_empty_parent(path).is_some_and(|p| !p.exists())
}

fn is_contention(err: &std::io::Error) -> bool {
    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::ResourceBusy) {
        return true;
    }
    #[cfg(windows)]
    {
        if matches!(
            err.raw_os_error(),
            Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION)
        ) {
            return true;
        }
    }
    false
}
