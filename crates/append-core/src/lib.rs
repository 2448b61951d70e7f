//! Core library for shared-append: append handles to log files that other
//! threads, processes or hosts may be writing at the same time.
//!
//! The crate answers one question: given a path and a [`CreationPolicy`],
//! produce an open, writable, end-of-file positioned handle. Along the way it
//! has to:
//! - Pick between the platform's native open (fine-grained sharing control)
//!   and the portable `std::fs` open
//! - Create missing parent directories when the policy allows it
//! - Retry with jittered exponential backoff while another writer holds the
//!   file in an incompatible sharing mode
//!
//! What gets written, when files rotate and how records are encoded are
//! decided by the caller.

pub mod appender;
pub mod config;
pub mod io;
pub mod logging;
pub mod platform;
pub mod policy;
pub mod sharing;

pub use appender::{AppenderKind, FileAppender, FileInfo, open_appender};
pub use io::{AcquireError, RetryingAcquirer};
pub use platform::PlatformKind;
pub use policy::{CreationPolicy, FileAttributes};
pub use sharing::SharingDescriptor;
