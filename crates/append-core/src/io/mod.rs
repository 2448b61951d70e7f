//! Append-handle acquisition
//!
//! - **Strategies**: native share-mode open (Windows) or portable `std::fs`
//!   open with advisory locking on Unix
//! - **Fallback**: native → portable inside the same attempt when the host
//!   refuses the native capability
//! - **Directory creation**: missing parents created once per attempt when
//!   the policy allows it
//! - **Retry**: jittered exponential backoff on sharing contention only
//!
//! # Example
//!
//! ```rust,no_run
//! use shared_append_core::{CreationPolicy, RetryingAcquirer};
//! use std::io::Write;
//! use std::path::Path;
//!
//! let mut acquirer = RetryingAcquirer::new(CreationPolicy::default()).unwrap();
//! let mut file = acquirer.acquire(Path::new("/var/log/app/app.log"), true).unwrap();
//! file.write_all(b"started\n").unwrap();
//! ```

pub mod acquire;
pub mod backoff;
pub mod error;
pub mod strategy;

pub use acquire::RetryingAcquirer;
pub use backoff::{Backoff, Jitter, ThreadRngJitter};
pub use error::{AcquireError, ErrorClass};
pub use strategy::{HandleOpener, OpenRequest, OsOpener, Strategy, StrategyError};
