//! Policy resolution
//!
//! Resolves a [`CreationPolicy`] from multiple sources with priority:
//! 1. Explicit overrides (command-line flags)
//! 2. Environment variables (`SAPPEND_*`)
//! 3. Policy file (`[policy]` table of a TOML document)
//! 4. Defaults

use crate::policy::{CreationPolicy, PolicyError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parsing error in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid policy: {0}")]
    Invalid(#[from] PolicyError),
}

/// Explicit overrides, highest priority
#[derive(Debug, Default, Clone)]
pub struct PolicyOverrides {
    pub concurrent_writes: Option<bool>,
    pub concurrent_write_attempts: Option<u32>,
    pub concurrent_write_attempt_delay_ms: Option<u64>,
    pub create_dirs: Option<bool>,
    pub force_managed: Option<bool>,
    pub keep_file_open: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policy: CreationPolicy,
}

/// Load a policy from the `[policy]` table of a TOML file.
///
/// A file without a `[policy]` table yields the default policy.
pub fn load_policy(path: &Path) -> Result<CreationPolicy, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: PolicyFile = toml::from_str(&contents).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(file.policy)
}

/// Resolve and validate the effective policy.
pub fn resolve_policy(
    policy_file: Option<&Path>,
    overrides: &PolicyOverrides,
) -> Result<CreationPolicy, ConfigError> {
    let mut policy = match policy_file {
        Some(path) => load_policy(path)?,
        None => CreationPolicy::default(),
    };

    apply_env_overrides(&mut policy);
    apply_overrides(&mut policy, overrides);

    policy.validate()?;
    Ok(policy)
}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

fn env_bool(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(var = name, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

fn apply_env_overrides(policy: &mut CreationPolicy) {
    if let Some(v) = env_bool("SAPPEND_CONCURRENT_WRITES") {
        policy.concurrent_writes = v;
    }
    if let Some(v) = env_value::<u32>("SAPPEND_ATTEMPTS") {
        policy.concurrent_write_attempts = v;
    }
    if let Some(v) = env_value::<u64>("SAPPEND_ATTEMPT_DELAY_MS") {
        policy.concurrent_write_attempt_delay_ms = v;
    }
    if let Some(v) = env_bool("SAPPEND_CREATE_DIRS") {
        policy.create_dirs = v;
    }
    if let Some(v) = env_bool("SAPPEND_ENABLE_FILE_DELETE") {
        policy.enable_file_delete = v;
    }
    if let Some(v) = env_bool("SAPPEND_FORCE_MANAGED") {
        policy.force_managed = v;
    }
    if let Some(v) = env_value::<usize>("SAPPEND_BUFFER_SIZE") {
        policy.buffer_size_bytes = v;
    }
    if let Some(v) = env_bool("SAPPEND_KEEP_FILE_OPEN") {
        policy.keep_file_open = v;
    }
}

fn apply_overrides(policy: &mut CreationPolicy, overrides: &PolicyOverrides) {
    if let Some(v) = overrides.concurrent_writes {
        policy.concurrent_writes = v;
    }
    if let Some(v) = overrides.concurrent_write_attempts {
        policy.concurrent_write_attempts = v;
    }
    if let Some(v) = overrides.concurrent_write_attempt_delay_ms {
        policy.concurrent_write_attempt_delay_ms = v;
    }
    if let Some(v) = overrides.create_dirs {
        policy.create_dirs = v;
    }
    if let Some(v) = overrides.force_managed {
        policy.force_managed = v;
    }
    if let Some(v) = overrides.keep_file_open {
        policy.keep_file_open = v;
    }
}
