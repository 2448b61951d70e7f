//! CLI command dispatch and execution

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shared_append_core::CreationPolicy;
use shared_append_core::config::{PolicyOverrides, resolve_policy};
use std::path::PathBuf;

mod info;
mod write;

/// sappend - append to log files shared with other writers
#[derive(Parser, Debug)]
#[command(
    name = "sappend",
    version,
    about = "Append to log files shared with other writers",
    long_about = "Acquires an append handle with retry on sharing contention and writes lines to it"
)]
pub struct Cli {
    #[command(flatten)]
    policy: PolicyArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Policy flags shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// TOML file with a [policy] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Attempt budget on sharing contention
    #[arg(long, global = true)]
    attempts: Option<u32>,

    /// Initial backoff upper bound in milliseconds
    #[arg(long = "delay-ms", global = true)]
    delay_ms: Option<u64>,

    /// Fail instead of creating missing parent directories
    #[arg(long = "no-create-dirs", global = true)]
    no_create_dirs: bool,

    /// Never use the native open path
    #[arg(long = "force-managed", global = true)]
    force_managed: bool,

    /// Acquire and release a handle for every line
    #[arg(long = "no-keep-open", global = true)]
    no_keep_open: bool,

    /// Open without sharing write access with other writers
    #[arg(long, global = true)]
    exclusive: bool,
}

impl PolicyArgs {
    fn overrides(&self) -> PolicyOverrides {
        PolicyOverrides {
            concurrent_writes: self.exclusive.then_some(false),
            concurrent_write_attempts: self.attempts,
            concurrent_write_attempt_delay_ms: self.delay_ms,
            create_dirs: self.no_create_dirs.then_some(false),
            force_managed: self.force_managed.then_some(true),
            keep_file_open: self.no_keep_open.then_some(false),
        }
    }

    fn resolve(&self) -> Result<CreationPolicy> {
        resolve_policy(self.config.as_deref(), &self.overrides())
            .context("failed to resolve creation policy")
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append lines to a file
    Write(write::WriteArgs),

    /// Print timestamps and length of a file as JSON
    Info(info::InfoArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let policy = self.policy.resolve()?;
        match self.command {
            Commands::Write(args) => write::execute(args, policy),
            Commands::Info(args) => info::execute(args, policy),
        }
    }
}
