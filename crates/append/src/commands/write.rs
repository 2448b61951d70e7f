//! Write command: append lines to a shared file

use anyhow::{Context, Result};
use clap::Args;
use shared_append_core::{CreationPolicy, open_appender};
use std::io::BufRead;
use std::path::PathBuf;

/// Arguments for `sappend write`
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Target file
    pub path: PathBuf,

    /// Line to append (repeatable). Reads stdin when omitted.
    #[arg(short, long = "message")]
    pub messages: Vec<String>,
}

pub fn execute(args: WriteArgs, policy: CreationPolicy) -> Result<()> {
    let mut appender = open_appender(&args.path, policy)
        .with_context(|| format!("cannot prepare appender for {}", args.path.display()))?;

    let mut written = 0usize;
    let mut append_line = |line: &str| -> Result<()> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        appender
            .write(record.as_bytes())
            .with_context(|| format!("write to {} failed", args.path.display()))?;
        written += 1;
        Ok(())
    };

    if args.messages.is_empty() {
        for line in std::io::stdin().lock().lines() {
            append_line(&line.context("failed to read stdin")?)?;
        }
    } else {
        for message in &args.messages {
            append_line(message)?;
        }
    }

    appender
        .close()
        .with_context(|| format!("close of {} failed", args.path.display()))?;
    tracing::debug!(path = %args.path.display(), lines = written, "write finished");
    println!("wrote {written} line(s) to {}", args.path.display());
    Ok(())
}
