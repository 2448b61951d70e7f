//! Info command: report what the OS knows about a file

use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;
use shared_append_core::{CreationPolicy, open_appender};
use std::path::PathBuf;

/// Arguments for `sappend info`
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// File to inspect
    pub path: PathBuf,
}

pub fn execute(args: InfoArgs, policy: CreationPolicy) -> Result<()> {
    let appender = open_appender(&args.path, policy)?;
    let Some(info) = appender.file_info() else {
        bail!("cannot query file info for {}", args.path.display());
    };

    let out = json!({
        "path": args.path.display().to_string(),
        "creation_time": info.creation_time.to_rfc3339(),
        "last_write_time": info.last_write_time.to_rfc3339(),
        "length": info.length,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
