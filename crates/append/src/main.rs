//! sappend - append to log files shared with other writers
//!
//! A thin CLI over `shared-append-core`, handy for exercising several
//! writers against one file from separate processes.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    shared_append_core::logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
