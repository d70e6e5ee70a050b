mod args;
mod classify;
mod collect;
mod datetime;
mod error;
mod execute;
mod extract;
mod grid;
mod layout;
mod message_id;
mod place;
mod report;
mod state;

use args::{Args, Command};
use clap::Parser;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    init_logging(args.quiet);
    if let Err(e) = do_main(&args) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn do_main(args: &Args) -> anyhow::Result<()> {
    match &args.command {
        Command::Collect(collect) => execute::run_collect(collect, args.quiet),
        Command::Write(write) => execute::run_write(write),
    }
}
