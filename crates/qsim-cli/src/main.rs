//! # qsim-cli
//!
//! The main entry point for the `qsim` binary. It parses command-line
//! arguments, initializes logging, and dispatches to the appropriate
//! subcommand handler.

#![forbid(unsafe_code)]

use crate::args::{Cli, Command, LogFormat};
use anyhow::Result;
use clap::Parser;

mod args;
mod commands;
mod logging;
mod wiring;

fn main() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.log);

    match args.command {
        Command::Run(opts) => commands::run::exec(opts, args.log == LogFormat::Json),
        Command::Validate { config } => commands::validate::exec(config),
    }
}
