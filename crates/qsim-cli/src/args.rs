//! # qsim-cli::args
//!
//! Defines the command-line argument structure using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "human")]
    pub log: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation from a configuration file.
    Run(RunOpts),
    /// Validate a configuration file for correctness without running it.
    Validate {
        #[arg(value_name = "CONFIG_PATH")]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunOpts {
    /// Path to the configuration file (YAML or TOML).
    #[arg(short, long, value_name = "CONFIG_PATH")]
    pub config: PathBuf,

    /// Override the base RNG seed from the configuration file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the replication count from the configuration file.
    #[arg(long)]
    pub batch_count: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}
