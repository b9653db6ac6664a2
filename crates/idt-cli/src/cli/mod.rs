use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::OutputFormat;
pub use root_commands::{CheckArgs, Commands, SchemaArgs};

/// Top-level CLI parser for the `idt` binary.
#[derive(Debug, Parser)]
#[command(
    name = "idt",
    version,
    about = "Interface definition tool - finds C/C++ declarations missing an export annotation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
