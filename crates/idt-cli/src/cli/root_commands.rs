use std::path::PathBuf;

use clap::{ArgAction, Args, Subcommand};

use super::OutputFormat;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report public declarations missing the export annotation
    Check(CheckArgs),
    /// Print the JSON schema of the `--format json` report
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct CheckArgs {
    /// Translation units to audit (sources or headers)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// The macro to decorate interfaces with
    #[arg(long, value_name = "MACRO")]
    pub export_macro: Option<String>,

    /// Apply suggested changes to decorate interfaces
    #[arg(long)]
    pub apply_fixits: bool,

    /// Overwrite the original files instead of writing `<file>.fixed`
    #[arg(long)]
    pub inplace: bool,

    /// Report only; never suggest or apply changes
    #[arg(long)]
    pub report_only: bool,

    /// Annotate classes rather than their individual methods
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub annotate_classes: Option<bool>,

    /// Ignore one or more functions (repeatable, comma-separated)
    #[arg(long, value_name = "NAME[,NAME...]")]
    pub ignore: Vec<String>,

    /// Do not ignore the built-in compiler intrinsics
    #[arg(long)]
    pub no_default_ignores: bool,

    /// Add a directory to the quoted include search path
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// Add a system include directory; declarations found there are skipped
    #[arg(long = "isystem", value_name = "DIR")]
    pub system_include_dirs: Vec<PathBuf>,

    /// Glob for library-internal files (repeatable, replaces the defaults)
    #[arg(long = "internal-path", value_name = "GLOB")]
    pub internal_paths: Vec<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Project root holding `.idt/config.toml` (defaults to the working directory)
    #[arg(long, value_name = "DIR")]
    pub project: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Print on one line
    #[arg(long)]
    pub compact: bool,
}
