use clap::ValueEnum;

/// How the report is printed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Compiler-style diagnostic lines
    #[default]
    Text,
    /// One JSON document
    Json,
}
