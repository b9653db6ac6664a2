//! Parser error types for idt-parser.

use std::path::PathBuf;

/// Errors that can occur while loading, parsing, or extracting a
/// translation unit.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a C or C++ source file: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("{}:{line}:{column}: syntax error near '{snippet}'", file.display())]
    Syntax {
        file: PathBuf,
        line: u32,
        column: u32,
        snippet: String,
    },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] idt_core::CoreError),
}

impl ParserError {
    /// File and position for diagnostics, when the error has one.
    #[must_use]
    pub fn location(&self) -> Option<(&std::path::Path, u32, u32)> {
        match self {
            Self::Syntax {
                file, line, column, ..
            } => Some((file.as_path(), *line, *column)),
            Self::Io { path, .. } | Self::UnsupportedFile(path) => Some((path.as_path(), 1, 1)),
            Self::Extraction(_) => None,
        }
    }
}
