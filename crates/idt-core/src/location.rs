//! Source positions and expansion-aware locations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A point in a source file. `line` and `column` are 1-based; `column`
/// counts bytes, matching compiler diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    JsonSchema,
)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub const fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Where a declaration is reported, after macro expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub position: Position,
    pub is_system_header: bool,
    pub is_macro_expansion: bool,
}

impl SourceLocation {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, position: Position) -> Self {
        Self {
            file: file.into(),
            position,
            is_system_header: false,
            is_macro_expansion: false,
        }
    }

    #[must_use]
    pub const fn in_system_header(mut self, is_system_header: bool) -> Self {
        self.is_system_header = is_system_header;
        self
    }

    #[must_use]
    pub const fn from_macro_expansion(mut self, is_macro_expansion: bool) -> Self {
        self.is_macro_expansion = is_macro_expansion;
        self
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub const fn line(&self) -> u32 {
        self.position.line
    }

    #[must_use]
    pub const fn column(&self) -> u32 {
        self.position.column
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file.display(),
            self.position.line,
            self.position.column
        )
    }
}
