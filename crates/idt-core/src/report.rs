//! Records handed to the reporting sink and emitted by `--format json`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Remark,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remark => "remark",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RemarkKind {
    UnexportedPublicInterface,
    ExportedPrivateInterface,
    ParseError,
}

impl RemarkKind {
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnexportedPublicInterface | Self::ExportedPrivateInterface => Severity::Remark,
            Self::ParseError => Severity::Error,
        }
    }
}

/// A suggested insertion, in both byte and line/column form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FixIt {
    pub file: PathBuf,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
    pub text: String,
}

impl FixIt {
    /// Clang's `-fdiagnostics-parseable-fixits` form.
    #[must_use]
    pub fn render_parseable(&self) -> String {
        format!(
            "fix-it:\"{}\":{{{}:{}-{}:{}}}:\"{}\"",
            self.file.display(),
            self.line,
            self.column,
            self.line,
            self.column,
            escape(&self.text)
        )
    }
}

/// One diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Remark {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub severity: Severity,
    pub kind: RemarkKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixit: Option<FixIt>,
}

impl Remark {
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            RemarkKind::UnexportedPublicInterface => {
                format!("unexported public interface '{}'", self.name)
            }
            RemarkKind::ExportedPrivateInterface => {
                format!("exported private interface '{}'", self.name)
            }
            RemarkKind::ParseError => format!("unable to parse '{}'", self.name),
        }
    }

    /// `<file>:<line>:<col>: <severity>: <message>`
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "{}:{}:{}: {}: {}",
            self.file.display(),
            self.line,
            self.column,
            self.severity.as_str(),
            self.message()
        );
        out
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub translation_units: usize,
    pub parse_failures: usize,
    pub remarks: Vec<Remark>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewritten_files: Vec<PathBuf>,
}

impl Report {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.parse_failures == 0
    }

    #[must_use]
    pub fn count(&self, kind: RemarkKind) -> usize {
        self.remarks.iter().filter(|r| r.kind == kind).count()
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
