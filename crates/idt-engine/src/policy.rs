//! Run-wide classification policy.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use idt_core::ANONYMOUS_RECORD;

use crate::error::EngineError;
use crate::paths::{InternalPaths, PathPredicate};

/// Everything the decision lists consult besides the fact and ignore list.
///
/// Built once per run and shared read-only across translation units.
pub struct Policy {
    export_macro: String,
    annotate_classes: bool,
    report_only: bool,
    internal: Box<dyn PathPredicate>,
    reserved_records: BTreeSet<String>,
}

impl Policy {
    /// A policy with classes annotated, fix-its enabled, no internal paths,
    /// and only the anonymous-record sentinel reserved.
    ///
    /// # Errors
    /// Returns `EngineError::EmptyExportMacro` when `export_macro` is blank.
    pub fn new(export_macro: impl Into<String>) -> Result<Self, EngineError> {
        let export_macro = export_macro.into().trim().to_string();
        if export_macro.is_empty() {
            return Err(EngineError::EmptyExportMacro);
        }
        Ok(Self {
            export_macro,
            annotate_classes: true,
            report_only: false,
            internal: Box::new(InternalPaths::none()),
            reserved_records: BTreeSet::from([ANONYMOUS_RECORD.to_string()]),
        })
    }

    #[must_use]
    pub const fn with_annotate_classes(mut self, value: bool) -> Self {
        self.annotate_classes = value;
        self
    }

    #[must_use]
    pub const fn with_report_only(mut self, value: bool) -> Self {
        self.report_only = value;
        self
    }

    #[must_use]
    pub fn with_internal_paths(mut self, predicate: impl PathPredicate + 'static) -> Self {
        self.internal = Box::new(predicate);
        self
    }

    /// Add record names that are never annotated. The anonymous sentinel
    /// stays reserved.
    #[must_use]
    pub fn with_reserved_records<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_records
            .extend(names.into_iter().map(Into::into).filter(|n: &String| !n.is_empty()));
        self
    }

    #[must_use]
    pub fn export_macro(&self) -> &str {
        &self.export_macro
    }

    #[must_use]
    pub const fn annotate_classes(&self) -> bool {
        self.annotate_classes
    }

    #[must_use]
    pub const fn report_only(&self) -> bool {
        self.report_only
    }

    #[must_use]
    pub fn is_internal(&self, path: &Path) -> bool {
        self.internal.is_internal(path)
    }

    /// Reserved when either the bare or the qualified name is listed.
    #[must_use]
    pub fn is_reserved(&self, qualified_name: &str, bare_name: &str) -> bool {
        self.reserved_records.contains(bare_name) || self.reserved_records.contains(qualified_name)
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("export_macro", &self.export_macro)
            .field("annotate_classes", &self.annotate_classes)
            .field("report_only", &self.report_only)
            .field("reserved_records", &self.reserved_records)
            .finish_non_exhaustive()
    }
}
