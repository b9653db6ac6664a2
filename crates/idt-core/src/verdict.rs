//! Classification outcomes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte offset in the declaration's owning file where an annotation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct InsertionPoint {
    pub offset: usize,
}

/// Concrete text edit derived from a flagged verdict.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Insertion {
    pub offset: usize,
    pub text: String,
}

/// The guard that short-circuited classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InternalPath,
    SystemHeader,
    DependentContext,
    HasBody,
    Friend,
    DeletedOrDefaulted,
    ClassAnnotationSubsumes,
    PrivateMember,
    PureVirtual,
    AlreadyAnnotated,
    IgnoredName,
    ReservedName,
    ClassesNotAnnotated,
    IncompleteDefinition,
    Nested,
    Union,
    NotFromHeader,
    ExplicitInstantiation,
    NoExternalStorage,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InternalPath => "internal_path",
            Self::SystemHeader => "system_header",
            Self::DependentContext => "dependent_context",
            Self::HasBody => "has_body",
            Self::Friend => "friend",
            Self::DeletedOrDefaulted => "deleted_or_defaulted",
            Self::ClassAnnotationSubsumes => "class_annotation_subsumes",
            Self::PrivateMember => "private_member",
            Self::PureVirtual => "pure_virtual",
            Self::AlreadyAnnotated => "already_annotated",
            Self::IgnoredName => "ignored_name",
            Self::ReservedName => "reserved_name",
            Self::ClassesNotAnnotated => "classes_not_annotated",
            Self::IncompleteDefinition => "incomplete_definition",
            Self::Nested => "nested",
            Self::Union => "union",
            Self::NotFromHeader => "not_from_header",
            Self::ExplicitInstantiation => "explicit_instantiation",
            Self::NoExternalStorage => "no_external_storage",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// No remark.
    Skip { reason: SkipReason },
    /// Public interface without an export annotation.
    FlagUnexported {
        insertion_point: InsertionPoint,
        macro_text: String,
    },
    /// A private member carries an export annotation. Never auto-fixed.
    FlagOverExportedPrivate,
}

impl Verdict {
    #[must_use]
    pub const fn skip(reason: SkipReason) -> Self {
        Self::Skip { reason }
    }

    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }

    #[must_use]
    pub const fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skip { reason } => Some(*reason),
            _ => None,
        }
    }
}
