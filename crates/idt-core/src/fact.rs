//! The immutable declaration snapshot consumed by classification.
//!
//! A [`DeclarationFact`] is produced once per visited declaration through a
//! [`FactBuilder`]. Kind-specific attributes are only reachable on the kinds
//! they belong to: method attributes on methods, record attributes on records
//! and class-template instantiations, storage on variables.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::kinds::{Access, DeclarationKind, ExportAttr, RecordKeyword, TemplateKind};
use crate::location::SourceLocation;

/// Name given to unnamed records. Reserved: it is never annotated.
pub const ANONYMOUS_RECORD: &str = "(anonymous)";

/// Attributes only meaningful for member functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodFacts {
    pub access: Access,
    pub is_pure_virtual: bool,
}

/// Attributes only meaningful for records and class-template instantiations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordFacts {
    pub keyword: RecordKeyword,
    pub is_nested: bool,
    pub is_complete_definition: bool,
}

/// Byte offset usable for inserting an annotation, by flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsertionAnchor {
    /// Start of the declaration specifiers.
    DeclarationBegin { offset: usize },
    /// Start of the declaration nested in a `template <...>` header.
    TemplatedInner { offset: usize },
    /// A class-key token; the insertion lands after the keyword and its space.
    AfterKeyword {
        keyword_offset: usize,
        keyword: RecordKeyword,
    },
}

impl InsertionAnchor {
    /// Resolve the anchor to the byte offset where text is inserted.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::DeclarationBegin { offset } | Self::TemplatedInner { offset } => offset,
            Self::AfterKeyword {
                keyword_offset,
                keyword,
            } => keyword_offset + keyword.insertion_offset(),
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationFact {
    kind: DeclarationKind,
    qualified_name: String,
    location: SourceLocation,
    owning_file: PathBuf,
    from_included_file: bool,
    has_body: bool,
    is_dependent_context: bool,
    is_friend: bool,
    is_deleted: bool,
    is_defaulted: bool,
    export_attr: ExportAttr,
    template_kind: TemplateKind,
    method: Option<MethodFacts>,
    record: Option<RecordFacts>,
    has_external_storage: Option<bool>,
    insertion_anchor: InsertionAnchor,
}

impl DeclarationFact {
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        self.kind
    }

    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The unqualified identifier: last `::` segment without template arguments.
    #[must_use]
    pub fn bare_name(&self) -> &str {
        bare_identifier(&self.qualified_name)
    }

    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }

    #[must_use]
    pub fn owning_file(&self) -> &Path {
        &self.owning_file
    }

    #[must_use]
    pub const fn from_included_file(&self) -> bool {
        self.from_included_file
    }

    #[must_use]
    pub const fn is_in_system_header(&self) -> bool {
        self.location.is_system_header
    }

    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.has_body
    }

    #[must_use]
    pub const fn is_dependent_context(&self) -> bool {
        self.is_dependent_context
    }

    #[must_use]
    pub const fn is_friend(&self) -> bool {
        self.is_friend
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    #[must_use]
    pub const fn is_defaulted(&self) -> bool {
        self.is_defaulted
    }

    #[must_use]
    pub const fn export_attr(&self) -> ExportAttr {
        self.export_attr
    }

    #[must_use]
    pub const fn template_kind(&self) -> TemplateKind {
        self.template_kind
    }

    #[must_use]
    pub const fn method(&self) -> Option<MethodFacts> {
        self.method
    }

    /// Member access; `None` for anything but methods.
    #[must_use]
    pub fn access(&self) -> Option<Access> {
        self.method.map(|m| m.access)
    }

    #[must_use]
    pub fn is_pure_virtual(&self) -> bool {
        self.method.is_some_and(|m| m.is_pure_virtual)
    }

    #[must_use]
    pub const fn record(&self) -> Option<RecordFacts> {
        self.record
    }

    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.record.is_some_and(|r| r.is_nested)
    }

    #[must_use]
    pub fn is_union(&self) -> bool {
        self.record
            .is_some_and(|r| r.keyword == RecordKeyword::Union)
    }

    #[must_use]
    pub fn is_complete_definition(&self) -> bool {
        self.record.is_some_and(|r| r.is_complete_definition)
    }

    #[must_use]
    pub fn has_external_storage(&self) -> bool {
        self.has_external_storage.unwrap_or(false)
    }

    #[must_use]
    pub const fn insertion_anchor(&self) -> InsertionAnchor {
        self.insertion_anchor
    }
}

/// Strip namespace qualifiers and template arguments from a declaration name.
///
/// `ns::tpl<char>` → `tpl`, `ns::operator<` → `operator<`.
#[must_use]
pub fn bare_identifier(qualified: &str) -> &str {
    let mut depth = 0usize;
    let mut segment_start = 0usize;
    let bytes = qualified.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'<' if !is_operator_at(qualified, segment_start, i) => depth += 1,
            b'>' if depth > 0 => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segment_start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    let segment = &qualified[segment_start..];
    if segment.starts_with("operator") {
        return segment;
    }
    segment.split('<').next().unwrap_or(segment).trim()
}

fn is_operator_at(qualified: &str, segment_start: usize, at: usize) -> bool {
    qualified[segment_start..at].trim_start().starts_with("operator")
}

/// Incremental constructor for [`DeclarationFact`].
#[derive(Debug, Clone)]
pub struct FactBuilder {
    fact: DeclarationFact,
    mismatch: Option<&'static str>,
}

impl FactBuilder {
    fn new(
        kind: DeclarationKind,
        qualified_name: impl Into<String>,
        location: SourceLocation,
        insertion_anchor: InsertionAnchor,
    ) -> Self {
        let owning_file = location.file.clone();
        Self {
            fact: DeclarationFact {
                kind,
                qualified_name: qualified_name.into(),
                location,
                owning_file,
                from_included_file: false,
                has_body: false,
                is_dependent_context: false,
                is_friend: false,
                is_deleted: false,
                is_defaulted: false,
                export_attr: ExportAttr::None,
                template_kind: TemplateKind::NonTemplate,
                method: None,
                record: None,
                has_external_storage: None,
                insertion_anchor,
            },
            mismatch: None,
        }
    }

    pub fn function(
        qualified_name: impl Into<String>,
        location: SourceLocation,
        anchor: InsertionAnchor,
    ) -> Self {
        Self::new(DeclarationKind::Function, qualified_name, location, anchor)
    }

    pub fn method(
        qualified_name: impl Into<String>,
        location: SourceLocation,
        anchor: InsertionAnchor,
        access: Access,
    ) -> Self {
        let mut builder = Self::new(DeclarationKind::Method, qualified_name, location, anchor);
        builder.fact.method = Some(MethodFacts {
            access,
            is_pure_virtual: false,
        });
        builder
    }

    pub fn record(
        qualified_name: impl Into<String>,
        location: SourceLocation,
        keyword_offset: usize,
        keyword: RecordKeyword,
    ) -> Self {
        let anchor = InsertionAnchor::AfterKeyword {
            keyword_offset,
            keyword,
        };
        let mut builder = Self::new(DeclarationKind::Record, qualified_name, location, anchor);
        builder.fact.record = Some(RecordFacts {
            keyword,
            is_nested: false,
            is_complete_definition: false,
        });
        builder
    }

    pub fn template_specialization(
        qualified_name: impl Into<String>,
        location: SourceLocation,
        keyword_offset: usize,
        keyword: RecordKeyword,
    ) -> Self {
        let anchor = InsertionAnchor::AfterKeyword {
            keyword_offset,
            keyword,
        };
        let mut builder = Self::new(
            DeclarationKind::TemplateSpecialization,
            qualified_name,
            location,
            anchor,
        );
        builder.fact.record = Some(RecordFacts {
            keyword,
            is_nested: false,
            is_complete_definition: false,
        });
        builder
    }

    pub fn variable(
        qualified_name: impl Into<String>,
        location: SourceLocation,
        anchor: InsertionAnchor,
    ) -> Self {
        let mut builder = Self::new(DeclarationKind::Variable, qualified_name, location, anchor);
        builder.fact.has_external_storage = Some(false);
        builder
    }

    #[must_use]
    pub fn owning_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.fact.owning_file = path.into();
        self
    }

    #[must_use]
    pub const fn from_included_file(mut self, value: bool) -> Self {
        self.fact.from_included_file = value;
        self
    }

    #[must_use]
    pub const fn has_body(mut self, value: bool) -> Self {
        self.fact.has_body = value;
        self
    }

    #[must_use]
    pub const fn dependent_context(mut self, value: bool) -> Self {
        self.fact.is_dependent_context = value;
        self
    }

    #[must_use]
    pub const fn friend(mut self, value: bool) -> Self {
        self.fact.is_friend = value;
        self
    }

    #[must_use]
    pub const fn deleted(mut self, value: bool) -> Self {
        self.fact.is_deleted = value;
        self
    }

    #[must_use]
    pub const fn defaulted(mut self, value: bool) -> Self {
        self.fact.is_defaulted = value;
        self
    }

    #[must_use]
    pub const fn export_attr(mut self, value: ExportAttr) -> Self {
        self.fact.export_attr = value;
        self
    }

    #[must_use]
    pub const fn template_kind(mut self, value: TemplateKind) -> Self {
        self.fact.template_kind = value;
        self
    }

    #[must_use]
    pub fn pure_virtual(mut self, value: bool) -> Self {
        match self.fact.method.as_mut() {
            Some(method) => method.is_pure_virtual = value,
            None => self.mismatch = self.mismatch.or(Some("is_pure_virtual")),
        }
        self
    }

    #[must_use]
    pub fn nested(mut self, value: bool) -> Self {
        match self.fact.record.as_mut() {
            Some(record) => record.is_nested = value,
            None => self.mismatch = self.mismatch.or(Some("is_nested")),
        }
        self
    }

    #[must_use]
    pub fn complete_definition(mut self, value: bool) -> Self {
        match self.fact.record.as_mut() {
            Some(record) => record.is_complete_definition = value,
            None => self.mismatch = self.mismatch.or(Some("is_complete_definition")),
        }
        self
    }

    #[must_use]
    pub fn external_storage(mut self, value: bool) -> Self {
        if self.fact.kind == DeclarationKind::Variable {
            self.fact.has_external_storage = Some(value);
        } else {
            self.mismatch = self.mismatch.or(Some("has_external_storage"));
        }
        self
    }

    #[must_use]
    pub const fn anchor(mut self, anchor: InsertionAnchor) -> Self {
        self.fact.insertion_anchor = anchor;
        self
    }

    /// Finish the fact.
    ///
    /// # Errors
    /// Returns `CoreError::EmptyName` for an empty name and
    /// `CoreError::MismatchedAttribute` when a kind-specific setter was used
    /// on another kind.
    pub fn build(self) -> Result<DeclarationFact, CoreError> {
        if let Some(attribute) = self.mismatch {
            return Err(CoreError::MismatchedAttribute {
                attribute,
                kind: self.fact.kind.as_str(),
            });
        }
        if self.fact.qualified_name.trim().is_empty() {
            let location = &self.fact.location;
            return Err(CoreError::EmptyName {
                file: location.file.display().to_string(),
                line: location.line(),
                column: location.column(),
            });
        }
        Ok(self.fact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Position;

    fn loc() -> SourceLocation {
        SourceLocation::new("api.h", Position::new(10, 2, 1))
    }

    #[test]
    fn bare_identifier_strips_namespaces_and_arguments() {
        assert_eq!(bare_identifier("f"), "f");
        assert_eq!(bare_identifier("ns::inner::f"), "f");
        assert_eq!(bare_identifier("tpl<char>"), "tpl");
        assert_eq!(bare_identifier("ns::tpl<std::pair<int, int>>"), "tpl");
        assert_eq!(bare_identifier("record::~record"), "~record");
    }

    #[test]
    fn bare_identifier_keeps_operators_intact() {
        assert_eq!(bare_identifier("operator=="), "operator==");
        assert_eq!(bare_identifier("ns::operator<"), "operator<");
        assert_eq!(bare_identifier("ns::operator<<"), "operator<<");
    }

    #[test]
    fn owning_file_defaults_to_location_file() {
        let anchor = InsertionAnchor::DeclarationBegin { offset: 10 };
        let fact = FactBuilder::function("f", loc(), anchor).build().unwrap();
        assert_eq!(fact.owning_file(), Path::new("api.h"));
        assert_eq!(fact.access(), None);
        assert!(!fact.has_external_storage());
    }

    #[test]
    fn empty_name_is_rejected() {
        let anchor = InsertionAnchor::DeclarationBegin { offset: 0 };
        let err = FactBuilder::function("  ", loc(), anchor).build().unwrap_err();
        assert!(matches!(err, CoreError::EmptyName { line: 2, .. }));
    }

    #[test]
    fn method_attributes_on_function_are_rejected() {
        let anchor = InsertionAnchor::DeclarationBegin { offset: 0 };
        let err = FactBuilder::function("f", loc(), anchor)
            .pure_virtual(true)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::MismatchedAttribute {
                attribute: "is_pure_virtual",
                kind: "function"
            }
        ));
    }

    #[test]
    fn storage_on_record_is_rejected() {
        let err = FactBuilder::record("r", loc(), 0, RecordKeyword::Struct)
            .external_storage(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::MismatchedAttribute { .. }));
    }

    #[test]
    fn record_anchor_lands_after_keyword() {
        let fact = FactBuilder::record("r", loc(), 100, RecordKeyword::Struct)
            .complete_definition(true)
            .build()
            .unwrap();
        assert_eq!(fact.insertion_anchor().offset(), 107);
        assert!(fact.is_complete_definition());
        assert!(!fact.is_union());
    }

    #[test]
    fn union_is_derived_from_keyword() {
        let fact = FactBuilder::record("u", loc(), 0, RecordKeyword::Union)
            .build()
            .unwrap();
        assert!(fact.is_union());
        assert_eq!(fact.insertion_anchor().offset(), 6);
    }
}
