//! Declaration kinds and the attribute enums carried by a fact.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DeclarationKind
// ---------------------------------------------------------------------------

/// The syntactic category of a visited declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// Free function, friend function, or function template specialization.
    Function,
    /// Member function declared inside a record body.
    Method,
    /// `class`, `struct` or `union` declaration.
    Record,
    /// Namespace-scope variable.
    Variable,
    /// Explicit instantiation of a class template (`[extern] template class x<T>;`).
    TemplateSpecialization,
}

impl DeclarationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Record => "record",
            Self::Variable => "variable",
            Self::TemplateSpecialization => "template_specialization",
        }
    }

    /// Functions and methods share the function decision list.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Member access specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    /// Parse the text of an access specifier label (`public:`, `private :`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().trim_end_matches(':').trim() {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExportAttr
// ---------------------------------------------------------------------------

/// Linkage annotation already present on a declaration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ExportAttr {
    #[default]
    None,
    /// `dllexport` or a known export macro.
    Export,
    /// `dllimport`.
    Import,
    /// `visibility("...")` attribute.
    Visibility,
}

impl ExportAttr {
    #[must_use]
    pub const fn is_annotated(self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Export => "export",
            Self::Import => "import",
            Self::Visibility => "visibility",
        }
    }
}

impl fmt::Display for ExportAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// Template status of a declaration.
///
/// ```text
/// void f();                      non_template
/// template <class T> void f(T);  template
/// template <> void f<int>(int);  explicit_specialization
/// template void f<int>(int);     explicit_instantiation_def
/// extern template class c<int>;  explicit_instantiation_decl
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    #[default]
    NonTemplate,
    Template,
    ExplicitInstantiationDecl,
    ExplicitInstantiationDef,
    ExplicitSpecialization,
}

impl TemplateKind {
    #[must_use]
    pub const fn is_explicit_instantiation(self) -> bool {
        matches!(
            self,
            Self::ExplicitInstantiationDecl | Self::ExplicitInstantiationDef
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonTemplate => "non_template",
            Self::Template => "template",
            Self::ExplicitInstantiationDecl => "explicit_instantiation_decl",
            Self::ExplicitInstantiationDef => "explicit_instantiation_def",
            Self::ExplicitSpecialization => "explicit_specialization",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecordKeyword
// ---------------------------------------------------------------------------

/// The class-key that introduced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKeyword {
    Class,
    Struct,
    Union,
}

impl RecordKeyword {
    #[must_use]
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text {
            "class" => Some(Self::Class),
            "struct" => Some(Self::Struct),
            "union" => Some(Self::Union),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }

    /// Distance from the keyword start to the insertion point: the keyword
    /// plus its single separating space.
    #[must_use]
    pub const fn insertion_offset(self) -> usize {
        match self {
            Self::Class | Self::Union => 6,
            Self::Struct => 7,
        }
    }

    /// Members of a `class` are private until the first access label.
    #[must_use]
    pub const fn default_access(self) -> Access {
        match self {
            Self::Class => Access::Private,
            Self::Struct | Self::Union => Access::Public,
        }
    }
}

impl fmt::Display for RecordKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
