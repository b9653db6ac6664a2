//! # idt-parser
//!
//! ast-grep-based C/C++ parsing and declaration fact extraction for idt.
//!
//! - [`mask`]: blanks annotation and transparent macros before parsing so the
//!   grammar sees plain declarations at unchanged byte offsets
//! - [`unit`]: loads a translation unit, following `#include` through the
//!   configured search paths
//! - [`extractor`]: walks each file's tree and produces one
//!   [`DeclarationFact`](idt_core::DeclarationFact) per declaration

pub mod error;
pub mod extractor;
pub mod lines;
pub mod mask;
pub mod parser;
pub mod unit;

pub use error::ParserError;
pub use extractor::{extract_source, extract_unit};
pub use lines::LineIndex;
pub use mask::{MacroRole, MacroSet, MaskedRegion, MaskedSource};
pub use parser::{first_error, is_cpp_path, is_header_path, parse_source};
pub use unit::{
    IncludeDirective, LoaderOptions, SourceFile, TranslationUnit, UnitLoader, include_directives,
};
