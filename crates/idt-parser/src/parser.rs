//! ast-grep wrapper and C/C++ file detection.

use std::path::Path;

use ast_grep_core::Node;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::{LanguageExt, SupportLang};

/// The concrete AST tree type returned by `parse_source`.
pub type AstTree = ast_grep_core::AstGrep<StrDoc<SupportLang>>;

/// A node of a parsed C++ tree.
pub type CppNode<'r> = Node<'r, StrDoc<SupportLang>>;

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "h++", "inc", "def", "ipp", "tcc"];
const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "c++", "cp", "m", "mm"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Headers are the files whose declarations form a library interface.
#[must_use]
pub fn is_header_path(path: &Path) -> bool {
    extension(path).is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `path` names something the C++ grammar should be run on.
#[must_use]
pub fn is_cpp_path(path: &Path) -> bool {
    is_header_path(path)
        || extension(path).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
}

/// Parse C or C++ source with the C++ grammar.
#[must_use]
pub fn parse_source(source: &str) -> AstTree {
    SupportLang::Cpp.ast_grep(source)
}

/// The first node tree-sitter could not parse, in document order.
#[must_use]
pub fn first_error<'r>(node: &CppNode<'r>) -> Option<CppNode<'r>> {
    if node.kind().as_ref() == "ERROR" {
        return Some(node.clone());
    }
    node.children().find_map(|child| first_error(&child))
}
