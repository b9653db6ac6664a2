//! Declarator helpers: names, parameter signatures, function detection.

use crate::parser::CppNode;

/// Node kinds that can appear as a declarator child of a declaration.
const DECLARATOR_KINDS: &[&str] = &[
    "function_declarator",
    "pointer_declarator",
    "reference_declarator",
    "init_declarator",
    "array_declarator",
    "parenthesized_declarator",
    "attributed_declarator",
    "identifier",
    "field_identifier",
    "qualified_identifier",
    "template_function",
    "operator_name",
    "destructor_name",
];

const WRAPPER_KINDS: &[&str] = &[
    "pointer_declarator",
    "reference_declarator",
    "attributed_declarator",
];

const RECORD_KINDS: &[&str] = &["class_specifier", "struct_specifier", "union_specifier"];

pub(super) fn is_record_specifier(node: &CppNode<'_>) -> bool {
    RECORD_KINDS.contains(&node.kind().as_ref())
}

/// The declarator children of a declaration, skipping its type.
pub(super) fn declarators<'r>(decl: &CppNode<'r>) -> Vec<CppNode<'r>> {
    let type_range = decl.field("type").map(|t| t.range());
    decl.children()
        .filter(|c| DECLARATOR_KINDS.contains(&c.kind().as_ref()))
        .filter(|c| Some(c.range()) != type_range)
        .collect()
}

/// The declarator nested in a wrapper, by field or as last named child.
fn inner<'r>(node: &CppNode<'r>) -> Option<CppNode<'r>> {
    node.field("declarator")
        .or_else(|| node.children().filter(|c| c.is_named()).last())
}

/// The `function_declarator` that makes `declarator` declare a function.
///
/// `int *f();` is a function returning a pointer; `int (*fp)();` is a
/// variable holding one.
pub(super) fn function_declarator<'r>(declarator: &CppNode<'r>) -> Option<CppNode<'r>> {
    let kind = declarator.kind();
    if kind.as_ref() == "function_declarator" {
        let target = declarator.field("declarator")?;
        return (target.kind().as_ref() != "parenthesized_declarator").then(|| declarator.clone());
    }
    if WRAPPER_KINDS.contains(&kind.as_ref()) {
        return function_declarator(&inner(declarator)?);
    }
    None
}

/// The name node of a function declarator.
pub(super) fn function_name<'r>(function: &CppNode<'r>) -> Option<CppNode<'r>> {
    function.field("declarator")
}

/// The identifier a variable declarator introduces.
pub(super) fn variable_name<'r>(declarator: &CppNode<'r>) -> Option<CppNode<'r>> {
    match declarator.kind().as_ref() {
        "identifier" | "field_identifier" | "qualified_identifier" | "template_function" => {
            Some(declarator.clone())
        }
        "init_declarator"
        | "pointer_declarator"
        | "reference_declarator"
        | "array_declarator"
        | "parenthesized_declarator"
        | "attributed_declarator"
        | "function_declarator" => variable_name(&inner(declarator)?),
        _ => None,
    }
}

/// Collapse whitespace in a name, keeping one space only between two
/// word characters: `tpl< unsigned  int >` → `tpl<unsigned int>`.
pub(super) fn normalize_name(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space
            && out.chars().last().is_some_and(is_word_char)
            && is_word_char(ch)
        {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

/// Drop template argument lists: `ns::W<int>` → `ns::W`.
pub(super) fn strip_template_args(name: &str) -> String {
    let mut depth = 0usize;
    name.chars()
        .filter(|&c| match c {
            '<' => {
                depth += 1;
                false
            }
            '>' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Parameter types of a function declarator, names removed:
/// `(const char *s, int n = 0)` → `const char*,int`.
pub(super) fn parameter_signature(function: &CppNode<'_>) -> String {
    let Some(list) = function.field("parameters") else {
        return String::new();
    };
    list.children()
        .filter(|c| c.is_named())
        .filter(|p| p.kind().as_ref() != "comment")
        .map(|param| parameter_type(&param))
        .collect::<Vec<_>>()
        .join(",")
}

fn parameter_type(param: &CppNode<'_>) -> String {
    if param.kind().as_ref() == "variadic_parameter_declaration" || param.text().trim() == "..." {
        return "...".to_string();
    }
    let ty = param.field("type").map(|t| t.text().to_string()).unwrap_or_default();
    let declarator = param.field("declarator").map_or_else(String::new, |d| {
        let text = d.text().to_string();
        match variable_name(&d) {
            Some(name) => {
                let name_range = name.range();
                let base = d.range().start;
                let start = name_range.start.saturating_sub(base).min(text.len());
                let end = name_range.end.saturating_sub(base).min(text.len());
                format!("{}{}", &text[..start], &text[end..])
            }
            None => text,
        }
    });
    let qualifiers: Vec<String> = param
        .children()
        .filter(|c| c.kind().as_ref() == "type_qualifier")
        .map(|c| c.text().to_string())
        .collect();
    let joined = format!("{} {ty} {declarator}", qualifiers.join(" "));
    compact(&normalize_name(&joined))
}

/// Drop spaces next to punctuation so `char *` and `char*` agree.
fn compact(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ' ' {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next = chars.get(i + 1).copied();
            if prev.is_some_and(is_word_char) && next.is_some_and(is_word_char) {
                out.push(ch);
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Whether the declaration ends in `= 0`.
pub(super) fn is_pure_specifier(decl: &CppNode<'_>) -> bool {
    decl.children().any(|c| {
        let kind = c.kind();
        kind.as_ref() == "pure_virtual_clause"
            || (kind.as_ref() == "number_literal" && c.text().as_ref() == "0")
    })
}
