//! Export annotation detection.

use std::ops::Range;

use idt_core::ExportAttr;

use crate::unit::SourceFile;

/// Where a declaration's annotation may appear.
#[derive(Debug, Clone)]
pub(super) struct AnnotationSpan {
    /// Declaration text up to its body, template header included.
    pub head: Range<usize>,
    /// Start of the declaration proper, after any template header.
    pub inner_start: usize,
    /// Start of the declared name.
    pub name_start: usize,
}

/// Spellings that introduce an attribute argument list.
const ATTRIBUTE_KEYWORDS: &[&str] = &["__declspec", "__attribute__", "__attribute"];

/// The linkage annotation present on a declaration.
///
/// A masked annotation macro counts when it directly precedes the
/// declaration or sits between its start and its name. Spelled-out
/// attributes count only inside `__declspec(...)`, `__attribute__((...))`
/// or `[[...]]`, never as plain identifiers of the declaration.
pub(super) fn export_attr(file: &SourceFile, span: &AnnotationSpan) -> ExportAttr {
    let masked = &file.masked;
    if masked.annotation_before(span.inner_start)
        || masked.annotation_within(span.head.start..span.name_start.max(span.head.start))
    {
        return ExportAttr::Export;
    }

    let text = masked.text();
    let head = span.head.start.min(text.len())..span.head.end.min(text.len());
    let Some(head) = text.get(head) else {
        return ExportAttr::None;
    };
    let attributes = attribute_lists(head);
    let any = |words: &[&str]| {
        attributes
            .iter()
            .any(|list| words.iter().any(|word| contains_word(list, word)))
    };
    if any(&["dllexport", "__dllexport__"]) {
        ExportAttr::Export
    } else if any(&["dllimport", "__dllimport__"]) {
        ExportAttr::Import
    } else if any(&["visibility", "__visibility__"]) {
        ExportAttr::Visibility
    } else {
        ExportAttr::None
    }
}

/// The argument text of every attribute written in `head`.
fn attribute_lists(head: &str) -> Vec<&str> {
    let bytes = head.as_bytes();
    let mut lists = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"[[") {
            let Some(close) = head[i + 2..].find("]]") else {
                break;
            };
            lists.push(&head[i + 2..i + 2 + close]);
            i += close + 4;
            continue;
        }
        if is_word_start(bytes, i)
            && let Some(keyword) = ATTRIBUTE_KEYWORDS
                .iter()
                .find(|k| bytes[i..].starts_with(k.as_bytes()) && !continues_word(bytes, i + k.len()))
        {
            let open = skip_spaces(bytes, i + keyword.len());
            if bytes.get(open) == Some(&b'(')
                && let Some(close) = balanced_close(bytes, open)
            {
                lists.push(&head[open + 1..close]);
                i = close + 1;
                continue;
            }
        }
        i += 1;
    }
    lists
}

fn is_word_start(bytes: &[u8], at: usize) -> bool {
    at == 0 || !continues_word(bytes, at - 1)
}

fn continues_word(bytes: &[u8], at: usize) -> bool {
    bytes
        .get(at)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

fn skip_spaces(bytes: &[u8], mut at: usize) -> usize {
    while bytes.get(at).is_some_and(u8::is_ascii_whitespace) {
        at += 1;
    }
    at
}

/// Offset of the `)` matching the `(` at `open`, skipping string literals.
fn balanced_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let bytes = haystack.as_bytes();
    haystack
        .match_indices(word)
        .any(|(at, _)| is_word_start(bytes, at) && !continues_word(bytes, at + word.len()))
}
