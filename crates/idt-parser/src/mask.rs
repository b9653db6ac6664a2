//! Macro masking.
//!
//! The grammar sees the file without preprocessing, so annotation macros such
//! as `LLVM_ABI` would turn `LLVM_ABI void f();` into a parse error. Known
//! macro invocations are replaced with spaces of the same byte length before
//! parsing, which keeps every offset valid for the original text. The masked
//! ranges are remembered so the extractor can tell which declarations carried
//! an annotation.
//!
//! The grammar also rejects `extern template ...;`. The `extern` of an
//! explicit instantiation declaration is blanked the same way and its range
//! kept apart from macro regions.

use std::collections::HashSet;
use std::ops::Range;

/// What a masked macro meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroRole {
    /// Expands to an export/import annotation.
    Annotation,
    /// Expands to something the grammar cannot parse but that carries no
    /// linkage meaning (deprecation markers, calling conventions).
    Transparent,
}

/// One masked macro invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedRegion {
    pub range: Range<usize>,
    pub name: String,
    pub role: MacroRole,
}

/// The macro names to mask, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroSet {
    annotation: HashSet<String>,
    transparent: HashSet<String>,
}

impl MacroSet {
    pub fn new<A, T, S>(annotation: A, transparent: T) -> Self
    where
        A: IntoIterator<Item = S>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            annotation: annotation.into_iter().map(Into::into).collect(),
            transparent: transparent.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn role(&self, name: &str) -> Option<MacroRole> {
        if self.annotation.contains(name) {
            Some(MacroRole::Annotation)
        } else if self.transparent.contains(name) {
            Some(MacroRole::Transparent)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotation.is_empty() && self.transparent.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    LineComment,
    BlockComment,
    Str { escaped: bool },
    Char { escaped: bool },
    Directive { escaped: bool },
}

/// Source text with known macros blanked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedSource {
    text: String,
    regions: Vec<MaskedRegion>,
    extern_templates: Vec<Range<usize>>,
}

impl MaskedSource {
    /// Mask every invocation of a macro in `macros` that appears in code.
    /// Comments, string and character literals, and preprocessor directives
    /// are left untouched. An invocation immediately followed by `(` is
    /// masked together with its balanced argument list.
    #[must_use]
    pub fn mask(source: &str, macros: &MacroSet) -> Self {
        if macros.is_empty() && !source.contains("extern") {
            return Self::unmasked(source);
        }

        let bytes = source.as_bytes();
        let mut out = bytes.to_vec();
        let mut regions = Vec::new();
        let mut extern_templates = Vec::new();
        let mut mode = Mode::Normal;
        let mut line_has_code = false;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\n' {
                line_has_code = false;
            }
            match mode {
                Mode::Normal => match b {
                    b'/' if bytes.get(i + 1) == Some(&b'/') => {
                        mode = Mode::LineComment;
                        i += 2;
                        continue;
                    }
                    b'/' if bytes.get(i + 1) == Some(&b'*') => {
                        mode = Mode::BlockComment;
                        i += 2;
                        continue;
                    }
                    b'"' => mode = Mode::Str { escaped: false },
                    b'\'' => mode = Mode::Char { escaped: false },
                    b'#' if !line_has_code => mode = Mode::Directive { escaped: false },
                    b'0'..=b'9' => {
                        i = skip_number(bytes, i);
                        line_has_code = true;
                        continue;
                    }
                    b if is_ident_start(b) => {
                        let end = skip_ident(bytes, i);
                        let ident = &source[i..end];
                        line_has_code = true;
                        if bytes.get(end) == Some(&b'"') && is_raw_prefix(ident) {
                            i = skip_raw_string(bytes, end);
                            continue;
                        }
                        if let Some(role) = macros.role(ident) {
                            let stop = invocation_end(bytes, end);
                            blank(&mut out, i..stop);
                            regions.push(MaskedRegion {
                                range: i..stop,
                                name: ident.to_string(),
                                role,
                            });
                            i = stop;
                        } else if ident == "extern" && next_word(source, end) == Some("template") {
                            blank(&mut out, i..end);
                            extern_templates.push(i..end);
                            i = end;
                        } else {
                            i = end;
                        }
                        continue;
                    }
                    b if !b.is_ascii_whitespace() => line_has_code = true,
                    _ => {}
                },
                Mode::LineComment => {
                    if b == b'\n' {
                        mode = Mode::Normal;
                    }
                }
                Mode::BlockComment => {
                    if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        mode = Mode::Normal;
                        i += 2;
                        continue;
                    }
                }
                Mode::Str { escaped } => {
                    mode = match b {
                        _ if escaped => Mode::Str { escaped: false },
                        b'\\' => Mode::Str { escaped: true },
                        b'"' | b'\n' => Mode::Normal,
                        _ => mode,
                    };
                }
                Mode::Char { escaped } => {
                    mode = match b {
                        _ if escaped => Mode::Char { escaped: false },
                        b'\\' => Mode::Char { escaped: true },
                        b'\'' | b'\n' => Mode::Normal,
                        _ => mode,
                    };
                }
                Mode::Directive { escaped } => {
                    mode = match b {
                        b'\n' if !escaped => Mode::Normal,
                        b'\\' => Mode::Directive { escaped: true },
                        b'\r' => mode,
                        _ => Mode::Directive { escaped: false },
                    };
                }
            }
            i += 1;
        }

        match String::from_utf8(out) {
            Ok(text) => Self {
                text,
                regions,
                extern_templates,
            },
            Err(_) => {
                tracing::warn!("masking produced invalid UTF-8; parsing unmasked text");
                Self::unmasked(source)
            }
        }
    }

    fn unmasked(source: &str) -> Self {
        Self {
            text: source.to_string(),
            regions: Vec::new(),
            extern_templates: Vec::new(),
        }
    }

    /// The text handed to the parser.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn regions(&self) -> &[MaskedRegion] {
        &self.regions
    }

    /// Start of the blanked `extern` that introduces the `template` keyword
    /// at `offset`.
    #[must_use]
    pub fn extern_template_before(&self, offset: usize) -> Option<usize> {
        self.extern_templates
            .iter()
            .find(|r| {
                r.end <= offset
                    && self
                        .text
                        .get(r.end..offset)
                        .is_some_and(|gap| gap.bytes().all(|b| b.is_ascii_whitespace()))
            })
            .map(|r| r.start)
    }

    /// An annotation macro lies entirely inside `range`.
    #[must_use]
    pub fn annotation_within(&self, range: Range<usize>) -> bool {
        self.regions.iter().any(|r| {
            r.role == MacroRole::Annotation && r.range.start >= range.start && r.range.end <= range.end
        })
    }

    /// An annotation macro precedes `offset`, separated only by whitespace
    /// and other masked macros.
    #[must_use]
    pub fn annotation_before(&self, offset: usize) -> bool {
        let bytes = self.text.as_bytes();
        let mut i = offset.min(bytes.len());
        while i > 0 {
            if let Ok(idx) = self.regions.binary_search_by_key(&i, |r| r.range.end) {
                let region = &self.regions[idx];
                if region.role == MacroRole::Annotation {
                    return true;
                }
                i = region.range.start;
                continue;
            }
            if !bytes[i - 1].is_ascii_whitespace() {
                return false;
            }
            i -= 1;
        }
        false
    }

    /// Some masked macro overlaps `range` or sits directly before it.
    #[must_use]
    pub fn touches(&self, range: Range<usize>) -> bool {
        self.regions
            .iter()
            .any(|r| r.range.start < range.end && r.range.end > range.start)
            || self.regions.iter().any(|r| r.range.end == range.start)
    }
}

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

const fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn skip_ident(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && is_ident_continue(bytes[i]) {
        i += 1;
    }
    i
}

fn skip_number(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (is_ident_continue(bytes[i]) || matches!(bytes[i], b'.' | b'\'')) {
        i += 1;
    }
    i
}

/// The identifier that follows `from` after whitespace, if any.
fn next_word(source: &str, from: usize) -> Option<&str> {
    let bytes = source.as_bytes();
    let start = from + bytes.get(from..)?.iter().take_while(|b| b.is_ascii_whitespace()).count();
    if !bytes.get(start).copied().is_some_and(is_ident_start) {
        return None;
    }
    source.get(start..skip_ident(bytes, start))
}

fn is_raw_prefix(ident: &str) -> bool {
    matches!(ident, "R" | "LR" | "uR" | "UR" | "u8R")
}

/// Skip `"delim( ... )delim"` starting at the opening quote.
fn skip_raw_string(bytes: &[u8], quote: usize) -> usize {
    let Some(open) = bytes[quote..].iter().position(|&b| b == b'(') else {
        return quote + 1;
    };
    let delimiter = &bytes[quote + 1..quote + open];
    let mut i = quote + open + 1;
    while i < bytes.len() {
        if bytes[i] == b')'
            && bytes[i + 1..].starts_with(delimiter)
            && bytes.get(i + 1 + delimiter.len()) == Some(&b'"')
        {
            return i + delimiter.len() + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// End of a macro invocation whose name ends at `name_end`. Arguments are
/// only consumed when `(` follows the name directly.
fn invocation_end(bytes: &[u8], name_end: usize) -> usize {
    if bytes.get(name_end) != Some(&b'(') {
        return name_end;
    }
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(name_end) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    // Unbalanced: mask the name only.
    name_end
}

fn blank(out: &mut [u8], range: Range<usize>) {
    for b in &mut out[range] {
        if *b != b'\n' && *b != b'\r' {
            *b = b' ';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn macros() -> MacroSet {
        MacroSet::new(["IDT_TEST_ABI"], ["DEPRECATED"])
    }

    #[test]
    fn masks_annotation_with_same_length() {
        let source = "IDT_TEST_ABI void f();\n";
        let masked = MaskedSource::mask(source, &macros());
        assert_eq!(masked.text(), "             void f();\n");
        assert_eq!(masked.text().len(), source.len());
        assert_eq!(masked.regions().len(), 1);
        assert_eq!(masked.regions()[0].range, 0..12);
        assert_eq!(masked.regions()[0].role, MacroRole::Annotation);
    }

    #[test]
    fn masks_arguments_of_function_like_macros() {
        let source = "DEPRECATED(\"use g()\") void f();";
        let masked = MaskedSource::mask(source, &macros());
        assert!(masked.text().trim_start().starts_with("void f();"));
        assert_eq!(masked.regions()[0].range, 0..21);
        assert_eq!(masked.regions()[0].role, MacroRole::Transparent);
    }

    #[test]
    fn leaves_comments_strings_and_directives_alone() {
        let source = "// IDT_TEST_ABI\n/* IDT_TEST_ABI */\nconst char *s = \"IDT_TEST_ABI\";\n#define IDT_TEST_ABI __declspec(dllexport)\n";
        let masked = MaskedSource::mask(source, &macros());
        assert_eq!(masked.text(), source);
        assert!(masked.regions().is_empty());
    }

    #[test]
    fn identifiers_containing_the_macro_are_untouched() {
        let source = "void IDT_TEST_ABI_helper(); int x = 0x1DEPRECATED;";
        let masked = MaskedSource::mask(source, &macros());
        assert!(masked.regions().is_empty());
    }

    #[test]
    fn raw_strings_are_skipped() {
        let source = "auto s = R\"x(IDT_TEST_ABI)x\"; IDT_TEST_ABI void f();";
        let masked = MaskedSource::mask(source, &macros());
        assert_eq!(masked.regions().len(), 1);
        assert_eq!(&source[masked.regions()[0].range.clone()], "IDT_TEST_ABI");
    }

    #[test]
    fn annotation_before_walks_whitespace_and_transparent_macros() {
        let source = "IDT_TEST_ABI\nDEPRECATED(\"x\")  void f();\nvoid g();";
        let masked = MaskedSource::mask(source, &macros());
        let f = source.find("void f").unwrap();
        let g = source.find("void g").unwrap();
        assert!(masked.annotation_before(f));
        assert!(!masked.annotation_before(g));
        assert!(masked.touches(0..4));
        assert!(!masked.touches(g..g + 4));
    }

    #[test]
    fn annotation_within_range() {
        let source = "class IDT_TEST_ABI widget {};";
        let masked = MaskedSource::mask(source, &macros());
        let name = source.find("widget").unwrap();
        assert!(masked.annotation_within(0..name));
        assert!(!masked.annotation_within(name..source.len()));
    }

    #[test]
    fn extern_template_keyword_is_blanked() {
        let source = "extern \"C\" void c();\nextern int n;\nextern  template class box<int>;\n";
        let masked = MaskedSource::mask(source, &MacroSet::default());
        let at = source.find("extern  template").unwrap();
        assert_eq!(
            masked.text(),
            "extern \"C\" void c();\nextern int n;\n        template class box<int>;\n"
        );
        assert!(masked.regions().is_empty());
        let template = source.find("template").unwrap();
        assert_eq!(masked.extern_template_before(template), Some(at));
        assert_eq!(masked.extern_template_before(source.find("int n").unwrap()), None);
        assert!(!masked.touches(at..template));
    }

    #[test]
    fn empty_macro_set_is_identity() {
        let masked = MaskedSource::mask("X void f();", &MacroSet::default());
        assert_eq!(masked.text(), "X void f();");
    }
}
