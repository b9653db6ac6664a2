//! Declaration fact extraction.
//!
//! Each file of a translation unit is masked, parsed with the C++ grammar and
//! walked once. Facts come out in file order, main file first. Whether a
//! function has a body is settled across the whole unit, so a prototype in a
//! header followed by its definition in the same unit is not flagged.

mod annotations;
mod declarators;
mod walk;

use std::path::PathBuf;

use idt_core::DeclarationFact;
use tracing::debug;

use crate::error::ParserError;
use crate::mask::MacroSet;
use crate::parser::{first_error, parse_source};
use crate::unit::{SourceFile, TranslationUnit, UnitLoader};
use walk::{Collector, Walker};

/// Longest snippet quoted in a syntax error.
const SNIPPET_LIMIT: usize = 40;

/// Extract the facts of every declaration in `unit`.
///
/// # Errors
/// Returns `ParserError::Syntax` when a non-system file of the unit does not
/// parse. Syntax errors in system headers are logged and the parsable part
/// of the header is still walked.
pub fn extract_unit(unit: &TranslationUnit) -> Result<Vec<DeclarationFact>, ParserError> {
    let mut collector = Collector::default();
    for file in unit.files() {
        extract_file(file, &mut collector)?;
    }
    let facts = collector.finish()?;
    debug!(
        file = %unit.main().display(),
        facts = facts.len(),
        "extracted declaration facts"
    );
    Ok(facts)
}

/// Extract facts from in-memory source, as a single-file unit.
///
/// # Errors
/// See [`extract_unit`].
pub fn extract_source(
    path: impl Into<PathBuf>,
    source: &str,
    macros: &MacroSet,
) -> Result<Vec<DeclarationFact>, ParserError> {
    let loader = UnitLoader::new(crate::unit::LoaderOptions::default(), macros.clone());
    extract_unit(&loader.from_source(path, source))
}

fn extract_file(file: &SourceFile, collector: &mut Collector) -> Result<(), ParserError> {
    let tree = parse_source(file.masked.text());
    let root = tree.root();

    if let Some(error) = first_error(&root) {
        let range = error.range();
        let position = file.lines.position(range.start);
        if !file.is_system {
            return Err(ParserError::Syntax {
                file: file.path.clone(),
                line: position.line,
                column: position.column,
                snippet: snippet(&file.source, range.start, range.end),
            });
        }
        debug!(
            file = %file.path.display(),
            line = position.line,
            "syntax error in system header"
        );
    }

    Walker::new(file, collector).walk(&root);
    Ok(())
}

/// The first line of the erroneous text, clipped.
fn snippet(source: &str, start: usize, end: usize) -> String {
    let text = source.get(start..end.min(source.len())).unwrap_or_default();
    let line = text.lines().next().unwrap_or_default().trim();
    line.chars().take(SNIPPET_LIMIT).collect()
}

#[cfg(test)]
mod tests;
