//! Turns a flagged verdict into a concrete text edit.

use idt_core::{Insertion, Verdict};

/// The edit that annotates a flagged declaration: `export_macro` followed by
/// one space, inserted at the verdict's offset.
///
/// Only `FlagUnexported` is fixable. Re-running extraction on the edited
/// text sees the macro and skips the declaration.
#[must_use]
pub fn resolve_insertion(verdict: &Verdict, export_macro: &str) -> Option<Insertion> {
    match verdict {
        Verdict::FlagUnexported {
            insertion_point, ..
        } => Some(Insertion {
            offset: insertion_point.offset,
            text: format!("{export_macro} "),
        }),
        Verdict::Skip { .. } | Verdict::FlagOverExportedPrivate => None,
    }
}
