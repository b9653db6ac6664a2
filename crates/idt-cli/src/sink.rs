//! Reporting sink.
//!
//! Collects the remarks of every translation unit into one [`Report`],
//! dropping duplicates from headers shared between units, renders it, and
//! writes fixed files when asked to.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use idt_core::{FixIt, Remark, Report};
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::pipeline::{UnitOutcome, parse_failure};

/// Suffix of the sibling written when fixes are not applied in place.
const FIXED_SUFFIX: &str = ".fixed";

#[derive(Debug, Clone, Copy)]
pub struct SinkOptions {
    pub format: OutputFormat,
    pub apply_fixits: bool,
    pub inplace: bool,
}

pub struct ReportSink {
    options: SinkOptions,
}

impl ReportSink {
    pub const fn new(options: SinkOptions) -> Self {
        Self { options }
    }

    /// Merge unit outcomes in input order, then apply fixes if enabled.
    pub fn finish(&self, outcomes: Vec<UnitOutcome>) -> anyhow::Result<Report> {
        let mut report = collect(outcomes);
        if self.options.apply_fixits {
            report.rewritten_files = apply_fixits(&report.remarks, self.options.inplace)?;
        }
        Ok(report)
    }

    pub fn render(&self, report: &Report) -> anyhow::Result<String> {
        match self.options.format {
            OutputFormat::Text => Ok(render_text(report, !self.options.apply_fixits)),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(report)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

/// Build the report, keeping the first of identical remarks.
pub fn collect(outcomes: Vec<UnitOutcome>) -> Report {
    let mut report = Report {
        translation_units: outcomes.len(),
        ..Report::default()
    };
    let mut seen = HashSet::new();
    for outcome in outcomes {
        let remarks = match outcome.result {
            Ok(remarks) => remarks,
            Err(error) => {
                report.parse_failures += 1;
                vec![parse_failure(&outcome.main, &error)]
            }
        };
        for remark in remarks {
            if seen.insert(remark.clone()) {
                report.remarks.push(remark);
            } else {
                debug!(name = %remark.name, file = %remark.file.display(), "duplicate remark");
            }
        }
    }
    report
}

/// One line per remark; each fix-it follows its remark in parseable form
/// when `show_fixits` is set.
pub fn render_text(report: &Report, show_fixits: bool) -> String {
    let mut out = String::new();
    for remark in &report.remarks {
        let _ = writeln!(out, "{}", remark.render());
        if show_fixits && let Some(fixit) = &remark.fixit {
            let _ = writeln!(out, "{}", fixit.render_parseable());
        }
    }
    out
}

/// Apply every fix-it, grouped per file. Returns the files written.
///
/// Files are grouped by canonical path, so one header named two ways is
/// still rewritten once.
pub fn apply_fixits(remarks: &[Remark], inplace: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut by_file: BTreeMap<PathBuf, (&Path, Vec<&FixIt>)> = BTreeMap::new();
    for fixit in remarks.iter().filter_map(|r| r.fixit.as_ref()) {
        let key = fs::canonicalize(&fixit.file).unwrap_or_else(|_| fixit.file.clone());
        by_file
            .entry(key)
            .or_insert_with(|| (fixit.file.as_path(), Vec::new()))
            .1
            .push(fixit);
    }

    let mut written = Vec::with_capacity(by_file.len());
    for (file, fixits) in by_file.into_values() {
        let original = fs::read_to_string(file)
            .with_context(|| format!("failed to read {} for rewriting", file.display()))?;
        let fixed = apply_to_text(&original, &fixits);
        let target = if inplace {
            file.to_path_buf()
        } else {
            fixed_sibling(file)
        };
        fs::write(&target, fixed)
            .with_context(|| format!("failed to write {}", target.display()))?;
        info!(file = %target.display(), edits = fixits.len(), "applied fix-its");
        written.push(target);
    }
    Ok(written)
}

/// Insert from the highest offset down so earlier offsets stay valid.
/// Identical insertions are applied once.
fn apply_to_text(original: &str, fixits: &[&FixIt]) -> String {
    let mut edits: Vec<(usize, &str)> = fixits
        .iter()
        .map(|f| (f.offset, f.text.as_str()))
        .collect();
    edits.sort_unstable_by(|a, b| b.cmp(a));
    edits.dedup();

    let mut text = original.to_string();
    for (offset, insert) in edits {
        if text.is_char_boundary(offset) {
            text.insert_str(offset, insert);
        } else {
            debug!(offset, "insertion point is not a character boundary");
        }
    }
    text
}

/// `<file>.fixed`, next to the original.
fn fixed_sibling(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(FIXED_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idt_core::RemarkKind;
    use pretty_assertions::assert_eq;

    fn remark(file: &Path, line: u32, name: &str, offset: usize) -> Remark {
        Remark {
            file: file.to_path_buf(),
            line,
            column: 1,
            severity: RemarkKind::UnexportedPublicInterface.severity(),
            kind: RemarkKind::UnexportedPublicInterface,
            name: name.to_string(),
            fixit: Some(FixIt {
                file: file.to_path_buf(),
                offset,
                line,
                column: 1,
                text: "EXPORT ".to_string(),
            }),
        }
    }

    #[test]
    fn shared_header_remarks_are_deduplicated() {
        let header = Path::new("api.hh");
        let outcomes = vec![
            UnitOutcome {
                main: PathBuf::from("a.cc"),
                result: Ok(vec![remark(header, 1, "f", 0)]),
            },
            UnitOutcome {
                main: PathBuf::from("b.cc"),
                result: Ok(vec![remark(header, 1, "f", 0), remark(header, 2, "g", 10)]),
            },
        ];
        let report = collect(outcomes);
        assert_eq!(report.translation_units, 2);
        let names: Vec<_> = report.remarks.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g"]);
    }

    #[test]
    fn failed_units_become_error_remarks() {
        let outcomes = vec![UnitOutcome {
            main: PathBuf::from("broken.hh"),
            result: Err(idt_parser::ParserError::Syntax {
                file: PathBuf::from("broken.hh"),
                line: 3,
                column: 5,
                snippet: "@".to_string(),
            }),
        }];
        let report = collect(outcomes);
        assert!(!report.succeeded());
        assert_eq!(
            render_text(&report, true),
            "broken.hh:3:5: error: unable to parse '@'\n"
        );
    }

    #[test]
    fn text_output_with_parseable_fixits() {
        let report = Report {
            translation_units: 1,
            parse_failures: 0,
            remarks: vec![remark(Path::new("api.hh"), 5, "h", 30)],
            rewritten_files: Vec::new(),
        };
        assert_eq!(
            render_text(&report, true),
            "api.hh:5:1: remark: unexported public interface 'h'\n\
             fix-it:\"api.hh\":{5:1-5:1}:\"EXPORT \"\n"
        );
        assert_eq!(
            render_text(&report, false),
            "api.hh:5:1: remark: unexported public interface 'h'\n"
        );
    }

    #[test]
    fn insertions_apply_from_the_end() {
        let fixits = [
            FixIt {
                file: PathBuf::from("x.hh"),
                offset: 0,
                line: 1,
                column: 1,
                text: "EXPORT ".to_string(),
            },
            FixIt {
                file: PathBuf::from("x.hh"),
                offset: 10,
                line: 2,
                column: 1,
                text: "EXPORT ".to_string(),
            },
        ];
        let refs: Vec<_> = fixits.iter().chain(fixits.iter()).collect();
        assert_eq!(
            apply_to_text("void f();\nvoid g();\n", &refs),
            "EXPORT void f();\nEXPORT void g();\n"
        );
    }

    #[test]
    fn fixed_sibling_or_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("api.hh");
        fs::write(&path, "void f();\n").expect("write");
        let remarks = vec![remark(&path, 1, "f", 0)];

        let written = apply_fixits(&remarks, false).expect("apply");
        assert_eq!(written, vec![dir.path().join("api.hh.fixed")]);
        assert_eq!(fs::read_to_string(&written[0]).expect("read"), "EXPORT void f();\n");
        assert_eq!(fs::read_to_string(&path).expect("read"), "void f();\n");

        let written = apply_fixits(&remarks, true).expect("apply");
        assert_eq!(written, vec![path.clone()]);
        assert_eq!(fs::read_to_string(&path).expect("read"), "EXPORT void f();\n");
    }

    #[test]
    fn one_header_under_two_names_is_rewritten_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("inc")).expect("mkdir");
        fs::create_dir_all(dir.path().join("src")).expect("mkdir");
        let path = dir.path().join("inc/api.hh");
        fs::write(&path, "void f();\n").expect("write");
        let remarks = vec![
            remark(&path, 1, "f", 0),
            remark(&dir.path().join("src/../inc/api.hh"), 1, "f", 0),
        ];

        let written = apply_fixits(&remarks, true).expect("apply");
        assert_eq!(written, vec![path.clone()]);
        assert_eq!(fs::read_to_string(&path).expect("read"), "EXPORT void f();\n");
    }

    #[test]
    fn json_report_uses_snake_case_kinds() {
        let sink = ReportSink::new(SinkOptions {
            format: OutputFormat::Json,
            apply_fixits: false,
            inplace: false,
        });
        let report = Report {
            translation_units: 1,
            parse_failures: 0,
            remarks: vec![remark(Path::new("api.hh"), 5, "h", 30)],
            rewritten_files: Vec::new(),
        };
        let json = sink.render(&report).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["remarks"][0]["kind"], "unexported_public_interface");
        assert_eq!(value["remarks"][0]["severity"], "remark");
        assert_eq!(value["remarks"][0]["fixit"]["offset"], 30);
        assert!(value.get("rewritten_files").is_none());
    }
}
