//! Check pipeline: load → extract → classify, one translation unit per task.
//!
//! Units are processed in parallel with rayon. Outcomes come back in input
//! order and remarks within a unit in declaration order, so output is stable
//! regardless of scheduling.

use std::path::{Path, PathBuf};

use idt_core::{DeclarationFact, FixIt, Insertion, Remark, RemarkKind, Verdict};
use idt_engine::Classifier;
use idt_parser::{ParserError, TranslationUnit, UnitLoader, extract_unit};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// What one command-line input produced.
#[derive(Debug)]
pub struct UnitOutcome {
    pub main: PathBuf,
    pub result: Result<Vec<Remark>, ParserError>,
}

pub struct Pipeline<'a> {
    loader: &'a UnitLoader,
    classifier: Classifier<'a>,
}

impl<'a> Pipeline<'a> {
    pub const fn new(loader: &'a UnitLoader, classifier: Classifier<'a>) -> Self {
        Self { loader, classifier }
    }

    pub fn run(&self, inputs: &[PathBuf]) -> Vec<UnitOutcome> {
        inputs.par_iter().map(|path| self.process(path)).collect()
    }

    fn process(&self, path: &Path) -> UnitOutcome {
        if self.classifier.policy().is_internal(path) {
            debug!(file = %path.display(), "input matches an internal path pattern");
        }
        let result = self.loader.load(path).and_then(|unit| {
            let facts = extract_unit(&unit)?;
            Ok(self.remarks(&unit, &facts))
        });

        match &result {
            Ok(remarks) => info!(
                file = %path.display(),
                remarks = remarks.len(),
                "checked translation unit"
            ),
            Err(error) => warn!(file = %path.display(), %error, "translation unit not checked"),
        }

        UnitOutcome {
            main: path.to_path_buf(),
            result,
        }
    }

    fn remarks(&self, unit: &TranslationUnit, facts: &[DeclarationFact]) -> Vec<Remark> {
        self.classifier
            .classify_all(facts)
            .filter_map(|(fact, verdict)| self.remark(unit, fact, &verdict))
            .collect()
    }

    fn remark(&self, unit: &TranslationUnit, fact: &DeclarationFact, verdict: &Verdict) -> Option<Remark> {
        let kind = match verdict {
            Verdict::Skip { .. } => return None,
            Verdict::FlagUnexported { .. } => RemarkKind::UnexportedPublicInterface,
            Verdict::FlagOverExportedPrivate => RemarkKind::ExportedPrivateInterface,
        };
        let location = fact.location();
        Some(Remark {
            file: location.file().to_path_buf(),
            line: location.line(),
            column: location.column(),
            severity: kind.severity(),
            kind,
            name: fact.qualified_name().to_string(),
            fixit: self
                .classifier
                .fixit(verdict)
                .map(|insertion| fixit_for(unit, fact, insertion)),
        })
    }
}

/// Place an insertion in the owning file, with its line and column.
fn fixit_for(unit: &TranslationUnit, fact: &DeclarationFact, insertion: Insertion) -> FixIt {
    let file = fact.owning_file();
    let (line, column) = unit.file(file).map_or_else(
        || (fact.location().line(), fact.location().column()),
        |source| {
            let position = source.lines.position(insertion.offset);
            (position.line, position.column)
        },
    );
    FixIt {
        file: file.to_path_buf(),
        offset: insertion.offset,
        line,
        column,
        text: insertion.text,
    }
}

/// The diagnostic for a unit that could not be checked.
pub fn parse_failure(main: &Path, error: &ParserError) -> Remark {
    let (file, line, column) = error
        .location()
        .map_or_else(|| (main.to_path_buf(), 1, 1), |(f, l, c)| (f.to_path_buf(), l, c));
    let name = match error {
        ParserError::Syntax { snippet, .. } => snippet.clone(),
        _ => file.display().to_string(),
    };
    Remark {
        file,
        line,
        column,
        severity: RemarkKind::ParseError.severity(),
        kind: RemarkKind::ParseError,
        name,
        fixit: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idt_engine::{IgnoreList, InternalPaths, Policy};
    use idt_parser::{LoaderOptions, MacroSet};
    use pretty_assertions::assert_eq;

    fn loader() -> UnitLoader {
        UnitLoader::new(
            LoaderOptions {
                follow_includes: true,
                ..LoaderOptions::default()
            },
            MacroSet::new(["IDT_TEST_ABI"], Vec::<&str>::new()),
        )
    }

    fn policy() -> Policy {
        Policy::new("IDT_TEST_ABI")
            .expect("policy")
            .with_internal_paths(InternalPaths::none())
    }

    #[test]
    fn remarks_keep_input_and_declaration_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("a.hh");
        let b = dir.path().join("b.hh");
        std::fs::write(&a, "void a1();\nvoid a2();\n").expect("write");
        std::fs::write(&b, "void b1();\n").expect("write");

        let loader = loader();
        let ignore = IgnoreList::with_defaults(Vec::<String>::new());
        let policy = policy();
        let pipeline = Pipeline::new(&loader, Classifier::new(&ignore, &policy));

        let outcomes = pipeline.run(&[a.clone(), b.clone()]);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].main, a);
        let names: Vec<_> = outcomes
            .iter()
            .flat_map(|o| o.result.as_ref().expect("parsed"))
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn fixit_carries_line_and_column() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("t.hh");
        std::fs::write(&path, "// header\ntemplate <> void t<char>(char &);\n").expect("write");

        let loader = loader();
        let ignore = IgnoreList::with_defaults(Vec::<String>::new());
        let policy = policy();
        let pipeline = Pipeline::new(&loader, Classifier::new(&ignore, &policy));

        let outcomes = pipeline.run(std::slice::from_ref(&path));
        let remarks = outcomes[0].result.as_ref().expect("parsed");
        assert_eq!(remarks.len(), 1);
        let remark = &remarks[0];
        assert_eq!((remark.line, remark.column), (2, 1));
        let fixit = remark.fixit.as_ref().expect("fixit");
        assert_eq!((fixit.line, fixit.column), (2, 13));
        assert_eq!(fixit.text, "IDT_TEST_ABI ");
    }

    #[test]
    fn report_only_has_no_fixits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("r.hh");
        std::fs::write(&path, "void r();\n").expect("write");

        let loader = loader();
        let ignore = IgnoreList::with_defaults(Vec::<String>::new());
        let policy = policy().with_report_only(true);
        let pipeline = Pipeline::new(&loader, Classifier::new(&ignore, &policy));

        let outcomes = pipeline.run(std::slice::from_ref(&path));
        let remarks = outcomes[0].result.as_ref().expect("parsed");
        assert_eq!(remarks.len(), 1);
        assert!(remarks[0].fixit.is_none());
    }

    #[test]
    fn unreadable_input_is_a_failed_unit() {
        let loader = loader();
        let ignore = IgnoreList::with_defaults(Vec::<String>::new());
        let policy = policy();
        let pipeline = Pipeline::new(&loader, Classifier::new(&ignore, &policy));

        let missing = PathBuf::from("/nonexistent/idt/missing.hh");
        let outcomes = pipeline.run(std::slice::from_ref(&missing));
        let error = outcomes[0].result.as_ref().expect_err("should fail");
        let remark = parse_failure(&missing, error);
        assert_eq!(remark.kind, RemarkKind::ParseError);
        assert_eq!(remark.file, missing);
    }
}
