use super::*;
use idt_core::{
    Access, DeclarationFact, DeclarationKind, ExportAttr, SkipReason, TemplateKind, Verdict,
};
use idt_engine::{IgnoreList, Policy, classify, resolve_insertion};


fn macros() -> MacroSet {
    MacroSet::new(["LIB_ABI"], ["LIB_DEPRECATED"])
}

fn facts(path: &str, source: &str) -> Vec<DeclarationFact> {
    extract_source(path, source, &macros()).expect("extraction should succeed")
}

fn find<'a>(facts: &'a [DeclarationFact], name: &str) -> &'a DeclarationFact {
    facts
        .iter()
        .find(|f| f.qualified_name() == name)
        .unwrap_or_else(|| {
            let available: Vec<_> = facts
                .iter()
                .map(|f| format!("{:?}: {}", f.kind(), f.qualified_name()))
                .collect();
            panic!("no fact named {name:?}, available: {available:?}")
        })
}

fn absent(facts: &[DeclarationFact], name: &str) {
    assert!(
        facts.iter().all(|f| f.qualified_name() != name),
        "{name} should not produce a fact"
    );
}

fn verdict(fact: &DeclarationFact, ignore: &[&str], annotate_classes: bool) -> Verdict {
    let policy = Policy::new("IDT_TEST_ABI")
        .expect("policy")
        .with_annotate_classes(annotate_classes);
    classify(fact, &IgnoreList::with_defaults(ignore.iter().copied()), &policy)
}

/// Names of the declarations that would be reported.
fn flagged(facts: &[DeclarationFact], ignore: &[&str], annotate_classes: bool) -> Vec<String> {
    facts
        .iter()
        .filter(|f| !verdict(f, ignore, annotate_classes).is_skip())
        .map(|f| f.qualified_name().to_string())
        .collect()
}
