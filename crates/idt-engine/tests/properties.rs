use idt_core::{
    Access, ExportAttr, FactBuilder, InsertionAnchor, Position, RecordKeyword, SkipReason,
    SourceLocation, TemplateKind, Verdict,
};
use idt_engine::{IgnoreList, Policy, classify, resolve_insertion};
use pretty_assertions::assert_eq;

fn header() -> SourceLocation {
    SourceLocation::new("include/api.hh", Position::new(0, 1, 1))
}

fn run(builder: FactBuilder, ignore: &[&str], annotate_classes: bool) -> Verdict {
    let fact = builder.build().expect("valid fact");
    let policy = Policy::new("EXPORT")
        .expect("policy")
        .with_annotate_classes(annotate_classes);
    classify(&fact, &IgnoreList::with_defaults(ignore.iter().copied()), &policy)
}

#[test]
fn noexcept_prototype_flags_with_macro_text() {
    // void f() noexcept;
    let f = || {
        FactBuilder::function("f", header(), InsertionAnchor::DeclarationBegin { offset: 0 })
            .from_included_file(true)
    };

    let verdict = run(f(), &[], true);
    let insertion = resolve_insertion(&verdict, "EXPORT").expect("fixable");
    assert_eq!(insertion.offset, 0);
    assert_eq!(insertion.text, "EXPORT ");

    assert_eq!(run(f(), &["f"], true), Verdict::skip(SkipReason::IgnoredName));
}

#[test]
fn defaulted_constructor_is_skipped() {
    // struct record { record() = default; };
    let ctor = FactBuilder::method(
        "record::record",
        header(),
        InsertionAnchor::DeclarationBegin { offset: 16 },
        Access::Public,
    )
    .defaulted(true);
    assert!(run(ctor, &[], false).is_skip());
}

#[test]
fn pure_virtual_without_class_annotation_is_skipped() {
    // struct pure_virtual { virtual void m() = 0; };
    let m = FactBuilder::method(
        "pure_virtual::m",
        header(),
        InsertionAnchor::DeclarationBegin { offset: 22 },
        Access::Public,
    )
    .pure_virtual(true);
    assert_eq!(run(m, &[], false), Verdict::skip(SkipReason::PureVirtual));
}

#[test]
fn explicit_function_specialization_inserts_after_template_header() {
    // template <> void tpl<char>(char&);
    let source = "template <> void tpl<char>(char&);";
    let inner = source.find("void").expect("inner declaration");
    let fact = FactBuilder::function(
        "tpl<char>",
        header(),
        InsertionAnchor::TemplatedInner { offset: inner },
    )
    .template_kind(TemplateKind::ExplicitSpecialization);

    let insertion = resolve_insertion(&run(fact, &[], true), "EXPORT").expect("fixable");
    let mut fixed = source.to_string();
    fixed.insert_str(insertion.offset, &insertion.text);
    assert_eq!(fixed, "template <> EXPORT void tpl<char>(char&);");
}

#[test]
fn annotated_declaration_is_stable() {
    let annotated =
        FactBuilder::function("f", header(), InsertionAnchor::DeclarationBegin { offset: 0 })
            .export_attr(ExportAttr::Export);
    assert_eq!(
        run(annotated, &[], true),
        Verdict::skip(SkipReason::AlreadyAnnotated)
    );
}

#[test]
fn class_annotation_toggle_moves_work_between_records_and_methods() {
    let record = || {
        FactBuilder::record("widget", header(), 0, RecordKeyword::Class)
            .complete_definition(true)
            .from_included_file(true)
    };
    let method = || {
        FactBuilder::method(
            "widget::draw",
            header(),
            InsertionAnchor::DeclarationBegin { offset: 30 },
            Access::Public,
        )
    };

    assert!(!run(record(), &[], true).is_skip());
    assert!(run(method(), &[], true).is_skip());

    assert_eq!(
        run(record(), &[], false),
        Verdict::skip(SkipReason::ClassesNotAnnotated)
    );
    assert!(!run(method(), &[], false).is_skip());
}
