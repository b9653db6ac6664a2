//! Ordered decision lists deciding whether a declaration needs an annotation.
//!
//! Every declaration kind has its own list of guards. Guards run in order and
//! the first one returning a verdict decides; a list always ends with a rule
//! that flags, so classification is total.

use idt_core::{
    Access, DeclarationFact, DeclarationKind, Insertion, InsertionPoint, SkipReason, Verdict,
};
use tracing::debug;

use crate::ignore_list::IgnoreList;
use crate::policy::Policy;
use crate::resolve::resolve_insertion;

/// Inputs shared by every guard.
struct Context<'a> {
    ignore: &'a IgnoreList,
    policy: &'a Policy,
}

type Check = fn(&DeclarationFact, &Context<'_>) -> Option<Verdict>;

/// One named step of a decision list.
struct Rule {
    name: &'static str,
    check: Check,
}

const fn rule(name: &'static str, check: Check) -> Rule {
    Rule { name, check }
}

const FUNCTION_RULES: &[Rule] = &[
    rule("internal_path", internal_path),
    rule("system_header", system_header),
    rule("dependent_context", |fact, _| {
        fact.is_dependent_context()
            .then_some(Verdict::skip(SkipReason::DependentContext))
    }),
    rule("has_body", |fact, _| {
        fact.has_body().then_some(Verdict::skip(SkipReason::HasBody))
    }),
    rule("friend", |fact, _| {
        fact.is_friend().then_some(Verdict::skip(SkipReason::Friend))
    }),
    rule("deleted_or_defaulted", |fact, _| {
        (fact.is_deleted() || fact.is_defaulted())
            .then_some(Verdict::skip(SkipReason::DeletedOrDefaulted))
    }),
    rule("class_annotation_subsumes", |fact, cx| {
        (fact.kind() == DeclarationKind::Method && cx.policy.annotate_classes())
            .then_some(Verdict::skip(SkipReason::ClassAnnotationSubsumes))
    }),
    rule("private_member", |fact, _| {
        if fact.access() != Some(Access::Private) {
            return None;
        }
        Some(if fact.export_attr().is_annotated() {
            Verdict::FlagOverExportedPrivate
        } else {
            Verdict::skip(SkipReason::PrivateMember)
        })
    }),
    rule("pure_virtual", |fact, _| {
        fact.is_pure_virtual()
            .then_some(Verdict::skip(SkipReason::PureVirtual))
    }),
    rule("already_annotated", already_annotated),
    rule("ignored_name", |fact, cx| {
        cx.ignore
            .contains(fact.bare_name())
            .then_some(Verdict::skip(SkipReason::IgnoredName))
    }),
];

const RECORD_RULES: &[Rule] = &[
    rule("classes_not_annotated", classes_not_annotated),
    rule("reserved_name", reserved_name),
    rule("internal_path", internal_path),
    rule("system_header", system_header),
    rule("incomplete_definition", |fact, _| {
        (!fact.is_complete_definition()).then_some(Verdict::skip(SkipReason::IncompleteDefinition))
    }),
    rule("nested", |fact, _| {
        fact.is_nested().then_some(Verdict::skip(SkipReason::Nested))
    }),
    rule("already_annotated", already_annotated),
    rule("union", union),
    rule("not_from_header", not_from_header),
    rule("explicit_instantiation", |fact, _| {
        fact.template_kind()
            .is_explicit_instantiation()
            .then_some(Verdict::skip(SkipReason::ExplicitInstantiation))
    }),
];

const VARIABLE_RULES: &[Rule] = &[
    rule("internal_path", internal_path),
    rule("system_header", system_header),
    rule("already_annotated", already_annotated),
    rule("no_external_storage", |fact, _| {
        (!fact.has_external_storage()).then_some(Verdict::skip(SkipReason::NoExternalStorage))
    }),
];

const TEMPLATE_SPECIALIZATION_RULES: &[Rule] = &[
    rule("classes_not_annotated", classes_not_annotated),
    rule("reserved_name", reserved_name),
    rule("internal_path", internal_path),
    rule("system_header", system_header),
    rule("already_annotated", already_annotated),
    rule("union", union),
    rule("not_from_header", not_from_header),
];

fn internal_path(fact: &DeclarationFact, cx: &Context<'_>) -> Option<Verdict> {
    cx.policy
        .is_internal(fact.owning_file())
        .then_some(Verdict::skip(SkipReason::InternalPath))
}

fn system_header(fact: &DeclarationFact, _: &Context<'_>) -> Option<Verdict> {
    fact.is_in_system_header()
        .then_some(Verdict::skip(SkipReason::SystemHeader))
}

fn already_annotated(fact: &DeclarationFact, _: &Context<'_>) -> Option<Verdict> {
    fact.export_attr()
        .is_annotated()
        .then_some(Verdict::skip(SkipReason::AlreadyAnnotated))
}

fn classes_not_annotated(_: &DeclarationFact, cx: &Context<'_>) -> Option<Verdict> {
    (!cx.policy.annotate_classes()).then_some(Verdict::skip(SkipReason::ClassesNotAnnotated))
}

fn reserved_name(fact: &DeclarationFact, cx: &Context<'_>) -> Option<Verdict> {
    cx.policy
        .is_reserved(fact.qualified_name(), fact.bare_name())
        .then_some(Verdict::skip(SkipReason::ReservedName))
}

fn union(fact: &DeclarationFact, _: &Context<'_>) -> Option<Verdict> {
    fact.is_union().then_some(Verdict::skip(SkipReason::Union))
}

fn not_from_header(fact: &DeclarationFact, _: &Context<'_>) -> Option<Verdict> {
    (!fact.from_included_file()).then_some(Verdict::skip(SkipReason::NotFromHeader))
}

const fn rules_for(kind: DeclarationKind) -> &'static [Rule] {
    match kind {
        DeclarationKind::Function | DeclarationKind::Method => FUNCTION_RULES,
        DeclarationKind::Record => RECORD_RULES,
        DeclarationKind::Variable => VARIABLE_RULES,
        DeclarationKind::TemplateSpecialization => TEMPLATE_SPECIALIZATION_RULES,
    }
}

/// Classify one declaration.
///
/// Pure: the same fact, ignore list, and policy always give the same verdict.
#[must_use]
pub fn classify(fact: &DeclarationFact, ignore: &IgnoreList, policy: &Policy) -> Verdict {
    let cx = Context { ignore, policy };
    for rule in rules_for(fact.kind()) {
        if let Some(verdict) = (rule.check)(fact, &cx) {
            if verdict.is_skip() {
                debug!(
                    name = fact.qualified_name(),
                    kind = fact.kind().as_str(),
                    guard = rule.name,
                    "skipped declaration"
                );
            }
            return verdict;
        }
    }
    Verdict::FlagUnexported {
        insertion_point: InsertionPoint {
            offset: fact.insertion_anchor().offset(),
        },
        macro_text: policy.export_macro().to_string(),
    }
}

/// Names of the guards consulted for `kind`, in evaluation order.
#[must_use]
pub fn guard_names(kind: DeclarationKind) -> Vec<&'static str> {
    rules_for(kind).iter().map(|r| r.name).collect()
}

/// Classification bound to one run's ignore list and policy.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    ignore: &'a IgnoreList,
    policy: &'a Policy,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub const fn new(ignore: &'a IgnoreList, policy: &'a Policy) -> Self {
        Self { ignore, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &'a Policy {
        self.policy
    }

    #[must_use]
    pub fn classify(&self, fact: &DeclarationFact) -> Verdict {
        classify(fact, self.ignore, self.policy)
    }

    /// Classify `facts` lazily, preserving encounter order.
    pub fn classify_all<'f, I>(&self, facts: I) -> impl Iterator<Item = (&'f DeclarationFact, Verdict)>
    where
        I: IntoIterator<Item = &'f DeclarationFact>,
    {
        let this = *self;
        facts.into_iter().map(move |fact| (fact, this.classify(fact)))
    }

    /// The edit for a verdict, or `None` when it is not fixable or the run
    /// is report-only.
    #[must_use]
    pub fn fixit(&self, verdict: &Verdict) -> Option<Insertion> {
        if self.policy.report_only() {
            return None;
        }
        resolve_insertion(verdict, self.policy.export_macro())
    }
}
