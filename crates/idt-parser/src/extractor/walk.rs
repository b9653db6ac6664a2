//! Tree walk producing one fact per interesting declaration.

use std::collections::{HashMap, HashSet};

use idt_core::{
    ANONYMOUS_RECORD, Access, CoreError, DeclarationFact, FactBuilder, InsertionAnchor,
    RecordKeyword, SourceLocation, TemplateKind,
};
use tracing::debug;

use super::annotations::{AnnotationSpan, export_attr};
use super::declarators::{
    declarators, function_declarator, function_name, is_pure_specifier, is_record_specifier,
    normalize_name, parameter_signature, strip_template_args, variable_name,
};
use crate::parser::CppNode;
use crate::unit::SourceFile;

const PREPROC_KINDS: &[&str] = &[
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
    "preproc_elifdef",
];

/// Facts gathered across every file of a translation unit, finished once
/// all definitions are known.
#[derive(Debug, Default)]
pub(super) struct Collector {
    pending: Vec<(FactBuilder, Option<String>)>,
    definitions: HashSet<String>,
    /// Qualified names of records seen so far, template arguments removed.
    records: HashSet<String>,
    /// Access of each member function declared in a record body.
    members: HashMap<String, Access>,
}

impl Collector {
    /// The access an out-of-line `Owner::member` declaration inherits, or
    /// `None` when `Owner` does not name a record.
    fn member_access(&self, qualified: &str) -> Option<Access> {
        let (owner, member) = qualified.rsplit_once("::")?;
        let record = strip_template_args(owner);
        if self.records.contains(&record) {
            let key = format!("{record}::{member}");
            Some(self.members.get(&key).copied().unwrap_or(Access::Public))
        } else {
            owner.ends_with('>').then_some(Access::Public)
        }
    }

    fn declare_member(&mut self, qualified: &str, access: Access) {
        if let Some((owner, member)) = qualified.rsplit_once("::") {
            self.members
                .entry(format!("{}::{member}", strip_template_args(owner)))
                .or_insert(access);
        }
    }

    fn declare(&mut self, builder: FactBuilder, body_key: Option<String>, has_body: bool) {
        if has_body && let Some(key) = &body_key {
            self.definitions.insert(key.clone());
        }
        self.pending.push((builder, body_key));
    }

    /// Build every fact, marking declarations whose definition appeared
    /// anywhere in the unit.
    pub(super) fn finish(self) -> Result<Vec<DeclarationFact>, CoreError> {
        let definitions = self.definitions;
        self.pending
            .into_iter()
            .map(|(builder, key)| {
                let defined = key.is_some_and(|k| definitions.contains(&k));
                if defined {
                    builder.has_body(true).build()
                } else {
                    builder.build()
                }
            })
            .collect()
    }
}

/// Member access inside a record body.
#[derive(Debug, Clone, Copy)]
struct MemberCtx {
    access: Access,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    namespaces: Vec<String>,
    records: Vec<String>,
    member: Option<MemberCtx>,
    dependent: bool,
    /// Inside `extern "C" <single declaration>`.
    extern_single: bool,
}

impl Scope {
    fn qualify(&self, name: &str) -> String {
        self.namespaces
            .iter()
            .chain(&self.records)
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join("::")
    }

    fn with_access(&self, access: Access) -> Self {
        let mut scope = self.clone();
        scope.member = Some(MemberCtx { access });
        scope
    }

    /// The enclosing namespace scope, as seen by a friend declaration.
    fn outside_records(&self) -> Self {
        let mut scope = self.clone();
        scope.records.clear();
        scope.member = None;
        scope
    }
}

/// The template header a declaration sits under.
#[derive(Debug, Clone, Copy)]
struct TemplateCtx {
    outer_start: usize,
    kind: TemplateKind,
}

struct FunctionSite<'n, 'r> {
    decl: &'n CppNode<'r>,
    function: &'n CppNode<'r>,
    template: Option<TemplateCtx>,
    friend: bool,
}

pub(super) struct Walker<'a> {
    file: &'a SourceFile,
    collector: &'a mut Collector,
}

impl<'a> Walker<'a> {
    pub(super) const fn new(file: &'a SourceFile, collector: &'a mut Collector) -> Self {
        Self { file, collector }
    }

    pub(super) fn walk(&mut self, root: &CppNode<'_>) {
        self.visit_items(root, &Scope::default());
    }

    fn visit_items(&mut self, node: &CppNode<'_>, scope: &Scope) {
        for child in node.children() {
            self.visit_item(&child, scope, None);
        }
    }

    fn visit_members(&mut self, body: &CppNode<'_>, scope: &Scope, access: &mut Access) {
        for child in body.children() {
            let kind = child.kind();
            match kind.as_ref() {
                "access_specifier" => {
                    if let Some(label) = Access::from_label(&child.text()) {
                        *access = label;
                    }
                }
                k if PREPROC_KINDS.contains(&k) => self.visit_members(&child, scope, access),
                _ => self.visit_item(&child, &scope.with_access(*access), None),
            }
        }
    }

    fn visit_item(&mut self, node: &CppNode<'_>, scope: &Scope, template: Option<TemplateCtx>) {
        let kind = node.kind();
        match kind.as_ref() {
            "namespace_definition" => self.namespace(node, scope),
            "linkage_specification" => self.linkage(node, scope),
            k if PREPROC_KINDS.contains(&k) => self.visit_items(node, scope),
            "template_declaration" => self.template(node, scope, template),
            "template_instantiation" => self.instantiation(node, scope),
            "function_definition" => self.function_definition(node, scope, template, false),
            "declaration" | "field_declaration" => self.declaration(node, scope, template),
            "friend_declaration" => self.friend(node, scope),
            "type_definition" => {
                if let Some(ty) = node.field("type")
                    && is_record_specifier(&ty)
                    && ty.field("body").is_some()
                {
                    self.record(&ty, scope, None);
                }
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                self.record(node, scope, template);
            }
            _ => {}
        }
    }

    // ── Scopes ─────────────────────────────────────────────────────

    fn namespace(&mut self, node: &CppNode<'_>, scope: &Scope) {
        let Some(body) = node.field("body") else {
            return;
        };
        let Some(name) = node.field("name") else {
            debug!(
                file = %self.file.path.display(),
                line = self.file.lines.position(node.range().start).line,
                "skipping anonymous namespace"
            );
            return;
        };
        let mut inner = scope.clone();
        inner.namespaces.extend(
            normalize_name(&name.text())
                .split("::")
                .filter(|segment| !segment.is_empty())
                .map(ToString::to_string),
        );
        self.visit_items(&body, &inner);
    }

    fn linkage(&mut self, node: &CppNode<'_>, scope: &Scope) {
        let Some(body) = node.field("body") else {
            return;
        };
        if body.kind().as_ref() == "declaration_list" {
            self.visit_items(&body, scope);
        } else {
            let mut inner = scope.clone();
            inner.extern_single = true;
            self.visit_item(&body, &inner, None);
        }
    }

    fn template(&mut self, node: &CppNode<'_>, scope: &Scope, outer: Option<TemplateCtx>) {
        let empty_parameters = node
            .children()
            .find(|c| c.kind().as_ref() == "template_parameter_list")
            .is_some_and(|params| !params.children().any(|p| p.is_named() && p.kind().as_ref() != "comment"));
        let kind = if empty_parameters
            && outer.is_none_or(|o| o.kind == TemplateKind::ExplicitSpecialization)
        {
            TemplateKind::ExplicitSpecialization
        } else {
            TemplateKind::Template
        };
        let ctx = TemplateCtx {
            outer_start: outer.map_or_else(|| node.range().start, |o| o.outer_start),
            kind,
        };
        let mut inner = scope.clone();
        if kind == TemplateKind::Template {
            inner.dependent = true;
        }
        for child in node.children() {
            if child.is_named() && child.kind().as_ref() != "template_parameter_list" {
                self.visit_item(&child, &inner, Some(ctx));
            }
        }
    }

    /// `template ...;`, or `extern template ...;` with the `extern` masked.
    fn instantiation(&mut self, node: &CppNode<'_>, scope: &Scope) {
        let extern_start = self.file.masked.extern_template_before(node.range().start);
        let kind = if extern_start.is_some() {
            TemplateKind::ExplicitInstantiationDecl
        } else {
            TemplateKind::ExplicitInstantiationDef
        };
        let outer_start = extern_start.unwrap_or_else(|| node.range().start);

        if let Some(spec) = node.children().find(is_record_specifier) {
            self.class_instantiation(outer_start, &spec, scope, kind);
            return;
        }

        let ctx = TemplateCtx { outer_start, kind };
        for declarator in declarators(node) {
            if let Some(function) = function_declarator(&declarator) {
                self.function(
                    &FunctionSite {
                        decl: node,
                        function: &function,
                        template: Some(ctx),
                        friend: false,
                    },
                    scope,
                );
            }
        }
    }

    // ── Records ────────────────────────────────────────────────────

    fn record(&mut self, spec: &CppNode<'_>, scope: &Scope, template: Option<TemplateCtx>) {
        let Some((keyword, keyword_offset)) = record_keyword(spec) else {
            return;
        };
        let name_node = spec.field("name");
        let name = name_node
            .as_ref()
            .map_or_else(|| ANONYMOUS_RECORD.to_string(), |n| normalize_name(&n.text()));
        let body = spec.field("body");
        let spec_range = spec.range();
        if name_node.is_some() {
            self.collector
                .records
                .insert(strip_template_args(&scope.qualify(&name)));
        }

        // Primary templates and partial specializations cannot be exported.
        let primary_template = template.is_some_and(|t| t.kind == TemplateKind::Template);
        if !primary_template {
            let name_start = name_node.as_ref().map_or_else(
                || body.as_ref().map_or(spec_range.end, |b| b.range().start),
                |n| n.range().start,
            );
            let name_end = name_node.as_ref().map_or(name_start, |n| n.range().end);
            let start = template.map_or(spec_range.start, |t| t.outer_start);
            let span = AnnotationSpan {
                head: spec_range.start..name_end,
                inner_start: spec_range.start,
                name_start,
            };
            let mut builder = FactBuilder::record(
                scope.qualify(&name),
                self.location(start, name_end),
                keyword_offset,
                keyword,
            )
            .complete_definition(body.is_some())
            .nested(scope.member.is_some())
            .dependent_context(scope.dependent)
            .export_attr(export_attr(self.file, &span))
            .from_included_file(self.file.from_included_file);
            if let Some(t) = template {
                builder = builder.template_kind(t.kind);
            }
            self.collector.declare(builder, None, false);
        }

        if let Some(body) = body {
            let mut inner = scope.clone();
            inner.records.push(name);
            let mut access = keyword.default_access();
            self.visit_members(&body, &inner, &mut access);
        }
    }

    fn class_instantiation(
        &mut self,
        start: usize,
        spec: &CppNode<'_>,
        scope: &Scope,
        kind: TemplateKind,
    ) {
        let Some((keyword, keyword_offset)) = record_keyword(spec) else {
            return;
        };
        let Some(name) = spec.field("name") else {
            return;
        };
        let name_range = name.range();
        let span = AnnotationSpan {
            head: start..name_range.end,
            inner_start: start,
            name_start: name_range.start,
        };
        let builder = FactBuilder::template_specialization(
            scope.qualify(&normalize_name(&name.text())),
            self.location(start, name_range.end),
            keyword_offset,
            keyword,
        )
        .template_kind(kind)
        .dependent_context(scope.dependent)
        .export_attr(export_attr(self.file, &span))
        .from_included_file(self.file.from_included_file);
        self.collector.declare(builder, None, false);
    }

    // ── Declarations ───────────────────────────────────────────────

    fn declaration(&mut self, node: &CppNode<'_>, scope: &Scope, template: Option<TemplateCtx>) {
        let declared = declarators(node);
        if let Some(ty) = node.field("type")
            && is_record_specifier(&ty)
            && (ty.field("body").is_some() || declared.is_empty())
        {
            self.record(&ty, scope, template);
        }

        let storage = storage_classes(node);
        for declarator in &declared {
            if let Some(function) = function_declarator(declarator) {
                self.function(
                    &FunctionSite {
                        decl: node,
                        function: &function,
                        template,
                        friend: false,
                    },
                    scope,
                );
            } else if scope.member.is_none() && template.is_none() {
                self.variable(node, declarator, scope, &storage);
            }
        }
    }

    fn function_definition(
        &mut self,
        node: &CppNode<'_>,
        scope: &Scope,
        template: Option<TemplateCtx>,
        friend: bool,
    ) {
        let Some(function) = node
            .field("declarator")
            .and_then(|d| function_declarator(&d))
        else {
            return;
        };
        self.function(
            &FunctionSite {
                decl: node,
                function: &function,
                template,
                friend,
            },
            scope,
        );
    }

    fn friend(&mut self, node: &CppNode<'_>, scope: &Scope) {
        let outer = scope.outside_records();
        for child in node.children() {
            match child.kind().as_ref() {
                "declaration" => {
                    for declarator in declarators(&child) {
                        if let Some(function) = function_declarator(&declarator) {
                            self.function(
                                &FunctionSite {
                                    decl: &child,
                                    function: &function,
                                    template: None,
                                    friend: true,
                                },
                                &outer,
                            );
                        }
                    }
                }
                "function_definition" => self.function_definition(&child, &outer, None, true),
                _ => {}
            }
        }
    }

    fn function(&mut self, site: &FunctionSite<'_, '_>, scope: &Scope) {
        let Some(name_node) = function_name(site.function) else {
            return;
        };
        let name = normalize_name(&name_node.text());
        if name.is_empty() {
            return;
        }
        let decl = site.decl;
        if scope.member.is_none()
            && !site.friend
            && !name.contains("::")
            && storage_classes(decl).iter().any(|s| s == "static")
        {
            debug!(name = %name, "skipping function with internal linkage");
            return;
        }

        let qualified = scope.qualify(&name);
        let defaulted = has_child(decl, "default_method_clause");
        let deleted = has_child(decl, "delete_method_clause");
        let has_body = decl.kind().as_ref() == "function_definition" && !defaulted && !deleted;

        let decl_range = decl.range();
        let start = site.template.map_or(decl_range.start, |t| t.outer_start);
        let inner = inner_start(decl);
        let name_range = name_node.range();
        let span = AnnotationSpan {
            head: start..decl.field("body").map_or(decl_range.end, |b| b.range().start),
            inner_start: inner,
            name_start: name_range.start,
        };
        let anchor = if site.template.is_some() {
            InsertionAnchor::TemplatedInner { offset: inner }
        } else {
            InsertionAnchor::DeclarationBegin { offset: inner }
        };
        let location = self.location(start, name_range.end);

        // `void W<int>::m();` at namespace scope declares a member of `W`.
        let access = match scope.member {
            _ if site.friend => None,
            Some(member) => {
                self.collector.declare_member(&qualified, member.access);
                Some(member.access)
            }
            None if name.contains("::") => self.collector.member_access(&qualified),
            None => None,
        };
        let builder = match access {
            Some(access) => FactBuilder::method(qualified.clone(), location, anchor, access)
                .pure_virtual(is_pure_specifier(decl)),
            None => FactBuilder::function(qualified.clone(), location, anchor),
        }
        .from_included_file(self.file.from_included_file)
        .has_body(has_body)
        .dependent_context(scope.dependent)
        .friend(site.friend)
        .deleted(deleted)
        .defaulted(defaulted)
        .export_attr(export_attr(self.file, &span))
        .template_kind(site.template.map_or(TemplateKind::NonTemplate, |t| t.kind));

        let key = format!("{qualified}({})", parameter_signature(site.function));
        self.collector.declare(builder, Some(key), has_body);
    }

    fn variable(
        &mut self,
        node: &CppNode<'_>,
        declarator: &CppNode<'_>,
        scope: &Scope,
        storage: &[String],
    ) {
        let Some(name_node) = variable_name(declarator) else {
            return;
        };
        let name = normalize_name(&name_node.text());
        if name.is_empty() {
            return;
        }
        let external = storage.iter().any(|s| s == "extern") || scope.extern_single;
        let start = node.range().start;
        let inner = inner_start(node);
        let name_range = name_node.range();
        let span = AnnotationSpan {
            head: start..declarator.range().end,
            inner_start: inner,
            name_start: name_range.start,
        };
        let builder = FactBuilder::variable(
            scope.qualify(&name),
            self.location(start, name_range.end),
            InsertionAnchor::DeclarationBegin { offset: inner },
        )
        .external_storage(external)
        .dependent_context(scope.dependent)
        .export_attr(export_attr(self.file, &span))
        .from_included_file(self.file.from_included_file);
        self.collector.declare(builder, None, false);
    }

    fn location(&self, start: usize, end: usize) -> SourceLocation {
        SourceLocation::new(self.file.path.clone(), self.file.lines.position(start))
            .in_system_header(self.file.is_system)
            .from_macro_expansion(self.file.masked.touches(start..end))
    }
}

/// The class-key token of a record specifier and its offset.
fn record_keyword(spec: &CppNode<'_>) -> Option<(RecordKeyword, usize)> {
    spec.children().find_map(|c| {
        if c.is_named() {
            return None;
        }
        RecordKeyword::from_keyword(&c.text()).map(|k| (k, c.range().start))
    })
}

fn storage_classes(node: &CppNode<'_>) -> Vec<String> {
    node.children()
        .filter(|c| c.kind().as_ref() == "storage_class_specifier")
        .map(|c| c.text().trim().to_string())
        .collect()
}

fn has_child(node: &CppNode<'_>, kind: &str) -> bool {
    node.children().any(|c| c.kind().as_ref() == kind)
}

/// Where the declaration proper begins: after leading `[[...]]` attributes
/// and the `extern`/`template` keywords of an explicit instantiation.
fn inner_start(node: &CppNode<'_>) -> usize {
    node.children()
        .find(|c| {
            if c.kind().as_ref() == "attribute_declaration" {
                return false;
            }
            c.is_named() || !matches!(c.text().as_ref(), "extern" | "template")
        })
        .map_or_else(|| node.range().start, |c| c.range().start)
}
