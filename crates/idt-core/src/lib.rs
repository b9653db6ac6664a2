//! # idt-core
//!
//! Core types shared by every idt crate.
//!
//! This crate provides the data model the rest of the workspace is built on:
//! - Declaration kinds and attribute enums (access, export, template kind)
//! - Source positions and expansion-aware source locations
//! - The immutable `DeclarationFact` snapshot and its builder
//! - Classification verdicts and the guard that produced a skip
//! - Report records emitted by the reporting sink
//! - Cross-cutting error types

pub mod errors;
pub mod fact;
pub mod kinds;
pub mod location;
pub mod report;
pub mod verdict;

pub use errors::CoreError;
pub use fact::{ANONYMOUS_RECORD, DeclarationFact, FactBuilder, InsertionAnchor, MethodFacts, RecordFacts};
pub use kinds::{Access, DeclarationKind, ExportAttr, RecordKeyword, TemplateKind};
pub use location::{Position, SourceLocation};
pub use report::{FixIt, Remark, RemarkKind, Report, Severity};
pub use verdict::{Insertion, InsertionPoint, SkipReason, Verdict};
