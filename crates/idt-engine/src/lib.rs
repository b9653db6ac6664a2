//! # idt-engine
//!
//! Classification of declaration facts into verdicts.
//!
//! - [`IgnoreList`]: identifiers that are never flagged
//! - [`PathPredicate`] / [`InternalPaths`]: library-internal files
//! - [`Policy`]: run-wide settings consulted by the guards
//! - [`classify`] / [`Classifier`]: the ordered decision lists
//! - [`resolve_insertion`]: the edit for a flagged declaration

pub mod classify;
pub mod error;
pub mod ignore_list;
pub mod paths;
pub mod policy;
pub mod resolve;

pub use classify::{Classifier, classify, guard_names};
pub use error::EngineError;
pub use ignore_list::{DEFAULT_IGNORED, IgnoreList};
pub use paths::{InternalPaths, PathPredicate};
pub use policy::Policy;
pub use resolve::resolve_insertion;
