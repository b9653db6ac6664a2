//! Cross-cutting error types for idt.
//!
//! Domain-specific errors (`ConfigError`, `ParserError`, `EngineError`) live in
//! their respective crates. They converge into `anyhow` in `idt-cli`.

use thiserror::Error;

/// Errors raised while building core model values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A declaration fact was built without a name.
    #[error("Declaration at {file}:{line}:{column} has an empty name")]
    EmptyName {
        file: String,
        line: u32,
        column: u32,
    },

    /// A kind-specific attribute was attached to the wrong declaration kind.
    #[error("Attribute '{attribute}' is not meaningful for {kind} declarations")]
    MismatchedAttribute {
        attribute: &'static str,
        kind: &'static str,
    },
}
