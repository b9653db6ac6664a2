//! Engine error types.

/// Errors raised while assembling a [`Policy`](crate::Policy).
///
/// Classification itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid internal-path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Export macro must not be empty")]
    EmptyExportMacro,
}
