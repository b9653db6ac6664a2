//! Fix-it application settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FixitsConfig {
    /// Materialize suggested insertions into files.
    #[serde(default)]
    pub apply: bool,

    /// Overwrite the original file instead of writing `<file>.fixed`.
    #[serde(default)]
    pub inplace: bool,
}
