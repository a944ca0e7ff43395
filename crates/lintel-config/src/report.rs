//! Report rendering configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportConfig {
    /// List every warning and info notice instead of summarising them.
    #[serde(default)]
    pub verbose: bool,
}
