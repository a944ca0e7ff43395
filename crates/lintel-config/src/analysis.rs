//! Analysis configuration.

use serde::{Deserialize, Serialize};

use lintel_core::layout::DEFAULT_MARKER;

fn default_framework_dir() -> String {
    DEFAULT_MARKER.to_string()
}

const fn default_use_cache() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Name of the framework directory under the project root. Also the
    /// marker used in `./<marker>/...` cross-references.
    #[serde(default = "default_framework_dir")]
    pub framework_dir: String,

    /// Whether repeated runs reuse the cached result when nothing changed.
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

impl AnalysisConfig {
    /// Reject framework directory names that would escape the project root.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidValue`] for an empty name or one
    /// containing a path separator or `..`.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        let name = self.framework_dir.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(crate::ConfigError::InvalidValue {
                field: "analysis.framework_dir".to_string(),
                reason: format!("'{}' is not a single directory name", self.framework_dir),
            });
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            framework_dir: default_framework_dir(),
            use_cache: default_use_cache(),
        }
    }
}
