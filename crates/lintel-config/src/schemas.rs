//! Schema source configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemaConfig {
    /// Directory holding `agent-schema.json` and `task-metadata.json`.
    /// When unset, the schemas compiled into the binary are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl SchemaConfig {
    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        self.dir.is_some()
    }
}
