//! Where schema bytes come from.
//!
//! A source maps a relative path such as `schemas/agent-schema.json` to raw
//! bytes. The binary ships the defaults compiled in; a directory source lets a
//! project override them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::SchemaError;

pub trait SchemaSource {
    /// Raw bytes stored under `relative_path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingSource`] when nothing is stored there.
    fn read(&self, relative_path: &str) -> Result<Cow<'_, [u8]>, SchemaError>;
}

/// The default schemas compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSchemas;

const AGENT_SCHEMA: &[u8] = include_bytes!("../schemas/agent-schema.json");
const TASK_METADATA_SCHEMA: &[u8] = include_bytes!("../schemas/task-metadata.json");

impl SchemaSource for EmbeddedSchemas {
    fn read(&self, relative_path: &str) -> Result<Cow<'_, [u8]>, SchemaError> {
        match relative_path {
            "schemas/agent-schema.json" => Ok(Cow::Borrowed(AGENT_SCHEMA)),
            "schemas/task-metadata.json" => Ok(Cow::Borrowed(TASK_METADATA_SCHEMA)),
            other => Err(SchemaError::MissingSource {
                path: other.to_string(),
                reason: "not embedded".to_string(),
            }),
        }
    }
}

/// Schemas read from a directory on disk.
///
/// Only the file name of the requested path is used, so
/// `schemas/agent-schema.json` resolves to `<root>/agent-schema.json`.
#[derive(Debug, Clone)]
pub struct DirectorySchemas {
    root: PathBuf,
}

impl DirectorySchemas {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SchemaSource for DirectorySchemas {
    fn read(&self, relative_path: &str) -> Result<Cow<'_, [u8]>, SchemaError> {
        let file_name = Path::new(relative_path)
            .file_name()
            .unwrap_or_else(|| OsStr::new(relative_path));
        let path = self.root.join(file_name);
        std::fs::read(&path)
            .map(Cow::Owned)
            .map_err(|e| SchemaError::MissingSource {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

/// In-memory schemas keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct MemorySchemas {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySchemas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, relative_path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(relative_path.into(), bytes.into());
        self
    }
}

impl SchemaSource for MemorySchemas {
    fn read(&self, relative_path: &str) -> Result<Cow<'_, [u8]>, SchemaError> {
        self.files
            .get(relative_path)
            .map(|bytes| Cow::Borrowed(bytes.as_slice()))
            .ok_or_else(|| SchemaError::MissingSource {
                path: relative_path.to_string(),
                reason: "not present in memory source".to_string(),
            })
    }
}
