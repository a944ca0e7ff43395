//! File parsers and the extension-keyed parser registry.
//!
//! A parser turns raw text into a [`ParsedFile`]. Agents are YAML documents
//! parsed by [`YamlAgentParser`]; tasks, templates and data are markdown
//! parsed by [`MarkdownParser`], which also splits task frontmatter from the
//! body.

mod markdown;
mod yaml;

pub use markdown::{MarkdownParser, TaskDependencies, TaskMetadata};
pub use yaml::{AgentDocument, AgentIdentity, AgentSpec, YamlAgentParser};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintel_core::FileType;

use crate::error::ParseError;

/// Structured metadata extracted by a parser.
///
/// The typed value serves downstream consumers; the raw value keeps fields
/// the typed structure would drop so schema validation sees the document as
/// written.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    None,
    Agent {
        document: AgentDocument,
        raw: serde_json::Value,
    },
    Task {
        metadata: TaskMetadata,
        raw: serde_json::Value,
    },
}

/// Normalized result of parsing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub file_type: FileType,
    /// The path the parser was given. The analyzer passes project-relative
    /// identifiers here.
    pub path: PathBuf,
    pub metadata: Metadata,
    pub content: String,
    /// 1-based line of the original file on which `content` starts.
    pub content_line: usize,
}

impl ParsedFile {
    /// The agent document, when this is a parsed agent.
    #[must_use]
    pub const fn agent(&self) -> Option<&AgentDocument> {
        match &self.metadata {
            Metadata::Agent { document, .. } => Some(document),
            _ => None,
        }
    }

    /// Task frontmatter, when this is a parsed task.
    #[must_use]
    pub const fn task_metadata(&self) -> Option<&TaskMetadata> {
        match &self.metadata {
            Metadata::Task { metadata, .. } => Some(metadata),
            _ => None,
        }
    }

    /// Map a byte offset within `content` to a line of the original file.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        let end = offset.min(self.content.len());
        let newlines = self.content.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.content_line + newlines
    }
}

pub trait FileParser: Send + Sync {
    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be read, or the same
    /// errors as [`FileParser::parse_content`].
    fn parse_file(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_content(&content, path)
    }

    /// Parse in-memory `content` as if it were read from `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the content is malformed.
    fn parse_content(&self, content: &str, path: &Path) -> Result<ParsedFile, ParseError>;

    /// The file type this parser produces by default.
    fn file_type(&self) -> FileType;
}

/// Lowercased extension of `path`, without the dot.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Parsers keyed by file extension.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn FileParser>>,
}

impl ParserRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the YAML parser on `.yaml`/`.yml` and the markdown
    /// parser on `.md`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let yaml: Arc<dyn FileParser> = Arc::new(YamlAgentParser);
        registry.register_parser("yaml", Arc::clone(&yaml));
        registry.register_parser("yml", yaml);
        registry.register_parser("md", Arc::new(MarkdownParser));
        registry
    }

    /// Register `parser` for `extension` (with or without a leading dot).
    pub fn register_parser(&mut self, extension: &str, parser: Arc<dyn FileParser>) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.parsers.insert(key, parser);
    }

    /// The parser for `path`'s extension.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedExtension`] when none is registered.
    pub fn get_parser(&self, path: &Path) -> Result<Arc<dyn FileParser>, ParseError> {
        let extension = extension_of(path);
        self.parsers
            .get(&extension)
            .cloned()
            .ok_or(ParseError::UnsupportedExtension { extension })
    }

    #[must_use]
    pub fn can_parse(&self, path: &Path) -> bool {
        self.parsers.contains_key(&extension_of(path))
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut extensions: Vec<&String> = self.parsers.keys().collect();
        extensions.sort();
        f.debug_struct("ParserRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}
