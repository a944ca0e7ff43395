//! Error types for lintel-analysis.
//!
//! Only repository-structure failures surface as [`AnalysisError`]. Problems in
//! individual files are converted into `ValidationIssue`s by the analyzer, and
//! [`ParseError`] is the intermediate form a parser hands back for that.

use std::path::PathBuf;

use lintel_core::ErrorCode;
use lintel_schema::SchemaError;

/// A single file could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML.
    #[error("invalid YAML in {path}: {message}")]
    Yaml { path: PathBuf, message: String },

    /// An opening `---` line has no matching closing line.
    #[error("frontmatter not properly closed with '---' in {path}")]
    UnclosedFrontmatter { path: PathBuf },

    /// The frontmatter block is not valid YAML.
    #[error("failed to parse YAML frontmatter in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    /// No parser is registered for the file's extension.
    #[error("no parser registered for extension '{extension}'")]
    UnsupportedExtension { extension: String },
}

impl ParseError {
    /// Error code attached to the issue this failure becomes.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } | Self::Yaml { .. } => ErrorCode::ParseError,
            Self::UnclosedFrontmatter { .. } | Self::Frontmatter { .. } => {
                ErrorCode::FrontmatterParse
            }
            Self::UnsupportedExtension { .. } => ErrorCode::InvalidFormat,
        }
    }
}

/// Fatal analysis failures.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The framework directory does not exist under the project root.
    #[error("framework directory not found: {}", path.display())]
    FrameworkMissing { path: PathBuf },

    /// Listing an asset directory failed.
    #[error("failed to list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    /// A discovery glob failed to compile.
    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// The schema registry could not be loaded.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}
