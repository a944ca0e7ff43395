//! Severity levels, error codes, issue kinds and asset/schema types.
//!
//! Enums serialize in the casing their consumers expect: severities and issue
//! kinds as `snake_case`, error codes as `SCREAMING_SNAKE_CASE` so they can be
//! matched programmatically by tooling that reads JSON reports.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Ordered issue severity: `Info < Warning < Error < Critical`.
///
/// Both `Error` and `Critical` make a report invalid and drive a non-zero
/// exit status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Whether an issue at this severity fails the whole report.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Programmatic identifier attached to every validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingTask,
    BrokenLink,
    InvalidFormat,
    FrontmatterParse,
    FrontmatterSchema,
    MissingDependency,
    FrameworkMissing,
    ParseError,
    InvalidTaskPath,
    OrphanedFile,
    CircularDependency,
    InvalidExtension,
    UnbalancedTag,
    /// Attached to informational success notices.
    None,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingTask => "MISSING_TASK",
            Self::BrokenLink => "BROKEN_LINK",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::FrontmatterParse => "FRONTMATTER_PARSE",
            Self::FrontmatterSchema => "FRONTMATTER_SCHEMA",
            Self::MissingDependency => "MISSING_DEPENDENCY",
            Self::FrameworkMissing => "FRAMEWORK_MISSING",
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidTaskPath => "INVALID_TASK_PATH",
            Self::OrphanedFile => "ORPHANED_FILE",
            Self::CircularDependency => "CIRCULAR_DEPENDENCY",
            Self::InvalidExtension => "INVALID_EXTENSION",
            Self::UnbalancedTag => "UNBALANCED_TAG",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueKind
// ---------------------------------------------------------------------------

/// Category of a validation issue (the `type` field of a report entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ParserError,
    ParseError,
    AgentValidationError,
    FrontmatterSchemaError,
    EmptyFile,
    Dependency,
    BrokenLink,
    MissingTask,
    InvalidTaskPath,
    InvalidAgentExtension,
    OrphanedFile,
    CircularDependency,
    UnbalancedTag,
    ValidationSuccess,
}

impl IssueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParserError => "parser_error",
            Self::ParseError => "parse_error",
            Self::AgentValidationError => "agent_validation_error",
            Self::FrontmatterSchemaError => "frontmatter_schema_error",
            Self::EmptyFile => "empty_file",
            Self::Dependency => "dependency",
            Self::BrokenLink => "broken_link",
            Self::MissingTask => "missing_task",
            Self::InvalidTaskPath => "invalid_task_path",
            Self::InvalidAgentExtension => "invalid_agent_extension",
            Self::OrphanedFile => "orphaned_file",
            Self::CircularDependency => "circular_dependency",
            Self::UnbalancedTag => "unbalanced_tag",
            Self::ValidationSuccess => "validation_success",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FileType
// ---------------------------------------------------------------------------

/// Role of a parsed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Agent,
    Task,
    Template,
    Data,
    /// Markdown outside any of the known asset directories.
    Markdown,
}

impl FileType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Task => "task",
            Self::Template => "template",
            Self::Data => "data",
            Self::Markdown => "markdown",
        }
    }

    /// Whether documents of this type carry markdown prose subject to the
    /// tag-balance check.
    #[must_use]
    pub const fn is_markdown(self) -> bool {
        !matches!(self, Self::Agent)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SchemaType
// ---------------------------------------------------------------------------

/// The schemas known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    Agent,
    Frontmatter,
}

impl SchemaType {
    pub const ALL: [Self; 2] = [Self::Agent, Self::Frontmatter];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Frontmatter => "frontmatter",
        }
    }

    /// Relative path under which a schema source stores this schema.
    #[must_use]
    pub const fn source_path(self) -> &'static str {
        match self {
            Self::Agent => "schemas/agent-schema.json",
            Self::Frontmatter => "schemas/task-metadata.json",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
        assert_eq!(
            [Severity::Warning, Severity::Critical, Severity::Info]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::Error.to_string(), "ERROR");
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn only_error_and_critical_block() {
        assert!(!Severity::Info.is_blocking());
        assert!(!Severity::Warning.is_blocking());
        assert!(Severity::Error.is_blocking());
        assert!(Severity::Critical.is_blocking());
    }

    #[test]
    fn error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::MissingDependency).unwrap();
        assert_eq!(json, "\"MISSING_DEPENDENCY\"");
        assert_eq!(ErrorCode::CircularDependency.as_str(), "CIRCULAR_DEPENDENCY");
    }

    #[test]
    fn issue_kind_display_matches_serde() {
        for kind in [
            IssueKind::OrphanedFile,
            IssueKind::BrokenLink,
            IssueKind::InvalidAgentExtension,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn schema_source_paths() {
        assert_eq!(SchemaType::Agent.source_path(), "schemas/agent-schema.json");
        assert_eq!(
            SchemaType::Frontmatter.source_path(),
            "schemas/task-metadata.json"
        );
    }

    #[test]
    fn agent_is_not_markdown() {
        assert!(!FileType::Agent.is_markdown());
        assert!(FileType::Task.is_markdown());
        assert!(FileType::Data.is_markdown());
    }
}
