//! Validator strategies and their registry.
//!
//! A strategy inspects one [`ParsedFile`] and returns zero or more results.
//! The registry keeps strategies per file type in registration order.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use lintel_core::{ErrorCode, FileType, IssueKind, SchemaType, Severity, ValidationResult};
use lintel_schema::{SchemaRegistry, SchemaViolation};

use crate::parsers::{Metadata, ParsedFile, extension_of};

pub trait ValidatorStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy applies to the file at `path`.
    fn can_validate(&self, path: &Path) -> bool;

    fn validate(&self, parsed: &ParsedFile) -> Vec<ValidationResult>;

    /// Highest severity this strategy emits.
    fn severity(&self) -> Severity;
}

/// Schema checks for agents and task frontmatter, plus the empty-file check
/// for every type.
#[derive(Debug, Clone)]
pub struct SchemaStrategy {
    schemas: Arc<SchemaRegistry>,
}

impl SchemaStrategy {
    #[must_use]
    pub const fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self { schemas }
    }

    fn validate_agent(&self, parsed: &ParsedFile, raw: &serde_json::Value) -> Vec<ValidationResult> {
        let file = display_path(parsed);
        let schema = match self.schemas.get_schema(SchemaType::Agent) {
            Ok(schema) => schema,
            Err(error) => return vec![schema_unavailable(IssueKind::AgentValidationError, &file, &error)],
        };

        schema
            .violations(raw)
            .into_iter()
            .map(|violation| {
                ValidationResult::new(
                    Severity::Critical,
                    IssueKind::AgentValidationError,
                    ErrorCode::FrontmatterSchema,
                    file.clone(),
                    violation.to_string(),
                )
                .with_fix("Fix the agent YAML structure according to schema requirements")
                .with_context(json!({ "path": violation.path }))
            })
            .collect()
    }

    fn validate_task(&self, parsed: &ParsedFile, raw: &serde_json::Value) -> Vec<ValidationResult> {
        let file = display_path(parsed);
        let schema = match self.schemas.get_schema(SchemaType::Frontmatter) {
            Ok(schema) => schema,
            Err(error) => {
                return vec![schema_unavailable(IssueKind::FrontmatterSchemaError, &file, &error)];
            }
        };

        // Absent frontmatter means no dependencies.
        let empty = json!({});
        let instance = if raw.is_null() { &empty } else { raw };
        let violations = schema.violations(instance);
        if violations.is_empty() {
            return Vec::new();
        }

        let summary = violations
            .iter()
            .map(SchemaViolation::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        vec![
            ValidationResult::new(
                Severity::Critical,
                IssueKind::FrontmatterSchemaError,
                ErrorCode::FrontmatterSchema,
                file,
                format!("Frontmatter validation failed: {summary}"),
            )
            .with_fix("Fix frontmatter structure to match schema requirements")
            .with_context(json!({ "violations": violations })),
        ]
    }
}

impl ValidatorStrategy for SchemaStrategy {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn can_validate(&self, path: &Path) -> bool {
        matches!(extension_of(path).as_str(), "yaml" | "yml" | "md")
    }

    fn validate(&self, parsed: &ParsedFile) -> Vec<ValidationResult> {
        let mut results = match &parsed.metadata {
            Metadata::Agent { raw, .. } => self.validate_agent(parsed, raw),
            Metadata::Task { raw, .. } => self.validate_task(parsed, raw),
            Metadata::None => Vec::new(),
        };

        if parsed.content.trim().is_empty() {
            results.push(
                ValidationResult::new(
                    Severity::Warning,
                    IssueKind::EmptyFile,
                    ErrorCode::InvalidFormat,
                    display_path(parsed),
                    "File appears to be empty",
                )
                .with_fix("Add content to the file or remove if not needed"),
            );
        }

        results
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }
}

fn display_path(parsed: &ParsedFile) -> String {
    parsed.path.to_string_lossy().replace('\\', "/")
}

fn schema_unavailable(
    kind: IssueKind,
    file: &str,
    error: &lintel_schema::SchemaError,
) -> ValidationResult {
    ValidationResult::new(
        Severity::Critical,
        kind,
        ErrorCode::FrontmatterSchema,
        file,
        format!("Schema unavailable: {error}"),
    )
    .with_fix("Load the agent and frontmatter schemas before validating")
}

/// Validator strategies keyed by file type.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<FileType, Vec<Arc<dyn ValidatorStrategy>>>,
}

impl ValidatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with [`SchemaStrategy`] registered for every file type.
    #[must_use]
    pub fn with_defaults(schemas: Arc<SchemaRegistry>) -> Self {
        let mut registry = Self::new();
        let strategy: Arc<dyn ValidatorStrategy> = Arc::new(SchemaStrategy::new(schemas));
        for file_type in [
            FileType::Agent,
            FileType::Task,
            FileType::Template,
            FileType::Data,
            FileType::Markdown,
        ] {
            registry.register_validator(file_type, Arc::clone(&strategy));
        }
        registry
    }

    pub fn register_validator(&mut self, file_type: FileType, validator: Arc<dyn ValidatorStrategy>) {
        self.validators.entry(file_type).or_default().push(validator);
    }

    /// Strategies for `file_type`, in registration order.
    #[must_use]
    pub fn get_validators(&self, file_type: FileType) -> &[Arc<dyn ValidatorStrategy>] {
        self.validators
            .get(&file_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Run every applicable strategy for `parsed`, keeping all results.
    #[must_use]
    pub fn validate(&self, parsed: &ParsedFile) -> Vec<ValidationResult> {
        self.get_validators(parsed.file_type)
            .iter()
            .filter(|validator| validator.can_validate(&parsed.path))
            .flat_map(|validator| validator.validate(parsed))
            .collect()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<(FileType, Vec<&'static str>)> = self
            .validators
            .iter()
            .map(|(file_type, list)| (*file_type, list.iter().map(|v| v.name()).collect()))
            .collect();
        names.sort_by_key(|(file_type, _)| file_type.as_str());
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}
