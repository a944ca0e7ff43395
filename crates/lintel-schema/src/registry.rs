//! Compiled schema store.
//!
//! `SchemaRegistry` compiles the agent and frontmatter schemas once from a
//! [`SchemaSource`] and hands out shared validators. Loading is all-or-nothing:
//! a missing or malformed schema leaves the registry untouched and returns an
//! error, since analysis cannot proceed without both schemas.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use jsonschema::error::ValidationErrorKind;
use serde::Serialize;

use lintel_core::SchemaType;

use crate::error::SchemaError;
use crate::source::SchemaSource;

/// One schema violation: the JSON pointer of the offending value and the
/// validator's message.
///
/// For a missing required property the pointer names the property itself,
/// e.g. `/agent/identity/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A compiled draft-07 schema.
pub struct CompiledSchema {
    schema_type: SchemaType,
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    /// Compile a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] if `schema` is not a valid draft-07 schema.
    pub fn compile(schema_type: SchemaType, schema: &serde_json::Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::draft7::new(schema).map_err(|e| SchemaError::Compile {
            schema: schema_type,
            message: e.to_string(),
        })?;
        Ok(Self {
            schema_type,
            validator,
        })
    }

    #[must_use]
    pub const fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    #[must_use]
    pub fn is_valid(&self, instance: &serde_json::Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Every violation of `instance`, in validator order.
    #[must_use]
    pub fn violations(&self, instance: &serde_json::Value) -> Vec<SchemaViolation> {
        self.validator
            .iter_errors(instance)
            .map(|error| {
                let mut path = error.instance_path.to_string();
                if let ValidationErrorKind::Required { property } = &error.kind {
                    let name = property
                        .as_str()
                        .map_or_else(|| property.to_string(), ToString::to_string);
                    path = format!("{path}/{name}");
                }
                SchemaViolation {
                    path,
                    message: error.to_string(),
                }
            })
            .collect()
    }

    /// Validate `instance`, collecting every violation into the error.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ValidationFailed`] when at least one violation exists.
    pub fn validate(&self, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let violations = self.violations(instance);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { violations })
        }
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema_type", &self.schema_type)
            .finish_non_exhaustive()
    }
}

/// Central store of compiled schemas, safe for concurrent reads after load.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<SchemaType, Arc<CompiledSchema>>>,
}

impl SchemaRegistry {
    /// An empty registry. Call [`Self::load_schemas`] before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with every schema loaded from `source`.
    ///
    /// # Errors
    ///
    /// See [`Self::load_schemas`].
    pub fn from_source(source: &dyn SchemaSource) -> Result<Self, SchemaError> {
        let registry = Self::new();
        registry.load_schemas(source)?;
        Ok(registry)
    }

    /// Compile every [`SchemaType`] from `source`, replacing anything loaded
    /// before.
    ///
    /// # Errors
    ///
    /// Returns the first read, parse or compile failure. On error the
    /// registry keeps its previous contents.
    pub fn load_schemas(&self, source: &dyn SchemaSource) -> Result<(), SchemaError> {
        let mut compiled = HashMap::with_capacity(SchemaType::ALL.len());
        for schema_type in SchemaType::ALL {
            let path = schema_type.source_path();
            let bytes = source.read(path)?;
            let document: serde_json::Value =
                serde_json::from_slice(&bytes).map_err(|source| SchemaError::InvalidJson {
                    path: path.to_string(),
                    source,
                })?;
            compiled.insert(
                schema_type,
                Arc::new(CompiledSchema::compile(schema_type, &document)?),
            );
        }

        let mut schemas = self.schemas.write().map_err(|_| SchemaError::LockPoisoned)?;
        *schemas = compiled;
        Ok(())
    }

    /// The compiled schema for `schema_type`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] if schemas have not been loaded.
    pub fn get_schema(&self, schema_type: SchemaType) -> Result<Arc<CompiledSchema>, SchemaError> {
        let schemas = self.schemas.read().map_err(|_| SchemaError::LockPoisoned)?;
        schemas
            .get(&schema_type)
            .cloned()
            .ok_or(SchemaError::NotFound(schema_type))
    }

    /// Validate `data` against the schema of `schema_type`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] for an unloaded schema or
    /// [`SchemaError::ValidationFailed`] listing every violation.
    pub fn validate_against_schema(
        &self,
        data: &serde_json::Value,
        schema_type: SchemaType,
    ) -> Result<(), SchemaError> {
        self.get_schema(schema_type)?.validate(data)
    }

    /// Number of compiled schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.read().map_or(0, |schemas| schemas.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EmbeddedSchemas, MemorySchemas};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_source(&EmbeddedSchemas).unwrap()
    }

    fn conformant_agent() -> serde_json::Value {
        json!({
            "agent": {
                "identity": {
                    "name": "Ada",
                    "id": "reviewer-v1",
                    "version": "1.0.0",
                    "description": "Reviews change requests",
                    "role": "Senior reviewer",
                    "goal": "Keep the codebase healthy",
                    "icon": "R"
                },
                "activation_prompt": ["Greet the user"],
                "principles": ["Be precise"],
                "customization": "",
                "commands": {
                    "help": "Show commands",
                    "chat": "Default mode",
                    "exit": "Leave the persona"
                },
                "tasks": ["./.agentkit/tasks/review.md"]
            }
        })
    }

    #[test]
    fn loads_both_schemas() {
        let reg = registry();
        assert_eq!(reg.schema_count(), 2);
        assert_eq!(
            reg.get_schema(SchemaType::Agent).unwrap().schema_type(),
            SchemaType::Agent
        );
    }

    #[test]
    fn unloaded_registry_reports_not_found() {
        let reg = SchemaRegistry::new();
        let err = reg.get_schema(SchemaType::Frontmatter).unwrap_err();
        assert!(matches!(err, SchemaError::NotFound(SchemaType::Frontmatter)));
    }

    #[test]
    fn conformant_agent_passes() {
        registry()
            .validate_against_schema(&conformant_agent(), SchemaType::Agent)
            .unwrap();
    }

    #[test]
    fn missing_identity_field_is_named_in_path() {
        let mut agent = conformant_agent();
        agent["agent"]["identity"]
            .as_object_mut()
            .unwrap()
            .remove("name");

        let violations = registry()
            .get_schema(SchemaType::Agent)
            .unwrap()
            .violations(&agent);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/agent/identity/name");
        assert!(violations[0].message.contains("name"));
    }

    #[test]
    fn every_violation_is_reported() {
        let mut agent = conformant_agent();
        agent["agent"]["identity"]["version"] = json!("one");
        agent["agent"]["principles"] = json!([]);

        let err = registry()
            .validate_against_schema(&agent, SchemaType::Agent)
            .unwrap_err();
        let SchemaError::ValidationFailed { violations } = err else {
            panic!("expected validation failure");
        };
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"/agent/identity/version"));
        assert!(paths.contains(&"/agent/principles"));
    }

    #[rstest]
    #[case::empty(json!({}))]
    #[case::templates_only(json!({"dependencies": {"templates": ["report.md"]}}))]
    #[case::all_lists(json!({"dependencies": {"templates": [], "data": ["a.md"], "mcp": ["github"]}}))]
    fn frontmatter_accepts(#[case] metadata: serde_json::Value) {
        registry()
            .validate_against_schema(&metadata, SchemaType::Frontmatter)
            .unwrap();
    }

    #[rstest]
    #[case::templates_not_list(json!({"dependencies": {"templates": "report.md"}}))]
    #[case::unknown_dependency_kind(json!({"dependencies": {"scripts": ["x.sh"]}}))]
    fn frontmatter_rejects(#[case] metadata: serde_json::Value) {
        assert!(
            registry()
                .validate_against_schema(&metadata, SchemaType::Frontmatter)
                .is_err()
        );
    }

    #[test]
    fn missing_source_file_fails_load() {
        let source = MemorySchemas::new().with_file("schemas/agent-schema.json", "{}");
        let err = SchemaRegistry::from_source(&source).unwrap_err();
        assert!(matches!(err, SchemaError::MissingSource { .. }));
    }

    #[test]
    fn malformed_json_fails_load() {
        let source = MemorySchemas::new()
            .with_file("schemas/agent-schema.json", "{ not json")
            .with_file("schemas/task-metadata.json", "{}");
        let err = SchemaRegistry::from_source(&source).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidJson { .. }));
    }

    #[test]
    fn invalid_schema_fails_compile() {
        let source = MemorySchemas::new()
            .with_file("schemas/agent-schema.json", r#"{"type": 12}"#)
            .with_file("schemas/task-metadata.json", "{}");
        let err = SchemaRegistry::from_source(&source).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Compile {
                schema: SchemaType::Agent,
                ..
            }
        ));
    }

    #[test]
    fn failed_reload_keeps_previous_schemas() {
        let reg = registry();
        let broken = MemorySchemas::new();
        assert!(reg.load_schemas(&broken).is_err());
        assert_eq!(reg.schema_count(), 2);
    }
}
