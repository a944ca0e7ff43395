//! # lintel-schema
//!
//! JSON Schema registry for lintel.
//!
//! Two draft-07 schemas govern framework documents: `agent-schema.json` for
//! agent definitions and `task-metadata.json` for task frontmatter. They are
//! embedded in the binary and can be overridden from a directory.

pub mod error;
pub mod registry;
pub mod source;

pub use error::SchemaError;
pub use registry::{CompiledSchema, SchemaRegistry, SchemaViolation};
pub use source::{DirectorySchemas, EmbeddedSchemas, MemorySchemas, SchemaSource};
