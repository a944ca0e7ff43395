//! # lintel-analysis
//!
//! Analysis engine for agent framework repositories.
//!
//! A [`FrameworkAnalyzer`] walks the framework directory, parses agents and
//! markdown assets, validates them against the schema registry and checks the
//! references between them:
//!
//! - agent task paths and frontmatter dependencies resolve to real files
//! - markdown links into the framework are not broken
//! - the agent/task dependency graph has no cycles
//! - every template and data file is reachable
//! - custom tags in markdown prose are balanced
//!
//! Results are a flat list of `ValidationIssue`s plus `FrameworkInsights`,
//! rendered by [`ValidationReport`].

pub mod agents;
pub mod analyzer;
pub mod cache;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod insights;
pub mod orphans;
pub mod parsers;
pub mod references;
pub mod report;
pub mod tags;
pub mod validators;

pub use analyzer::{Analysis, BatchValidation, FrameworkAnalyzer};
pub use cache::{AnalysisCache, ChangeTracker, ContentStore};
pub use discovery::FrameworkFiles;
pub use error::{AnalysisError, ParseError};
pub use graph::{Cycle, DependencyGraph};
pub use parsers::{FileParser, MarkdownParser, ParsedFile, ParserRegistry, YamlAgentParser};
pub use references::{Reference, ReferenceKind, ReferenceRule, ReferenceScanner};
pub use report::ValidationReport;
pub use validators::{SchemaStrategy, ValidatorRegistry, ValidatorStrategy};
