//! # lintel-core
//!
//! Core types shared by every lintel crate.
//!
//! This crate provides:
//! - Severity, error code, issue kind, file type and schema type enums
//! - `ValidationIssue`, the single value every per-file problem is converted into
//! - `FrameworkInsights` and its component/relationship/usage sub-types
//! - `FrameworkLayout`, which resolves the asset directories and link prefixes
//!   of a framework repository

pub mod enums;
pub mod insights;
pub mod issue;
pub mod layout;

pub use enums::{ErrorCode, FileType, IssueKind, SchemaType, Severity};
pub use insights::{ComponentCounts, ComponentRelationship, FrameworkInsights, UsageStatistics};
pub use issue::{ValidationIssue, ValidationResult, ValidationSummary};
pub use layout::FrameworkLayout;
