//! Templates and data files that no agent or task reaches.

use std::collections::HashSet;
use std::path::PathBuf;

use lintel_core::{ErrorCode, FrameworkLayout, IssueKind, Severity, ValidationIssue};

use crate::references::Reference;

/// Every candidate whose id is not the resolved target of an edge reference.
///
/// `candidates` are absolute paths as discovered; references carry
/// project-relative target ids.
#[must_use]
pub fn find_orphans<'a>(
    candidates: impl IntoIterator<Item = &'a PathBuf>,
    references: &[Reference],
    layout: &FrameworkLayout,
) -> Vec<ValidationIssue> {
    let referenced: HashSet<&str> = references
        .iter()
        .filter(|reference| reference.is_edge())
        .map(|reference| reference.target_id.as_str())
        .collect();

    let orphans: Vec<ValidationIssue> = candidates
        .into_iter()
        .map(|path| layout.relative(path))
        .filter(|id| !referenced.contains(id.as_str()))
        .map(|id| {
            ValidationIssue::new(
                Severity::Warning,
                IssueKind::OrphanedFile,
                ErrorCode::OrphanedFile,
                id,
                "Unused file in framework - not referenced by any component",
            )
            .with_fix("Remove unused file or add reference from appropriate task")
        })
        .collect();
    tracing::debug!(orphans = orphans.len(), "orphan detection complete");
    orphans
}
