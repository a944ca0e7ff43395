//! The validation issue value and its aggregate summary.

use serde::{Deserialize, Serialize};

use crate::enums::{ErrorCode, IssueKind, Severity};

/// A single problem (or success notice) found while analyzing a framework.
///
/// Every per-file or per-edge problem is converted into one of these rather
/// than surfaced as an error, so one bad file never stops the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub code: ErrorCode,
    /// Repository-relative path of the file the issue is attributed to.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    pub fix_guidance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Validator strategies emit the same shape the analyzer reports.
pub type ValidationResult = ValidationIssue;

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        kind: IssueKind,
        code: ErrorCode,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            code,
            file: file.into(),
            line: None,
            message: message.into(),
            fix_guidance: String::new(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_fix(mut self, fix_guidance: impl Into<String>) -> Self {
        self.fix_guidance = fix_guidance.into();
        self
    }

    #[must_use]
    pub const fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Informational notice for a file whose validators reported nothing.
    pub fn success(file: impl Into<String>) -> Self {
        Self::new(
            Severity::Info,
            IssueKind::ValidationSuccess,
            ErrorCode::None,
            file,
            "File validation passed",
        )
    }

    /// Reduce a set of results to the single most severe one.
    ///
    /// Ties keep the earliest result. Returns `None` for an empty input.
    #[must_use]
    pub fn most_severe(results: Vec<Self>) -> Option<Self> {
        results.into_iter().reduce(|current, candidate| {
            if candidate.severity > current.severity {
                candidate
            } else {
                current
            }
        })
    }
}

/// Per-severity counts over a list of issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_issues: usize,
    pub critical_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl ValidationSummary {
    #[must_use]
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let mut summary = Self {
            total_issues: issues.len(),
            ..Self::default()
        };
        for issue in issues {
            match issue.severity {
                Severity::Critical => summary.critical_count += 1,
                Severity::Error => summary.error_count += 1,
                Severity::Warning => summary.warning_count += 1,
                Severity::Info => summary.info_count += 1,
            }
        }
        summary
    }
}
