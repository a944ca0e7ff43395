//! Plain-text and JSON rendering of an analysis.

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use lintel_core::{FrameworkInsights, Severity, ValidationIssue, ValidationSummary};

const BINARY_NAME: &str = "lintel";

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub insights: Option<FrameworkInsights>,
    pub duration: Duration,
    pub summary: ValidationSummary,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    valid: bool,
    exit_code: i32,
    summary: &'a ValidationSummary,
    issues: &'a [ValidationIssue],
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<&'a FrameworkInsights>,
    duration_seconds: f64,
}

impl ValidationReport {
    #[must_use]
    pub fn new(
        issues: Vec<ValidationIssue>,
        insights: Option<FrameworkInsights>,
        duration: Duration,
    ) -> Self {
        let summary = ValidationSummary::from_issues(&issues);
        Self {
            issues,
            insights,
            duration,
            summary,
        }
    }

    /// No Error or Critical issue.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !self.has_blocking()
    }

    #[must_use]
    pub const fn has_critical(&self) -> bool {
        self.summary.critical_count > 0
    }

    /// Any Error or Critical issue.
    #[must_use]
    pub const fn has_blocking(&self) -> bool {
        self.blocking_count() > 0
    }

    #[must_use]
    pub const fn has_warnings(&self) -> bool {
        self.summary.warning_count > 0
    }

    /// Critical and Error issues together.
    #[must_use]
    pub const fn blocking_count(&self) -> usize {
        self.summary.critical_count + self.summary.error_count
    }

    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.summary.warning_count
    }

    #[must_use]
    pub const fn info_count(&self) -> usize {
        self.summary.info_count
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.has_blocking() { 1 } else { 0 }
    }

    /// Render the console report.
    #[must_use]
    pub fn format_report(&self, verbose: bool) -> String {
        let mut out = String::from("Validating framework integrity...\n\n");
        self.write_header(&mut out);
        self.write_insights(&mut out);
        self.write_blocking(&mut out);
        self.write_warnings(&mut out, verbose);
        if verbose {
            self.write_info(&mut out);
        }
        out.push_str(if self.has_blocking() {
            "Exit code: 1 (critical issues found)\n"
        } else {
            "Exit code: 0 (framework functional)\n"
        });
        out
    }

    /// Serialize the report for machine consumers.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only occurs for non-string map keys
    /// inside issue contexts.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonReport {
            valid: self.is_valid(),
            exit_code: self.exit_code(),
            summary: &self.summary,
            issues: &self.issues,
            insights: self.insights.as_ref(),
            duration_seconds: self.duration.as_secs_f64(),
        })
    }

    fn write_header(&self, out: &mut String) {
        if self.has_blocking() {
            let _ = writeln!(
                out,
                "FRAMEWORK INVALID ({} critical issues found)\n",
                self.blocking_count()
            );
        } else if self.has_warnings() {
            out.push_str("FRAMEWORK VALID (with warnings)\n\n");
        } else {
            out.push_str("FRAMEWORK VALID\n\n");
        }
    }

    fn write_insights(&self, out: &mut String) {
        if self.has_critical() {
            return;
        }
        if let Some(insights) = &self.insights {
            out.push_str(&format_insights(insights, self.is_valid()));
            let _ = writeln!(
                out,
                "\nValidation completed in {:.1}s\n",
                self.duration.as_secs_f64()
            );
        }
    }

    fn write_blocking(&self, out: &mut String) {
        if !self.has_blocking() {
            return;
        }
        out.push_str("CRITICAL ISSUES (must fix):\n");
        for (number, issue) in self
            .issues
            .iter()
            .filter(|issue| issue.severity.is_blocking())
            .enumerate()
        {
            let _ = write!(out, "   {}. {}", number + 1, issue.message);
            if let Some(line) = issue.line {
                let _ = write!(out, " (line {line})");
            }
            if !issue.file.is_empty() {
                let _ = write!(out, " in {}", issue.file);
            }
            let _ = writeln!(out, "\n      Fix: {}\n", issue.fix_guidance);
        }
    }

    fn write_warnings(&self, out: &mut String, verbose: bool) {
        if !self.has_warnings() {
            return;
        }
        if self.has_blocking() {
            let _ = writeln!(
                out,
                "WARNINGS ({} non-critical issues):",
                self.warning_count()
            );
        } else {
            out.push_str("WARNINGS (non-critical):\n");
        }

        if verbose || !self.has_blocking() {
            for issue in self.of_severity(Severity::Warning) {
                write_item(out, issue);
            }
        } else {
            let _ = writeln!(
                out,
                "   - Use '{BINARY_NAME} validate -v' to see warning details"
            );
        }
        out.push('\n');
    }

    fn write_info(&self, out: &mut String) {
        if self.info_count() == 0 {
            return;
        }
        out.push_str("INFO:\n");
        for issue in self.of_severity(Severity::Info) {
            write_item(out, issue);
        }
        out.push('\n');
    }

    fn of_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity == severity)
    }
}

fn write_item(out: &mut String, issue: &ValidationIssue) {
    let _ = write!(out, "   - {}", issue.message);
    if !issue.file.is_empty() {
        let _ = write!(out, " ({})", issue.file);
    }
    out.push('\n');
}

/// Overview, link count and per-agent reach.
///
/// `resolved` says whether every reference resolved; it selects the wording
/// of the link-count line.
#[must_use]
pub fn format_insights(insights: &FrameworkInsights, resolved: bool) -> String {
    let counts = &insights.component_counts;
    let mut out = format!(
        "Overview: {} agents, {} tasks, {} templates, {} data files\n",
        counts.agents, counts.tasks, counts.templates, counts.data
    );
    if resolved {
        let _ = writeln!(
            out,
            "All internal links resolved ({} references checked)",
            insights.total_references
        );
    } else {
        let _ = writeln!(
            out,
            "Unresolved references found ({} resolved references checked)",
            insights.total_references
        );
    }

    if !insights.relationships.is_empty() {
        out.push_str("\nFRAMEWORK INSIGHTS:\n");
        for relationship in &insights.relationships {
            let tasks = relationship.total_tasks();
            if tasks > 0 {
                let _ = writeln!(
                    out,
                    "   - {} -> {} tasks -> {} templates",
                    relationship.agent,
                    tasks,
                    relationship.templates.len()
                );
            }
        }
        let usage = &insights.usage_statistics;
        if !usage.most_used_template.is_empty() {
            let _ = writeln!(
                out,
                "   - Most used template: {} (referenced by {} agents)",
                usage.most_used_template, usage.template_usage_count
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintel_core::{ComponentCounts, ComponentRelationship, ErrorCode, IssueKind, UsageStatistics};
    use pretty_assertions::assert_eq;

    fn issue(severity: Severity, file: &str, message: &str) -> ValidationIssue {
        ValidationIssue::new(severity, IssueKind::OrphanedFile, ErrorCode::OrphanedFile, file, message)
            .with_fix("do something")
    }

    fn insights() -> FrameworkInsights {
        FrameworkInsights {
            component_counts: ComponentCounts {
                agents: 1,
                tasks: 1,
                templates: 1,
                data: 1,
            },
            relationships: vec![ComponentRelationship {
                agent: "dev".into(),
                tasks: vec!["review.md".into()],
                local_tasks: vec![],
                templates: vec!["report.md".into()],
                data_files: vec!["facts.md".into()],
            }],
            usage_statistics: UsageStatistics {
                most_used_template: "report.md".into(),
                most_used_data: "facts.md".into(),
                template_usage_count: 1,
                data_usage_count: 1,
            },
            total_references: 2,
        }
    }

    #[test]
    fn clean_report() {
        let report = ValidationReport::new(
            vec![issue(Severity::Info, "a.md", "File validation passed")],
            Some(insights()),
            Duration::from_millis(1300),
        );
        assert!(report.is_valid());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            report.format_report(false),
            "Validating framework integrity...\n\n\
             FRAMEWORK VALID\n\n\
             Overview: 1 agents, 1 tasks, 1 templates, 1 data files\n\
             All internal links resolved (2 references checked)\n\
             \n\
             FRAMEWORK INSIGHTS:\n\
             \x20  - dev -> 1 tasks -> 1 templates\n\
             \x20  - Most used template: report.md (referenced by 1 agents)\n\
             \n\
             Validation completed in 1.3s\n\n\
             Exit code: 0 (framework functional)\n"
        );
    }

    #[test]
    fn warnings_are_listed_when_nothing_blocks() {
        let report = ValidationReport::new(
            vec![issue(Severity::Warning, "t.md", "Unused file")],
            None,
            Duration::ZERO,
        );
        assert!(report.is_valid());
        let text = report.format_report(false);
        assert!(text.contains("FRAMEWORK VALID (with warnings)\n"));
        assert!(text.contains("WARNINGS (non-critical):\n   - Unused file (t.md)\n"));
        assert!(text.ends_with("Exit code: 0 (framework functional)\n"));
    }

    #[test]
    fn blocking_issues_are_numbered_and_warnings_summarized() {
        let report = ValidationReport::new(
            vec![
                issue(Severity::Critical, "a.yaml", "Missing task file").with_line(4),
                issue(Severity::Warning, "t.md", "Unused file"),
                issue(Severity::Error, "b.md", "Missing template dependency: x.md"),
            ],
            Some(insights()),
            Duration::ZERO,
        );
        assert!(!report.is_valid());
        assert_eq!(report.exit_code(), 1);

        let text = report.format_report(false);
        assert!(text.contains("FRAMEWORK INVALID (2 critical issues found)\n"));
        assert!(!text.contains("Overview:"));
        assert!(text.contains(
            "CRITICAL ISSUES (must fix):\n\
             \x20  1. Missing task file (line 4) in a.yaml\n      Fix: do something\n\n\
             \x20  2. Missing template dependency: x.md in b.md\n      Fix: do something\n\n"
        ));
        assert!(text.contains(
            "WARNINGS (1 non-critical issues):\n   - Use 'lintel validate -v' to see warning details\n"
        ));
        assert!(text.ends_with("Exit code: 1 (critical issues found)\n"));

        let verbose = report.format_report(true);
        assert!(verbose.contains("   - Unused file (t.md)\n"));
    }

    #[test]
    fn errors_alone_still_fail_but_keep_insights() {
        let report = ValidationReport::new(
            vec![issue(Severity::Error, "b.md", "Missing data dependency: d.md")],
            Some(insights()),
            Duration::ZERO,
        );
        assert!(!report.has_critical());
        assert_eq!(report.exit_code(), 1);
        let text = report.format_report(false);
        assert!(text.contains("Overview: 1 agents"));
        assert!(text.contains("Unresolved references found (2 resolved references checked)\n"));
        assert!(!text.contains("All internal links resolved"));
        assert!(text.contains("CRITICAL ISSUES (must fix):"));
    }

    #[test]
    fn info_only_in_verbose() {
        let report = ValidationReport::new(
            vec![issue(Severity::Info, "a.md", "File validation passed")],
            None,
            Duration::ZERO,
        );
        assert!(!report.format_report(false).contains("INFO:"));
        assert!(
            report
                .format_report(true)
                .contains("INFO:\n   - File validation passed (a.md)\n")
        );
    }

    #[test]
    fn json_carries_verdict_and_issues() {
        let report = ValidationReport::new(
            vec![issue(Severity::Critical, "a.md", "Broken link")],
            None,
            Duration::from_millis(500),
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["exit_code"], 1);
        assert_eq!(value["summary"]["critical_count"], 1);
        assert_eq!(value["issues"][0]["type"], "orphaned_file");
        assert_eq!(value["duration_seconds"], 0.5);
        assert!(value.get("insights").is_none());
    }
}
