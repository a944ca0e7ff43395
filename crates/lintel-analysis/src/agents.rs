//! Rules specific to agent documents: task-path shape and file extension.

use std::path::Path;

use serde_json::json;

use lintel_core::{ErrorCode, FrameworkLayout, IssueKind, Severity, ValidationIssue};

use crate::parsers::{ParsedFile, extension_of};

const INVALID_TASK_PATH: &str = "Invalid task path format";

/// Check every entry of an agent's `tasks` list.
///
/// Entries are checked in order: blank, prefix, traversal, extension, and
/// finally existence on disk. The first failing check produces the issue.
#[must_use]
pub fn check_task_paths(parsed: &ParsedFile, layout: &FrameworkLayout) -> Vec<ValidationIssue> {
    let Some(document) = parsed.agent() else {
        return Vec::new();
    };
    let file = parsed.path.to_string_lossy().replace('\\', "/");

    document
        .agent
        .tasks
        .iter()
        .filter_map(|entry| {
            let issue = check_entry(entry, &file, layout)?;
            let issue = issue.with_context(json!({ "task_path": entry }));
            Some(match parsed.content.find(entry.as_str()) {
                Some(offset) if !entry.trim().is_empty() => issue.with_line(parsed.line_of(offset)),
                _ => issue,
            })
        })
        .collect()
}

fn check_entry(entry: &str, file: &str, layout: &FrameworkLayout) -> Option<ValidationIssue> {
    let invalid = |fix: String| {
        ValidationIssue::new(
            Severity::Error,
            IssueKind::InvalidTaskPath,
            ErrorCode::InvalidTaskPath,
            file,
            INVALID_TASK_PATH,
        )
        .with_fix(fix)
    };

    if entry.trim().is_empty() {
        return Some(invalid(String::from("Remove the empty entry from the tasks list")));
    }
    if !layout.is_task_reference(entry) {
        return Some(invalid(format!(
            "Task paths must start with {} or {}",
            layout.standard_tasks_prefix(),
            layout.local_tasks_prefix()
        )));
    }
    if entry.split(['/', '\\']).any(|segment| segment == "..") {
        return Some(
            ValidationIssue::new(
                Severity::Critical,
                IssueKind::InvalidTaskPath,
                ErrorCode::InvalidTaskPath,
                file,
                "Path traversal detected",
            )
            .with_fix("Reference tasks inside the framework directory without '..'"),
        );
    }
    if extension_of(Path::new(entry)) != "md" {
        return Some(invalid(String::from("Task files must use the .md extension")));
    }
    if !layout.resolve_reference(entry).is_file() {
        return Some(
            ValidationIssue::new(
                Severity::Critical,
                IssueKind::MissingTask,
                ErrorCode::MissingTask,
                file,
                "Missing task file",
            )
            .with_fix(format!("Create the task file at {}", entry.trim_start_matches("./"))),
        );
    }
    None
}

/// Warning for a file under `agents/` without a `.yaml`/`.yml` extension.
#[must_use]
pub fn misnamed_agent_issue(path: &Path, layout: &FrameworkLayout) -> ValidationIssue {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    ValidationIssue::new(
        Severity::Warning,
        IssueKind::InvalidAgentExtension,
        ErrorCode::InvalidExtension,
        layout.relative(path),
        "Agent files must use the .yaml or .yml extension",
    )
    .with_fix(format!("Rename to {stem}.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{FileParser, YamlAgentParser};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn agent(tasks: &[&str]) -> ParsedFile {
        let mut content = String::from("agent:\n  tasks:\n");
        for task in tasks {
            content.push_str(&format!("    - \"{task}\"\n"));
        }
        YamlAgentParser
            .parse_content(&content, Path::new(".agentkit/agents/dev.yaml"))
            .unwrap()
    }

    #[test]
    fn each_rule_reports_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = dir.path().join(".agentkit/tasks");
        fs::create_dir_all(&tasks).unwrap();
        fs::write(tasks.join("review.md"), "# Review").unwrap();
        let layout = FrameworkLayout::with_default_marker(dir.path());

        let parsed = agent(&[
            "./.agentkit/tasks/review.md",
            " ",
            "tasks/review.md",
            "./.agentkit/tasks/../../etc/passwd.md",
            "./.agentkit/tasks/review.txt",
            "./.agentkit/tasks/missing.md",
        ]);
        let issues = check_task_paths(&parsed, &layout);
        let summary: Vec<(Severity, &str)> = issues
            .iter()
            .map(|issue| (issue.severity, issue.message.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (Severity::Error, "Invalid task path format"),
                (Severity::Error, "Invalid task path format"),
                (Severity::Critical, "Path traversal detected"),
                (Severity::Error, "Invalid task path format"),
                (Severity::Critical, "Missing task file"),
            ]
        );
        assert!(issues.iter().all(|i| i.file == ".agentkit/agents/dev.yaml"));
        assert_eq!(issues[4].code, ErrorCode::MissingTask);
        assert_eq!(issues[4].line, Some(8));
    }

    #[test]
    fn local_tasks_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join(".agentkit/local/tasks");
        fs::create_dir_all(&local).unwrap();
        fs::write(local.join("custom.md"), "# Custom").unwrap();
        let layout = FrameworkLayout::with_default_marker(dir.path());

        let issues = check_task_paths(&agent(&["./.agentkit/local/tasks/custom.md"]), &layout);
        assert!(issues.is_empty());
    }

    #[test]
    fn misnamed_agent_suggests_yaml() {
        let layout = FrameworkLayout::with_default_marker("/repo");
        let issue = misnamed_agent_issue(Path::new("/repo/.agentkit/agents/dev.json"), &layout);
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.code, ErrorCode::InvalidExtension);
        assert_eq!(issue.file, ".agentkit/agents/dev.json");
        assert_eq!(issue.fix_guidance, "Rename to dev.yaml");
    }
}
