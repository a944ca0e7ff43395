//! Cross-reference extraction.
//!
//! One routine scans every parsed file against a list of [`ReferenceRule`]s.
//! A rule names the document types it reads, the [`Pattern`] that finds
//! targets and the [`Resolution`] that turns a target into a path, so agent
//! task lists, markdown links and frontmatter dependencies share one scanner.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::json;

use lintel_core::layout::{DATA_DIR, TEMPLATES_DIR};
use lintel_core::{ErrorCode, FileType, FrameworkLayout, IssueKind, Severity, ValidationIssue};

use crate::parsers::ParsedFile;

/// `[label](./<marker>/<tasks|templates|data>/<path>.<md|yaml|yml|json>)`
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[([^\]]+)\]\(\./([^/)]+)/((?:tasks|templates|data)/[^)]+\.(?:md|yaml|yml|json))\)",
    )
    .unwrap_or_else(|e| unreachable!("markdown link pattern is valid: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    AgentTask,
    MarkdownLink,
    TemplateDependency,
    DataDependency,
}

/// How a rule finds targets in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Entries of an agent's `tasks` list that start with a tasks prefix.
    TaskList,
    /// Markdown links into the framework directory.
    MarkdownLink,
    /// `dependencies.templates` of task frontmatter.
    TemplateDependencies,
    /// `dependencies.data` of task frontmatter.
    DataDependencies,
}

/// How a target string becomes a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// `./<marker>/...` relative to the project root.
    ProjectRoot,
    /// A file name inside the given asset directory.
    AssetDir(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ReferenceRule {
    pub name: &'static str,
    pub sources: &'static [FileType],
    pub pattern: Pattern,
    pub resolution: Resolution,
    pub kind: ReferenceKind,
}

impl ReferenceRule {
    pub const AGENT_TASKS: Self = Self {
        name: "agent-tasks",
        sources: &[FileType::Agent],
        pattern: Pattern::TaskList,
        resolution: Resolution::ProjectRoot,
        kind: ReferenceKind::AgentTask,
    };

    pub const MARKDOWN_LINKS: Self = Self {
        name: "markdown-links",
        sources: &[FileType::Task, FileType::Template, FileType::Data],
        pattern: Pattern::MarkdownLink,
        resolution: Resolution::ProjectRoot,
        kind: ReferenceKind::MarkdownLink,
    };

    pub const TEMPLATE_DEPENDENCIES: Self = Self {
        name: "template-dependencies",
        sources: &[FileType::Task],
        pattern: Pattern::TemplateDependencies,
        resolution: Resolution::AssetDir(TEMPLATES_DIR),
        kind: ReferenceKind::TemplateDependency,
    };

    pub const DATA_DEPENDENCIES: Self = Self {
        name: "data-dependencies",
        sources: &[FileType::Task],
        pattern: Pattern::DataDependencies,
        resolution: Resolution::AssetDir(DATA_DIR),
        kind: ReferenceKind::DataDependency,
    };

    #[must_use]
    pub fn applies_to(&self, file_type: FileType) -> bool {
        self.sources.contains(&file_type)
    }

    fn candidates(&self, parsed: &ParsedFile, layout: &FrameworkLayout) -> Vec<Candidate> {
        match self.pattern {
            Pattern::TaskList => parsed
                .agent()
                .map(|document| {
                    document
                        .agent
                        .tasks
                        .iter()
                        .filter(|entry| layout.is_task_reference(entry) && !has_parent_segment(entry))
                        .map(|entry| Candidate {
                            target: entry.clone(),
                            label: None,
                            line: parsed.content.find(entry.as_str()).map(|at| parsed.line_of(at)),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Pattern::MarkdownLink => MARKDOWN_LINK
                .captures_iter(&parsed.content)
                .filter(|captures| &captures[2] == layout.marker())
                .filter_map(|captures| {
                    let whole = captures.get(0)?;
                    Some(Candidate {
                        target: format!("./{}/{}", &captures[2], &captures[3]),
                        label: Some(captures[1].to_string()),
                        line: Some(parsed.line_of(whole.start())),
                    })
                })
                .collect(),
            Pattern::TemplateDependencies => dependency_candidates(
                parsed
                    .task_metadata()
                    .map(|metadata| metadata.templates())
                    .unwrap_or_default(),
            ),
            Pattern::DataDependencies => dependency_candidates(
                parsed
                    .task_metadata()
                    .map(|metadata| metadata.data())
                    .unwrap_or_default(),
            ),
        }
    }

    fn resolve(&self, layout: &FrameworkLayout, target: &str) -> PathBuf {
        match self.resolution {
            Resolution::ProjectRoot => layout.resolve_reference(target),
            Resolution::AssetDir(dir) => layout.resolve_in(dir, target),
        }
    }
}

struct Candidate {
    target: String,
    label: Option<String>,
    line: Option<usize>,
}

fn dependency_candidates(entries: &[String]) -> Vec<Candidate> {
    entries
        .iter()
        .map(|entry| Candidate {
            target: entry.clone(),
            label: None,
            line: None,
        })
        .collect()
}

fn has_parent_segment(reference: &str) -> bool {
    reference.split(['/', '\\']).any(|segment| segment == "..")
}

/// One reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Project-relative id of the referencing file.
    pub source: String,
    pub source_type: FileType,
    /// The target as written.
    pub target: String,
    /// Project-relative id of the resolved target.
    pub target_id: String,
    pub resolved: PathBuf,
    pub exists: bool,
    pub label: Option<String>,
    pub line: Option<usize>,
}

impl Reference {
    /// Whether this reference becomes a dependency-graph edge: it must
    /// resolve, and only agents and tasks contribute edges.
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        self.exists && matches!(self.source_type, FileType::Agent | FileType::Task)
    }
}

/// Applies a list of rules to parsed files.
#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    rules: Vec<ReferenceRule>,
}

impl Default for ReferenceScanner {
    fn default() -> Self {
        Self::new(vec![
            ReferenceRule::AGENT_TASKS,
            ReferenceRule::MARKDOWN_LINKS,
            ReferenceRule::TEMPLATE_DEPENDENCIES,
            ReferenceRule::DATA_DEPENDENCIES,
        ])
    }
}

impl ReferenceScanner {
    #[must_use]
    pub const fn new(rules: Vec<ReferenceRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[ReferenceRule] {
        &self.rules
    }

    /// References of every file, file by file, rule by rule.
    ///
    /// `parsed[i].path` must be a project-relative id.
    #[must_use]
    pub fn scan(&self, parsed: &[ParsedFile], layout: &FrameworkLayout) -> Vec<Reference> {
        let mut references = Vec::new();
        for file in parsed {
            let source = file.path.to_string_lossy().replace('\\', "/");
            for rule in self.rules.iter().filter(|rule| rule.applies_to(file.file_type)) {
                for candidate in rule.candidates(file, layout) {
                    let resolved = rule.resolve(layout, &candidate.target);
                    references.push(Reference {
                        kind: rule.kind,
                        source: source.clone(),
                        source_type: file.file_type,
                        target_id: layout.relative(&resolved),
                        exists: layout.contains(&resolved) && resolved.is_file(),
                        resolved,
                        target: candidate.target,
                        label: candidate.label,
                        line: candidate.line,
                    });
                }
            }
        }
        tracing::debug!(
            files = parsed.len(),
            references = references.len(),
            "reference scan complete"
        );
        references
    }
}

/// Broken links and missing frontmatter dependencies.
#[must_use]
pub fn reference_issues(references: &[Reference]) -> Vec<ValidationIssue> {
    references
        .iter()
        .filter(|reference| !reference.exists)
        .filter_map(|reference| match reference.kind {
            ReferenceKind::MarkdownLink => {
                let mut issue = ValidationIssue::new(
                    Severity::Critical,
                    IssueKind::BrokenLink,
                    ErrorCode::BrokenLink,
                    reference.source.clone(),
                    format!("Broken link to {}", reference.target),
                )
                .with_fix(format!(
                    "Create {} or correct the link target",
                    reference.target_id
                ))
                .with_context(json!({
                    "link_text": reference.label,
                    "target": reference.target,
                }));
                if let Some(line) = reference.line {
                    issue = issue.with_line(line);
                }
                Some(issue)
            }
            ReferenceKind::TemplateDependency | ReferenceKind::DataDependency => {
                let dependency_type = if reference.kind == ReferenceKind::TemplateDependency {
                    "template"
                } else {
                    "data"
                };
                Some(
                    ValidationIssue::new(
                        Severity::Error,
                        IssueKind::Dependency,
                        ErrorCode::MissingDependency,
                        reference.source.clone(),
                        format!("Missing {dependency_type} dependency: {}", reference.target),
                    )
                    .with_fix(format!(
                        "Create the {dependency_type} file at {}",
                        reference.target_id
                    ))
                    .with_context(json!({
                        "dependency_type": dependency_type,
                        "dependency_path": reference.target,
                    })),
                )
            }
            // Agent task entries are checked with their path rules.
            ReferenceKind::AgentTask => None,
        })
        .collect()
}

/// Classify a project-relative id by the asset directory it lives in.
#[must_use]
pub fn classify(layout: &FrameworkLayout, id: &str) -> Option<FileType> {
    let rest = id.strip_prefix(layout.marker())?.strip_prefix('/')?;
    let dir = Path::new(rest).parent()?;
    match dir.to_str()? {
        "agents" => Some(FileType::Agent),
        "tasks" | "local/tasks" => Some(FileType::Task),
        "templates" => Some(FileType::Template),
        "data" => Some(FileType::Data),
        _ => None,
    }
}
