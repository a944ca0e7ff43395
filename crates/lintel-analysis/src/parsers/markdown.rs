//! Markdown parser with task frontmatter support.
//!
//! A task may open with a frontmatter block:
//!
//! ```text
//! ---
//! dependencies:
//!   templates: [report.md]
//!   data: [standards.md]
//!   mcp: [github]
//! ---
//! # Task body
//! ```
//!
//! Only tasks carry frontmatter; templates and data are plain content.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use lintel_core::FileType;
use lintel_core::layout::{DATA_DIR, TASKS_DIR, TEMPLATES_DIR};

use super::{FileParser, Metadata, ParsedFile};
use crate::error::ParseError;

const FRONTMATTER_DELIMITER: &str = "---";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<TaskDependencies>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDependencies {
    /// File names under the templates directory.
    pub templates: Vec<String>,
    /// File names under the data directory.
    pub data: Vec<String>,
    /// External tool names. Never resolved on disk.
    pub mcp: Vec<String>,
}

impl TaskMetadata {
    #[must_use]
    pub fn templates(&self) -> &[String] {
        self.dependencies
            .as_ref()
            .map(|deps| deps.templates.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn data(&self) -> &[String] {
        self.dependencies
            .as_ref()
            .map(|deps| deps.data.as_slice())
            .unwrap_or_default()
    }
}

/// Parses `.md` files, classifying them by the directory they live in.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Classify `path` by its nearest `tasks`, `templates` or `data` ancestor.
    #[must_use]
    pub fn detect_file_type(path: &Path) -> FileType {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        parent
            .components()
            .rev()
            .find_map(|component| match component {
                Component::Normal(name) => match name.to_str() {
                    Some(TASKS_DIR) => Some(FileType::Task),
                    Some(TEMPLATES_DIR) => Some(FileType::Template),
                    Some(DATA_DIR) => Some(FileType::Data),
                    _ => None,
                },
                _ => None,
            })
            .unwrap_or(FileType::Markdown)
    }
}

impl FileParser for MarkdownParser {
    fn parse_content(&self, content: &str, path: &Path) -> Result<ParsedFile, ParseError> {
        let file_type = Self::detect_file_type(path);
        if file_type != FileType::Task {
            return Ok(ParsedFile {
                file_type,
                path: path.to_path_buf(),
                metadata: Metadata::None,
                content: content.to_string(),
                content_line: 1,
            });
        }

        let split = split_frontmatter(content, path)?;
        let raw: serde_json::Value = match split.frontmatter {
            Some(block) if !block.trim().is_empty() => {
                serde_yaml::from_str(block).map_err(|e| ParseError::Frontmatter {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
            _ => serde_json::Value::Null,
        };

        let metadata = if raw.is_null() {
            TaskMetadata::default()
        } else {
            serde_json::from_value::<TaskMetadata>(raw.clone()).unwrap_or_else(|error| {
                tracing::debug!(path = %path.display(), %error, "frontmatter does not fit typed shape");
                TaskMetadata::default()
            })
        };

        Ok(ParsedFile {
            file_type,
            path: path.to_path_buf(),
            metadata: Metadata::Task { metadata, raw },
            content: split.body,
            content_line: split.body_line,
        })
    }

    fn file_type(&self) -> FileType {
        FileType::Markdown
    }
}

struct Split<'a> {
    frontmatter: Option<&'a str>,
    body: String,
    body_line: usize,
}

/// Separate an optional frontmatter block from the body.
///
/// The first line must be exactly `---` (a trailing `\r` is tolerated) to open
/// a block; the first later line equal to `---` closes it.
fn split_frontmatter<'a>(content: &'a str, path: &Path) -> Result<Split<'a>, ParseError> {
    let is_delimiter = |line: &str| line.strip_suffix('\r').unwrap_or(line) == FRONTMATTER_DELIMITER;

    let mut lines = content.split('\n');
    let Some(first) = lines.next() else {
        return Ok(Split {
            frontmatter: None,
            body: String::new(),
            body_line: 1,
        });
    };
    if !is_delimiter(first) {
        return Ok(Split {
            frontmatter: None,
            body: content.to_string(),
            body_line: 1,
        });
    }

    let block_start = first.len() + 1;
    let mut offset = block_start;
    for (index, line) in lines.enumerate() {
        if is_delimiter(line) {
            let frontmatter = content.get(block_start..offset).unwrap_or_default();
            let body_start = (offset + line.len() + 1).min(content.len());
            return Ok(Split {
                frontmatter: Some(frontmatter),
                body: content[body_start..].to_string(),
                // first line is the opener, `index` counts lines after it
                body_line: index + 3,
            });
        }
        offset += line.len() + 1;
    }

    Err(ParseError::UnclosedFrontmatter {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(content: &str, path: &str) -> ParsedFile {
        MarkdownParser.parse_content(content, Path::new(path)).unwrap()
    }

    #[rstest]
    #[case(".agentkit/tasks/review.md", FileType::Task)]
    #[case(".agentkit/local/tasks/custom.md", FileType::Task)]
    #[case(".agentkit/templates/report.md", FileType::Template)]
    #[case(".agentkit/data/standards.md", FileType::Data)]
    #[case(".agentkit/data/nested/more.md", FileType::Data)]
    #[case("README.md", FileType::Markdown)]
    #[case("docs/tasks.md", FileType::Markdown)]
    fn file_type_from_directory(#[case] path: &str, #[case] expected: FileType) {
        assert_eq!(MarkdownParser::detect_file_type(Path::new(path)), expected);
    }

    #[test]
    fn task_frontmatter_is_split_from_body() {
        let content = "---\ndependencies:\n  templates:\n    - report.md\n  data: [standards.md]\n  mcp: [github]\n---\n# Review\nBody\n";
        let parsed = parse(content, "tasks/review.md");

        assert_eq!(parsed.file_type, FileType::Task);
        assert_eq!(parsed.content, "# Review\nBody\n");
        assert_eq!(parsed.content_line, 8);

        let metadata = parsed.task_metadata().unwrap();
        assert_eq!(metadata.templates(), ["report.md".to_string()]);
        assert_eq!(metadata.data(), ["standards.md".to_string()]);
        assert_eq!(
            metadata.dependencies.as_ref().unwrap().mcp,
            vec!["github".to_string()]
        );
    }

    #[test]
    fn task_without_frontmatter_has_empty_metadata() {
        let parsed = parse("# Review\n---\nnot frontmatter\n", "tasks/review.md");
        assert_eq!(parsed.content, "# Review\n---\nnot frontmatter\n");
        assert_eq!(parsed.content_line, 1);
        assert_eq!(parsed.task_metadata(), Some(&TaskMetadata::default()));
    }

    #[test]
    fn empty_frontmatter_is_valid() {
        let parsed = parse("---\n---\nBody", "tasks/review.md");
        assert_eq!(parsed.content, "Body");
        let Metadata::Task { raw, metadata } = &parsed.metadata else {
            panic!("expected task metadata");
        };
        assert!(raw.is_null());
        assert!(metadata.templates().is_empty());
    }

    #[test]
    fn crlf_delimiters_are_recognised() {
        let parsed = parse(
            "---\r\ndependencies:\r\n  data: [a.md]\r\n---\r\nBody",
            "tasks/review.md",
        );
        assert_eq!(parsed.content, "Body");
        assert_eq!(parsed.task_metadata().unwrap().data(), ["a.md".to_string()]);
    }

    #[test]
    fn unclosed_frontmatter_is_an_error() {
        let err = MarkdownParser
            .parse_content("---\ndependencies: {}\n# body", Path::new("tasks/a.md"))
            .unwrap_err();
        assert!(matches!(err, ParseError::UnclosedFrontmatter { .. }));
        assert_eq!(err.code(), lintel_core::ErrorCode::FrontmatterParse);
    }

    #[test]
    fn malformed_frontmatter_yaml_is_an_error() {
        let err = MarkdownParser
            .parse_content("---\ndependencies: [\n---\n", Path::new("tasks/a.md"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Frontmatter { .. }));
    }

    #[test]
    fn templates_never_parse_frontmatter() {
        let parsed = parse("---\nnot: parsed\n", "templates/report.md");
        assert_eq!(parsed.file_type, FileType::Template);
        assert_eq!(parsed.metadata, Metadata::None);
        assert_eq!(parsed.content, "---\nnot: parsed\n");
    }
}
