//! Balance checking for custom angle-bracket tags in markdown prose.
//!
//! Fenced blocks (```` ``` ```` or `~~~`) and inline code spans are excluded
//! before tags are matched, so `<example>` inside code never counts.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use lintel_core::{ErrorCode, IssueKind, Severity, ValidationIssue};

use crate::parsers::ParsedFile;

static BACKTICK_FENCE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^`{3}[^\n]*\n[\s\S]*?^`{3}\s*$"));
static TILDE_FENCE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^~{3}[^\n]*\n[\s\S]*?^~{3}\s*$"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`[^`]*`"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(r"<\s*(/?)([a-zA-Z_][\w\-:]*)[^>]*?(/?)\s*>"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| unreachable!("tag pattern {pattern} is valid: {e}"))
}

/// Byte range `[start, end)` of a code block or span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRange {
    pub start: usize,
    pub end: usize,
}

impl CodeRange {
    const fn encloses(self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub kind: TagKind,
    /// Byte offset of the `<`.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagIssue {
    pub message: String,
    pub name: String,
    pub offset: usize,
}

/// Fenced blocks, then inline spans that are not already inside a fence.
#[must_use]
pub fn find_code_ranges(content: &str) -> Vec<CodeRange> {
    let mut ranges: Vec<CodeRange> = BACKTICK_FENCE
        .find_iter(content)
        .chain(TILDE_FENCE.find_iter(content))
        .map(|m| CodeRange {
            start: m.start(),
            end: m.end(),
        })
        .collect();

    let fences = ranges.len();
    for span in INLINE_CODE.find_iter(content) {
        let inside_fence = ranges[..fences]
            .iter()
            .any(|range| range.encloses(span.start(), span.end()));
        if !inside_fence {
            ranges.push(CodeRange {
                start: span.start(),
                end: span.end(),
            });
        }
    }
    ranges
}

/// Tags outside code, in document order.
#[must_use]
pub fn tokenize(content: &str) -> Vec<Tag> {
    let code = find_code_ranges(content);
    TAG.captures_iter(content)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            if code
                .iter()
                .any(|range| range.encloses(whole.start(), whole.end()))
            {
                return None;
            }
            let kind = if !captures[1].is_empty() {
                TagKind::Close
            } else if !captures[3].is_empty() {
                TagKind::SelfClosing
            } else {
                TagKind::Open
            };
            Some(Tag {
                name: captures[2].to_string(),
                kind,
                offset: whole.start(),
            })
        })
        .collect()
}

/// Walk the tags of `content` with a stack.
///
/// A closing tag pops its nearest open match and reports every tag opened
/// above it as unclosed. A closing tag with no open match is reported and
/// leaves the stack alone. Whatever remains open at the end is reported.
#[must_use]
pub fn check_balance(content: &str) -> Vec<TagIssue> {
    let mut stack: Vec<Tag> = Vec::new();
    let mut issues = Vec::new();

    for tag in tokenize(content) {
        match tag.kind {
            TagKind::SelfClosing => {}
            TagKind::Open => stack.push(tag),
            TagKind::Close => {
                match stack.iter().rposition(|open| open.name == tag.name) {
                    Some(position) => {
                        issues.extend(stack.drain(position + 1..).rev().map(unclosed));
                        stack.truncate(position);
                    }
                    None => issues.push(TagIssue {
                        message: format!("Closing tag </{}> without matching opening tag", tag.name),
                        name: tag.name,
                        offset: tag.offset,
                    }),
                }
            }
        }
    }

    issues.extend(stack.into_iter().map(unclosed));
    issues
}

fn unclosed(tag: Tag) -> TagIssue {
    TagIssue {
        message: format!("Unclosed tag <{}>", tag.name),
        name: tag.name,
        offset: tag.offset,
    }
}

/// Tag-balance issues of a parsed markdown file, with original line numbers.
#[must_use]
pub fn tag_issues(parsed: &ParsedFile) -> Vec<ValidationIssue> {
    let file = parsed.path.to_string_lossy().replace('\\', "/");
    check_balance(&parsed.content)
        .into_iter()
        .map(|issue| {
            ValidationIssue::new(
                Severity::Warning,
                IssueKind::UnbalancedTag,
                ErrorCode::UnbalancedTag,
                file.clone(),
                issue.message,
            )
            .with_line(parsed.line_of(issue.offset))
            .with_fix(format!(
                "Balance <{0}> with a matching </{0}> or wrap it in backticks",
                issue.name
            ))
            .with_context(json!({ "tag": issue.name }))
        })
        .collect()
}
