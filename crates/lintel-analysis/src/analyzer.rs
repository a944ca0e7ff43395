//! The analysis pipeline.
//!
//! A full run discovers every asset, parses and validates each file, checks
//! agent task paths, scans references, detects cycles and orphans, checks tag
//! balance in markdown and finally builds insights. Per-file problems become
//! issues; only a missing framework directory or an unreadable asset
//! directory fails the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use lintel_core::{
    ErrorCode, FrameworkInsights, FrameworkLayout, IssueKind, Severity, ValidationIssue,
    ValidationResult, ValidationSummary,
};
use lintel_schema::SchemaRegistry;

use crate::agents::{check_task_paths, misnamed_agent_issue};
use crate::cache::AnalysisCache;
use crate::discovery::FrameworkFiles;
use crate::error::AnalysisError;
use crate::graph::{Cycle, DependencyGraph};
use crate::insights::build_insights;
use crate::orphans::find_orphans;
use crate::parsers::{ParsedFile, ParserRegistry, extension_of};
use crate::references::{ReferenceScanner, reference_issues};
use crate::tags::tag_issues;
use crate::validators::ValidatorRegistry;

/// Result of a full or cached analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub issues: Vec<ValidationIssue>,
    pub insights: FrameworkInsights,
    /// Files that went through a parser.
    pub files_processed: usize,
    pub from_cache: bool,
}

impl Analysis {
    #[must_use]
    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary::from_issues(&self.issues)
    }
}

/// Result of [`FrameworkAnalyzer::validate_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchValidation {
    /// One verdict per processed file, in input order.
    pub results: Vec<ValidationResult>,
    pub summary: ValidationSummary,
    pub files_processed: usize,
    /// Whether the cancel flag stopped the batch early.
    pub cancelled: bool,
}

pub struct FrameworkAnalyzer {
    layout: FrameworkLayout,
    parsers: ParserRegistry,
    validators: ValidatorRegistry,
    scanner: ReferenceScanner,
    cache: AnalysisCache,
}

impl std::fmt::Debug for FrameworkAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameworkAnalyzer")
            .field("layout", &self.layout)
            .field("parsers", &self.parsers)
            .field("validators", &self.validators)
            .field("tracked_files", &self.cache.tracker.len())
            .finish_non_exhaustive()
    }
}

impl FrameworkAnalyzer {
    /// Analyzer with the default parsers and the schema validator.
    #[must_use]
    pub fn new(layout: FrameworkLayout, schemas: Arc<SchemaRegistry>) -> Self {
        Self::with_registries(
            layout,
            ParserRegistry::with_defaults(),
            ValidatorRegistry::with_defaults(schemas),
        )
    }

    #[must_use]
    pub fn with_registries(
        layout: FrameworkLayout,
        parsers: ParserRegistry,
        validators: ValidatorRegistry,
    ) -> Self {
        Self {
            layout,
            parsers,
            validators,
            scanner: ReferenceScanner::default(),
            cache: AnalysisCache::new(),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &FrameworkLayout {
        &self.layout
    }

    /// Disk reads performed for file contents so far.
    #[must_use]
    pub const fn content_reads(&self) -> usize {
        self.cache.contents.reads()
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Run the whole pipeline and refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::FrameworkMissing`] if the framework directory
    /// does not exist, or [`AnalysisError::Walk`] if an asset directory cannot
    /// be listed.
    pub fn analyze_framework(&mut self) -> Result<Analysis, AnalysisError> {
        let files = self.discover()?;
        Ok(self.run(&files))
    }

    /// Return the cached issues when no asset changed since the last run,
    /// otherwise run the whole pipeline. Insights are always recomputed.
    ///
    /// # Errors
    ///
    /// Same as [`FrameworkAnalyzer::analyze_framework`].
    pub fn optimized_analyze_framework(&mut self) -> Result<Analysis, AnalysisError> {
        let files = self.discover()?;
        let cached = self.cache.issues().map(<[ValidationIssue]>::to_vec);
        if let Some(issues) = cached {
            if !self.cache.tracker.are_any_files_modified(&files) {
                tracing::debug!(issues = issues.len(), "analysis cache hit");
                let parsed = self.parse_quietly(&files);
                let references = self.scanner.scan(&parsed, &self.layout);
                return Ok(Analysis {
                    insights: build_insights(&files, &references, &self.layout, None),
                    issues,
                    files_processed: parsed.len(),
                    from_cache: true,
                });
            }
        }
        tracing::debug!("analysis cache miss");
        Ok(self.run(&files))
    }

    /// Insights with relationships limited to the named agents.
    ///
    /// Names are agent file stems. Unknown names are logged and skipped.
    ///
    /// # Errors
    ///
    /// Same as [`FrameworkAnalyzer::analyze_framework`].
    pub fn insights_for_agents(
        &mut self,
        names: &[&str],
    ) -> Result<FrameworkInsights, AnalysisError> {
        let files = self.discover()?;
        let known: Vec<String> = files
            .agent_documents()
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        for name in names {
            if !known.iter().any(|k| k == name) {
                tracing::warn!(agent = %name, "unknown agent requested for insights");
            }
        }
        let parsed = self.parse_quietly(&files);
        let references = self.scanner.scan(&parsed, &self.layout);
        Ok(build_insights(&files, &references, &self.layout, Some(names)))
    }

    /// Parse and validate one file, reduced to its most severe result.
    ///
    /// Relative paths are taken relative to the project root.
    pub fn validate_file(&mut self, path: &Path) -> ValidationResult {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.layout.project_root().join(path)
        };
        match self.parse(&path) {
            Ok(parsed) => {
                let file = self.layout.relative(&path);
                ValidationIssue::most_severe(self.validators.validate(&parsed))
                    .unwrap_or_else(|| ValidationIssue::success(file))
            }
            Err(issue) => issue,
        }
    }

    /// Validate `paths` one by one, checking `cancel` before each file.
    pub fn validate_batch(&mut self, paths: &[PathBuf], cancel: &AtomicBool) -> BatchValidation {
        let mut results = Vec::with_capacity(paths.len());
        let mut cancelled = false;
        for path in paths {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(processed = results.len(), "batch validation cancelled");
                cancelled = true;
                break;
            }
            results.push(self.validate_file(path));
        }
        BatchValidation {
            summary: ValidationSummary::from_issues(&results),
            files_processed: results.len(),
            results,
            cancelled,
        }
    }

    fn discover(&self) -> Result<FrameworkFiles, AnalysisError> {
        let framework_dir = self.layout.framework_dir();
        if !framework_dir.is_dir() {
            return Err(AnalysisError::FrameworkMissing { path: framework_dir });
        }
        FrameworkFiles::discover(&self.layout)
    }

    fn run(&mut self, files: &FrameworkFiles) -> Analysis {
        let mut issues: Vec<ValidationIssue> = files
            .misnamed_agents()
            .map(|path| misnamed_agent_issue(path, &self.layout))
            .collect();

        let mut parsed = Vec::new();
        for path in files.parseable() {
            match self.parse(path) {
                Ok(file) => {
                    let results = self.validators.validate(&file);
                    if results.is_empty() {
                        issues.push(ValidationIssue::success(self.layout.relative(path)));
                    } else {
                        issues.extend(results);
                    }
                    parsed.push(file);
                }
                Err(issue) => issues.push(issue),
            }
        }
        tracing::debug!(files = parsed.len(), "files validated");

        for file in &parsed {
            issues.extend(check_task_paths(file, &self.layout));
        }

        let references = self.scanner.scan(&parsed, &self.layout);
        issues.extend(reference_issues(&references));

        let graph = DependencyGraph::build(&parsed, &references);
        issues.extend(graph.find_cycles().iter().map(Cycle::to_issue));
        issues.extend(find_orphans(files.orphan_candidates(), &references, &self.layout));

        for file in parsed.iter().filter(|file| file.file_type.is_markdown()) {
            issues.extend(tag_issues(file));
        }

        let insights = build_insights(files, &references, &self.layout, None);
        self.cache.store(files, issues.clone());

        let summary = ValidationSummary::from_issues(&issues);
        tracing::info!(
            files = parsed.len(),
            critical = summary.critical_count,
            errors = summary.error_count,
            warnings = summary.warning_count,
            "framework analysis complete"
        );

        Analysis {
            issues,
            insights,
            files_processed: files.parseable().count(),
            from_cache: false,
        }
    }

    /// Files that parse, skipping failures silently.
    fn parse_quietly(&mut self, files: &FrameworkFiles) -> Vec<ParsedFile> {
        files
            .parseable()
            .filter_map(|path| self.parse(path).ok())
            .collect()
    }

    /// Parse `path` as its project-relative id, turning failures into issues.
    fn parse(&mut self, path: &Path) -> Result<ParsedFile, ValidationIssue> {
        let id = self.layout.relative(path);
        let parser = self.parsers.get_parser(path).map_err(|error| {
            ValidationIssue::new(
                Severity::Error,
                IssueKind::ParserError,
                ErrorCode::InvalidFormat,
                id.clone(),
                format!("No parser available: {error}"),
            )
            .with_fix(format!(
                "Use a supported file extension instead of .{}",
                extension_of(path)
            ))
        })?;

        let parse_failure = |message: String, code: ErrorCode| {
            ValidationIssue::new(
                Severity::Critical,
                IssueKind::ParseError,
                code,
                id.clone(),
                format!("Failed to parse file: {message}"),
            )
            .with_fix("Check file syntax and formatting")
        };

        let content = self
            .cache
            .contents
            .read(path)
            .map_err(|error| parse_failure(error.to_string(), ErrorCode::ParseError))?;
        parser
            .parse_content(&content, Path::new(&id))
            .map_err(|error| parse_failure(error.to_string(), error.code()))
    }
}
