//! Asset enumeration.
//!
//! Each asset directory is listed one level deep with `ignore::WalkBuilder`
//! (standard filters off, so hidden and git-ignored files are still assets)
//! and sorted by file name, which makes discovery order deterministic.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use lintel_core::FrameworkLayout;

use crate::error::AnalysisError;
use crate::parsers::extension_of;

const AGENT_DOCUMENT_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Every asset file of a framework, grouped by role, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameworkFiles {
    /// All files under `agents/`, including ones with a wrong extension.
    pub agents: Vec<PathBuf>,
    pub tasks: Vec<PathBuf>,
    pub local_tasks: Vec<PathBuf>,
    pub templates: Vec<PathBuf>,
    /// All files under `data/`, whatever their extension.
    pub data: Vec<PathBuf>,
}

impl FrameworkFiles {
    /// List the asset directories of `layout`. Missing directories are empty.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Walk`] if an existing directory cannot be read.
    pub fn discover(layout: &FrameworkLayout) -> Result<Self, AnalysisError> {
        let any = glob_set(&["*"])?;
        let markdown = glob_set(&["*.md"])?;
        Ok(Self {
            agents: list_files(&layout.agents_dir(), &any)?,
            tasks: list_files(&layout.tasks_dir(), &markdown)?,
            local_tasks: list_files(&layout.local_tasks_dir(), &markdown)?,
            templates: list_files(&layout.templates_dir(), &markdown)?,
            data: list_files(&layout.data_dir(), &any)?,
        })
    }

    /// Agent files with a `.yaml`/`.yml` extension.
    pub fn agent_documents(&self) -> impl Iterator<Item = &PathBuf> {
        self.agents.iter().filter(|path| is_agent_document(path))
    }

    /// Agent files with any other extension.
    pub fn misnamed_agents(&self) -> impl Iterator<Item = &PathBuf> {
        self.agents.iter().filter(|path| !is_agent_document(path))
    }

    /// Standard then local tasks.
    pub fn all_tasks(&self) -> impl Iterator<Item = &PathBuf> {
        self.tasks.iter().chain(&self.local_tasks)
    }

    /// Data files that are markdown.
    pub fn markdown_data(&self) -> impl Iterator<Item = &PathBuf> {
        self.data.iter().filter(|path| extension_of(path) == "md")
    }

    /// Files that go through a parser: agent documents, tasks, local tasks,
    /// templates and markdown data, in that order.
    pub fn parseable(&self) -> impl Iterator<Item = &PathBuf> {
        self.agent_documents()
            .chain(self.all_tasks())
            .chain(&self.templates)
            .chain(self.markdown_data())
    }

    /// Templates then data: the files orphan detection considers.
    pub fn orphan_candidates(&self) -> impl Iterator<Item = &PathBuf> {
        self.templates.iter().chain(&self.data)
    }

    /// Every discovered file. This is the set the change tracker watches.
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.agents
            .iter()
            .chain(self.all_tasks())
            .chain(&self.templates)
            .chain(&self.data)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
            + self.tasks.len()
            + self.local_tasks.len()
            + self.templates.len()
            + self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn is_agent_document(path: &Path) -> bool {
    AGENT_DOCUMENT_EXTENSIONS.contains(&extension_of(path).as_str())
}

fn glob_set(patterns: &[&str]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Regular files directly inside `dir` whose name matches `filter`, sorted
/// by file name.
fn list_files(dir: &Path, filter: &GlobSet) -> Result<Vec<PathBuf>, AnalysisError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = entry.map_err(|source| AnalysisError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if filter.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn discovers_each_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let layout = FrameworkLayout::with_default_marker(dir.path());
        for file in [
            ".agentkit/agents/zed.yaml",
            ".agentkit/agents/amy.yml",
            ".agentkit/agents/notes.txt",
            ".agentkit/tasks/b.md",
            ".agentkit/tasks/a.md",
            ".agentkit/tasks/skip.txt",
            ".agentkit/local/tasks/custom.md",
            ".agentkit/templates/report.md",
            ".agentkit/data/standards.md",
            ".agentkit/data/schema.json",
            ".agentkit/data/nested/deep.md",
        ] {
            touch(dir.path(), file);
        }

        let files = FrameworkFiles::discover(&layout).unwrap();
        assert_eq!(names(&files.agents), ["amy.yml", "notes.txt", "zed.yaml"]);
        assert_eq!(names(&files.tasks), ["a.md", "b.md"]);
        assert_eq!(names(&files.local_tasks), ["custom.md"]);
        assert_eq!(names(&files.templates), ["report.md"]);
        assert_eq!(names(&files.data), ["schema.json", "standards.md"]);
        assert_eq!(files.len(), 9);

        let misnamed: Vec<&PathBuf> = files.misnamed_agents().collect();
        assert_eq!(misnamed.len(), 1);
        assert!(misnamed[0].ends_with("notes.txt"));
        assert_eq!(files.parseable().count(), 7);
    }

    #[test]
    fn missing_directories_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".agentkit")).unwrap();
        let files = FrameworkFiles::discover(&FrameworkLayout::with_default_marker(dir.path()))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn hidden_files_are_assets() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".agentkit/templates/.draft.md");
        let files = FrameworkFiles::discover(&FrameworkLayout::with_default_marker(dir.path()))
            .unwrap();
        assert_eq!(names(&files.templates), [".draft.md"]);
    }
}
