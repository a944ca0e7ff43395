//! Directory layout of a framework repository.
//!
//! ```text
//! <project>/<marker>/agents/*.{yaml,yml}
//! <project>/<marker>/tasks/*.md
//! <project>/<marker>/local/tasks/*.md
//! <project>/<marker>/templates/*.md
//! <project>/<marker>/data/*
//! ```
//!
//! Cross-references are written relative to the project root, e.g.
//! `./<marker>/templates/report.md`, and assets are identified by their
//! project-relative path with forward slashes (`<marker>/templates/report.md`).

use std::path::{Component, Path, PathBuf};

pub const DEFAULT_MARKER: &str = ".agentkit";

pub const AGENTS_DIR: &str = "agents";
pub const TASKS_DIR: &str = "tasks";
pub const LOCAL_DIR: &str = "local";
pub const TEMPLATES_DIR: &str = "templates";
pub const DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkLayout {
    project_root: PathBuf,
    marker: String,
}

impl FrameworkLayout {
    pub fn new(project_root: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            marker: marker.into(),
        }
    }

    pub fn with_default_marker(project_root: impl Into<PathBuf>) -> Self {
        Self::new(project_root, DEFAULT_MARKER)
    }

    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    #[must_use]
    pub fn framework_dir(&self) -> PathBuf {
        self.project_root.join(&self.marker)
    }

    #[must_use]
    pub fn agents_dir(&self) -> PathBuf {
        self.framework_dir().join(AGENTS_DIR)
    }

    #[must_use]
    pub fn tasks_dir(&self) -> PathBuf {
        self.framework_dir().join(TASKS_DIR)
    }

    #[must_use]
    pub fn local_tasks_dir(&self) -> PathBuf {
        self.framework_dir().join(LOCAL_DIR).join(TASKS_DIR)
    }

    #[must_use]
    pub fn templates_dir(&self) -> PathBuf {
        self.framework_dir().join(TEMPLATES_DIR)
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.framework_dir().join(DATA_DIR)
    }

    /// `./<marker>/tasks/`
    #[must_use]
    pub fn standard_tasks_prefix(&self) -> String {
        format!("./{}/{TASKS_DIR}/", self.marker)
    }

    /// `./<marker>/local/tasks/`
    #[must_use]
    pub fn local_tasks_prefix(&self) -> String {
        format!("./{}/{LOCAL_DIR}/{TASKS_DIR}/", self.marker)
    }

    /// Whether `reference` names a task through either tasks prefix.
    #[must_use]
    pub fn is_task_reference(&self, reference: &str) -> bool {
        reference.starts_with(&self.standard_tasks_prefix())
            || reference.starts_with(&self.local_tasks_prefix())
    }

    #[must_use]
    pub fn is_local_task_reference(&self, reference: &str) -> bool {
        reference.starts_with(&self.local_tasks_prefix())
    }

    /// Path of a `./<marker>/...` style reference, lexically normalized.
    #[must_use]
    pub fn resolve_reference(&self, reference: &str) -> PathBuf {
        let clean = reference.strip_prefix("./").unwrap_or(reference);
        normalize(&self.project_root.join(clean))
    }

    /// Path of `target` inside the asset directory `dir`, lexically
    /// normalized.
    #[must_use]
    pub fn resolve_in(&self, dir: &str, target: &str) -> PathBuf {
        normalize(&self.framework_dir().join(dir).join(target))
    }

    /// Whether `path` stays inside the framework directory once `..`
    /// segments are applied.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        normalize(path).starts_with(normalize(&self.framework_dir()))
    }

    /// Project-relative identifier for `path`, using `/` separators.
    ///
    /// `.` and `..` segments are applied first, so two spellings of the same
    /// file share one identifier. Paths outside the project root are returned
    /// as given.
    #[must_use]
    pub fn relative(&self, path: &Path) -> String {
        let path = normalize(path);
        let root = normalize(&self.project_root);
        let relative = path.strip_prefix(&root).unwrap_or(path.as_path());
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                Component::ParentDir => Some(String::from("..")),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Apply `.` and `..` segments without touching the filesystem.
///
/// A `..` that would climb above the start of a relative path is kept; one
/// above the root of an absolute path is dropped.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}
