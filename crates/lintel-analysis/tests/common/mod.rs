//! Throwaway framework repositories for integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use lintel_analysis::FrameworkAnalyzer;
use lintel_core::FrameworkLayout;
use lintel_schema::{EmbeddedSchemas, SchemaRegistry};
use tempfile::TempDir;

pub const MARKER: &str = ".agentkit";

pub struct Framework {
    dir: TempDir,
}

impl Framework {
    /// A project root with an empty `.agentkit` directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(MARKER)).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(MARKER).join(relative)
    }

    /// Write `content` to `<marker>/<relative>`, creating directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// A schema-valid agent listing `tasks` by file name under `tasks/`.
    pub fn agent(&self, id: &str, tasks: &[&str]) -> PathBuf {
        let entries: Vec<String> = tasks
            .iter()
            .map(|task| format!("./{MARKER}/tasks/{task}"))
            .collect();
        let entries: Vec<&str> = entries.iter().map(String::as_str).collect();
        self.write(&format!("agents/{id}.yaml"), &agent_yaml(id, &entries))
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.path(relative)).unwrap();
    }

    /// Rewrite a file and push its mtime forward so the change is visible
    /// regardless of filesystem timestamp resolution.
    pub fn modify(&self, relative: &str, content: &str, seconds_ahead: u64) {
        let path = self.write(relative, content);
        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(seconds_ahead))
            .unwrap();
    }

    pub fn layout(&self) -> FrameworkLayout {
        FrameworkLayout::with_default_marker(self.root())
    }

    pub fn analyzer(&self) -> FrameworkAnalyzer {
        let schemas = SchemaRegistry::from_source(&EmbeddedSchemas).unwrap();
        FrameworkAnalyzer::new(self.layout(), Arc::new(schemas))
    }
}

/// Agent YAML that satisfies the embedded agent schema.
pub fn agent_yaml(id: &str, task_paths: &[&str]) -> String {
    let mut yaml = format!(
        "agent:
  identity:
    name: {id}
    id: {id}
    version: \"1.0.0\"
    description: Test agent
    role: Tester
    goal: Check the framework
  activation_prompt:
    - Greet the user
  principles:
    - Be precise
  customization: \"\"
  commands:
    help: Show commands
    chat: Chat with the agent
    exit: Leave the agent
"
    );
    if !task_paths.is_empty() {
        yaml.push_str("  tasks:\n");
        for path in task_paths {
            yaml.push_str("    - ");
            yaml.push_str(path);
            yaml.push('\n');
        }
    }
    yaml
}

/// Task markdown with a frontmatter dependency block.
pub fn task_with_dependencies(templates: &[&str], data: &[&str], body: &str) -> String {
    format!(
        "---\ndependencies:\n  templates: [{}]\n  data: [{}]\n---\n{body}",
        templates.join(", "),
        data.join(", ")
    )
}
