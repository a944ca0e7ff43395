//! Modification-time tracking and memoised file contents.
//!
//! The cached issue list is all-or-nothing: one new, changed or vanished
//! asset invalidates it and forces a full run.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use lintel_core::ValidationIssue;

use crate::discovery::FrameworkFiles;

fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Last-seen modification time per path.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    seen: HashMap<PathBuf, SystemTime>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` is new or its mtime differs from the recorded one.
    /// The current mtime is recorded either way. Unreadable paths count as
    /// modified.
    pub fn is_file_modified(&mut self, path: &Path) -> bool {
        let Some(current) = modified_at(path) else {
            self.seen.remove(path);
            return true;
        };
        let previous = self.seen.insert(path.to_path_buf(), current);
        previous != Some(current)
    }

    /// Whether anything in `files` changed since the last record, including
    /// tracked files that are no longer present. Stops at the first change.
    pub fn are_any_files_modified(&mut self, files: &FrameworkFiles) -> bool {
        let present: std::collections::HashSet<&PathBuf> = files.all().collect();
        if self.seen.keys().any(|path| !present.contains(path)) {
            tracing::debug!("tracked asset disappeared");
            return true;
        }
        files.all().any(|path| self.is_file_modified(path))
    }

    /// Record the current mtime of every file, forgetting all others.
    pub fn record_all(&mut self, files: &FrameworkFiles) {
        self.seen = files
            .all()
            .filter_map(|path| Some((path.clone(), modified_at(path)?)))
            .collect();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

/// File contents memoised by `(path, mtime)`.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    entries: HashMap<PathBuf, (SystemTime, Arc<str>)>,
    reads: usize,
}

impl ContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of `path`, from memory when its mtime is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of reading metadata or the file itself.
    pub fn read(&mut self, path: &Path) -> io::Result<Arc<str>> {
        let modified = fs::metadata(path)?.modified()?;
        if let Some((seen, content)) = self.entries.get(path) {
            if *seen == modified {
                return Ok(Arc::clone(content));
            }
        }
        let content: Arc<str> = Arc::from(fs::read_to_string(path)?);
        self.reads += 1;
        self.entries
            .insert(path.to_path_buf(), (modified, Arc::clone(&content)));
        Ok(content)
    }

    /// Number of reads that went to disk.
    #[must_use]
    pub const fn reads(&self) -> usize {
        self.reads
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything an analyzer keeps between runs.
#[derive(Debug, Clone, Default)]
pub struct AnalysisCache {
    pub tracker: ChangeTracker,
    pub contents: ContentStore,
    issues: Option<Vec<ValidationIssue>>,
}

impl AnalysisCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn issues(&self) -> Option<&[ValidationIssue]> {
        self.issues.as_deref()
    }

    pub fn store(&mut self, files: &FrameworkFiles, issues: Vec<ValidationIssue>) {
        self.tracker.record_all(files);
        self.issues = Some(issues);
    }

    /// Drop the cached result and tracked mtimes. Memoised contents stay;
    /// they are revalidated by mtime on every read.
    pub fn invalidate(&mut self) {
        self.tracker.clear();
        self.issues = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn bump(path: &Path, seconds: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(seconds))
            .unwrap();
    }

    #[test]
    fn first_sight_is_a_modification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "a").unwrap();

        let mut tracker = ChangeTracker::new();
        assert!(tracker.is_file_modified(&path));
        assert!(!tracker.is_file_modified(&path));

        bump(&path, 60);
        assert!(tracker.is_file_modified(&path));
        assert!(!tracker.is_file_modified(&path));
    }

    #[test]
    fn missing_file_is_modified() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = ChangeTracker::new();
        assert!(tracker.is_file_modified(&dir.path().join("nope.md")));
        assert!(tracker.is_empty());
    }

    #[test]
    fn framework_changes_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let files = FrameworkFiles {
            templates: vec![a.clone(), b.clone()],
            ..FrameworkFiles::default()
        };
        let mut tracker = ChangeTracker::new();
        assert!(tracker.are_any_files_modified(&files));

        tracker.record_all(&files);
        assert_eq!(tracker.len(), 2);
        assert!(!tracker.are_any_files_modified(&files));

        bump(&b, 120);
        assert!(tracker.are_any_files_modified(&files));

        tracker.record_all(&files);
        let fewer = FrameworkFiles {
            templates: vec![a],
            ..FrameworkFiles::default()
        };
        assert!(tracker.are_any_files_modified(&fewer));
    }

    #[test]
    fn empty_framework_stays_unmodified() {
        let files = FrameworkFiles::default();
        let mut tracker = ChangeTracker::new();
        tracker.record_all(&files);
        assert!(tracker.is_empty());
        assert!(!tracker.are_any_files_modified(&files));
    }

    #[test]
    fn content_store_reads_once_per_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "first").unwrap();

        let mut store = ContentStore::new();
        assert_eq!(&*store.read(&path).unwrap(), "first");
        assert_eq!(&*store.read(&path).unwrap(), "first");
        assert_eq!(store.reads(), 1);

        fs::write(&path, "second").unwrap();
        bump(&path, 180);
        assert_eq!(&*store.read(&path).unwrap(), "second");
        assert_eq!(store.reads(), 2);
    }

    #[test]
    fn content_store_propagates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContentStore::new();
        let error = store.read(&dir.path().join("gone.md")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn invalidate_forgets_result_and_mtimes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "a").unwrap();
        let files = FrameworkFiles {
            data: vec![path],
            ..FrameworkFiles::default()
        };

        let mut cache = AnalysisCache::new();
        cache.store(&files, Vec::new());
        assert_eq!(cache.issues(), Some(&[][..]));
        assert!(!cache.tracker.are_any_files_modified(&files));

        cache.invalidate();
        assert!(cache.issues().is_none());
        assert!(cache.tracker.are_any_files_modified(&files));
    }
}
