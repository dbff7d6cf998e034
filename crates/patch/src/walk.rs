// ABOUTME: Recursive file walker that yields HTML files under a root directory.
// ABOUTME: Supports excluded directories, excluded file names and depth bounds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Lazily enumerates `.html` files beneath a root.
///
/// Directories that cannot be read are skipped; the walk never fails as a whole.
/// Entries are visited in file-name order so batch logs are stable between runs.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    exclude_dirs: HashSet<PathBuf>,
    exclude_files: HashSet<String>,
    min_depth: usize,
    max_depth: usize,
}

impl FileWalker {
    /// Walk every `.html` file under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_dirs: HashSet::new(),
            exclude_files: HashSet::new(),
            min_depth: 1,
            max_depth: usize::MAX,
        }
    }

    /// Skip a directory (and everything beneath it).
    pub fn exclude_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exclude_dirs.insert(dir.into());
        self
    }

    pub fn exclude_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.exclude_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Skip files with this exact name wherever they appear.
    pub fn exclude_file(mut self, name: impl Into<String>) -> Self {
        self.exclude_files.insert(name.into());
        self
    }

    pub fn exclude_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_files.extend(names.into_iter().map(Into::into));
        self
    }

    /// Only yield files at least `depth` levels below the root (1 = direct children).
    pub fn min_depth(mut self, depth: usize) -> Self {
        self.min_depth = depth;
        self
    }

    /// Only descend `depth` levels below the root.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if `name` is on the file exclusion list.
    pub fn is_excluded_file(&self, name: &str) -> bool {
        self.exclude_files.contains(name)
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.file_type().is_dir() {
            return !self.exclude_dirs.contains(entry.path());
        }
        true
    }

    fn matches(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_file() {
            return false;
        }
        let path = entry.path();
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("html"))
            .unwrap_or(false);
        if !ext_ok {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if self.is_excluded_file(&name) {
            tracing::info!(file = %name, "skipping excluded file");
            return false;
        }
        true
    }

    /// Returns the lazy sequence of matching file paths.
    pub fn walk(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .min_depth(self.min_depth)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| self.keep_entry(e))
            .filter_map(|res| match res {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(move |e| self.matches(e))
            .map(DirEntry::into_path)
    }
}
