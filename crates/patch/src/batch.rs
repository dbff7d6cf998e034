// ABOUTME: Batch runner that applies a FileTransform to every walked file and writes only on change.
// ABOUTME: Isolates per-file failures and aggregates outcomes into a serializable BatchReport.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PatchError, Result};
use crate::walk::FileWalker;

/// Result of transforming one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    /// New text to write back.
    Changed(String),
    /// The text already has the desired shape.
    Unchanged,
    /// The file is not a candidate for this transform.
    Skipped(String),
}

/// A whole-file transformation applied by [`run_batch`].
pub trait FileTransform {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Transform `text`, the content of the file at `path`.
    fn transform(&self, path: &Path, text: &str) -> Result<Transformed>;
}

/// Per-file outcome recorded in a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Updated { path: PathBuf },
    Unchanged { path: PathBuf },
    Skipped { path: PathBuf, reason: String },
    Failed { path: PathBuf, error: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Updated { path }
            | FileOutcome::Unchanged { path }
            | FileOutcome::Skipped { path, .. }
            | FileOutcome::Failed { path, .. } => path,
        }
    }
}

/// Aggregated outcomes of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub operation: String,
    pub dry_run: bool,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    fn new(operation: &str, dry_run: bool) -> Self {
        Self {
            operation: operation.to_string(),
            dry_run,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Updated { .. } => self.updated += 1,
            FileOutcome::Unchanged { .. } => self.unchanged += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.files.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Paths that were (or in a dry run, would have been) rewritten.
    pub fn updated_paths(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|o| matches!(o, FileOutcome::Updated { .. }))
            .map(FileOutcome::path)
            .collect()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "would update" } else { "updated" };
        format!(
            "{}: {} {}, {} unchanged, {} skipped, {} failed",
            self.operation, verb, self.updated, self.unchanged, self.skipped, self.failed
        )
    }
}

/// Options controlling how a batch writes its results.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Compute outcomes without touching the filesystem.
    pub dry_run: bool,
}

/// Apply `transform` to a single file, writing it back only when the text changed.
pub fn apply_to_file<T: FileTransform + ?Sized>(
    transform: &T,
    path: &Path,
    opts: BatchOptions,
) -> Result<FileOutcome> {
    let text = fs::read_to_string(path).map_err(|e| PatchError::io(path, "read", e))?;
    let outcome = match transform.transform(path, &text)? {
        Transformed::Changed(new_text) if new_text != text => {
            if !opts.dry_run {
                fs::write(path, new_text).map_err(|e| PatchError::io(path, "write", e))?;
            }
            FileOutcome::Updated {
                path: path.to_path_buf(),
            }
        }
        Transformed::Changed(_) | Transformed::Unchanged => FileOutcome::Unchanged {
            path: path.to_path_buf(),
        },
        Transformed::Skipped(reason) => FileOutcome::Skipped {
            path: path.to_path_buf(),
            reason,
        },
    };
    Ok(outcome)
}

/// Run `transform` over every file produced by `walker`.
///
/// A failing file is logged and recorded; the remaining files are still processed.
/// Writes already made are never rolled back.
pub fn run_batch<T: FileTransform + ?Sized>(
    transform: &T,
    walker: &FileWalker,
    opts: BatchOptions,
) -> BatchReport {
    let name = transform.name();
    let mut report = BatchReport::new(name, opts.dry_run);
    tracing::info!(op = name, root = %walker.root().display(), "starting");

    for path in walker.walk() {
        let outcome = match apply_to_file(transform, &path, opts) {
            Ok(outcome) => outcome,
            Err(err) => FileOutcome::Failed {
                path: path.clone(),
                error: err.to_string(),
            },
        };
        log_outcome(name, &outcome, opts.dry_run);
        report.record(outcome);
    }

    tracing::info!(op = name, "{}", report.summary());
    report
}

fn log_outcome(op: &str, outcome: &FileOutcome, dry_run: bool) {
    match outcome {
        FileOutcome::Updated { path } if dry_run => {
            tracing::info!(op, path = %path.display(), "would update")
        }
        FileOutcome::Updated { path } => tracing::info!(op, path = %path.display(), "updated"),
        FileOutcome::Unchanged { path } => {
            tracing::debug!(op, path = %path.display(), "no changes needed")
        }
        FileOutcome::Skipped { path, reason } => {
            tracing::debug!(op, path = %path.display(), reason = %reason, "skipped")
        }
        FileOutcome::Failed { path, error } => {
            tracing::warn!(op, path = %path.display(), error = %error, "error processing file")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Upcase;

    impl FileTransform for Upcase {
        fn name(&self) -> &str {
            "upcase"
        }

        fn transform(&self, path: &Path, text: &str) -> Result<Transformed> {
            if text.contains("boom") {
                return Err(PatchError::parse(path, "upcase", None));
            }
            if text.contains("skip") {
                return Ok(Transformed::Skipped("asked to".to_string()));
            }
            Ok(Transformed::Changed(text.to_uppercase()))
        }
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "hello").unwrap();
        fs::write(dir.path().join("b.html"), "DONE").unwrap();
        fs::write(dir.path().join("c.html"), "boom").unwrap();
        fs::write(dir.path().join("d.html"), "skip me").unwrap();
        dir
    }

    #[test]
    fn writes_only_changed_files_and_isolates_failures() {
        let dir = site();
        let report = run_batch(&Upcase, &FileWalker::new(dir.path()), BatchOptions::default());

        assert_eq!(report.updated, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.total(), 4);
        assert!(report.has_failures());
        assert_eq!(fs::read_to_string(dir.path().join("a.html")).unwrap(), "HELLO");
        assert_eq!(fs::read_to_string(dir.path().join("c.html")).unwrap(), "boom");
        assert_eq!(report.updated_paths(), vec![dir.path().join("a.html").as_path()]);
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let dir = site();
        let report = run_batch(
            &Upcase,
            &FileWalker::new(dir.path()),
            BatchOptions { dry_run: true },
        );
        assert_eq!(report.updated, 1);
        assert_eq!(fs::read_to_string(dir.path().join("a.html")).unwrap(), "hello");
        assert!(report.summary().contains("would update 1"));
    }

    #[test]
    fn report_serializes_with_status_tags() {
        let mut report = BatchReport::new("demo", false);
        report.record(FileOutcome::Skipped {
            path: PathBuf::from("x.html"),
            reason: "no head".to_string(),
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["files"][0]["status"], "skipped");
        assert_eq!(json["files"][0]["reason"], "no head");
    }
}
