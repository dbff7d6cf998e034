// ABOUTME: Error types for site patching including ErrorCode enum and PatchError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;
use std::path::{Path, PathBuf};

/// Error codes representing different categories of patch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Io,
    Parse,
    Config,
    Missing,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Io => "I/O error",
            ErrorCode::Parse => "parse error",
            ErrorCode::Config => "config error",
            ErrorCode::Missing => "not found",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for patch operations.
#[derive(Debug, thiserror::Error)]
pub struct PatchError {
    pub code: ErrorCode,
    pub path: PathBuf,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.op, self.path.display(), self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl PatchError {
    fn new(
        code: ErrorCode,
        path: impl AsRef<Path>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            path: path.as_ref().to_path_buf(),
            op: op.into(),
            source,
        }
    }

    /// Create an Io error from a std::io::Error.
    pub fn io(path: impl AsRef<Path>, op: impl Into<String>, err: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, path, op, Some(err.into()))
    }

    /// Create a Parse error.
    pub fn parse(
        path: impl AsRef<Path>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Parse, path, op, source)
    }

    /// Create a Config error.
    pub fn config(
        path: impl AsRef<Path>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Config, path, op, source)
    }

    /// Create a Missing error (a required element or file is absent).
    pub fn missing(path: impl AsRef<Path>, op: impl Into<String>, what: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::Missing,
            path,
            op,
            Some(anyhow::anyhow!("{}", what)),
        )
    }

    /// Returns true if this is an Io error.
    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is a Missing error.
    pub fn is_missing(&self) -> bool {
        self.code == ErrorCode::Missing
    }
}

/// Result alias used throughout folio-patch.
pub type Result<T> = std::result::Result<T, PatchError>;
