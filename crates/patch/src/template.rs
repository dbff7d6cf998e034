// ABOUTME: HTML templates with {{TOKEN}} placeholders filled by literal substitution.
// ABOUTME: Defines the article placeholder vocabulary and single-pass rendering.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{PatchError, Result};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([A-Z][A-Z0-9_]*)\}\}").unwrap());

/// The placeholders understood by the article template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    ArticleTitle,
    SourceUrl,
    PublishDate,
    ArticleBody,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::ArticleTitle,
        Placeholder::SourceUrl,
        Placeholder::PublishDate,
        Placeholder::ArticleBody,
    ];

    /// Name inside the braces.
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::ArticleTitle => "ARTICLE_TITLE",
            Placeholder::SourceUrl => "SUBSTACK_URL",
            Placeholder::PublishDate => "PUBLISH_DATE",
            Placeholder::ArticleBody => "ARTICLE_BODY",
        }
    }

    /// Full token as it appears in the template, e.g. `{{ARTICLE_TITLE}}`.
    pub fn token(&self) -> String {
        format!("{{{{{}}}}}", self.name())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A loaded template.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    text: String,
}

impl Template {
    /// Read a template from disk. A missing file is a `Missing` error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PatchError::missing(path, "load template", "template file not found"));
        }
        let text = fs::read_to_string(path).map_err(|e| PatchError::io(path, "load template", e))?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            path: PathBuf::new(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Placeholders the template never mentions.
    pub fn missing_placeholders(&self) -> Vec<Placeholder> {
        Placeholder::ALL
            .iter()
            .copied()
            .filter(|p| !self.text.contains(&p.token()))
            .collect()
    }

    /// Substitute `values` into the template.
    ///
    /// Substitution is a single pass over the template, so a value that itself
    /// contains a token is inserted verbatim. Unknown tokens are left in place.
    pub fn render(&self, values: &[(Placeholder, &str)]) -> String {
        let lookup: HashMap<&str, &str> = values.iter().map(|(p, v)| (p.name(), *v)).collect();
        TOKEN_RE
            .replace_all(&self.text, |caps: &Captures| match lookup.get(&caps[1]) {
                Some(value) => (*value).to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
