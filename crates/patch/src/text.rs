// ABOUTME: Whole-file text patching with literal and regex substitution rules.
// ABOUTME: TextPatch wraps an ordered rule list as a FileTransform for the batch runner.

use std::path::Path;

use regex::Regex;

use crate::batch::{FileTransform, Transformed};
use crate::error::Result;

/// One substitution applied to a file's full text.
#[derive(Debug, Clone)]
pub enum TextRule {
    /// Replace every occurrence of `from` with `to`.
    Literal { from: String, to: String },
    /// Replace every match of `pattern`; `replacement` may use `$1`-style groups.
    Pattern { pattern: Regex, replacement: String },
}

impl TextRule {
    pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
        TextRule::Literal {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn pattern(pattern: Regex, replacement: impl Into<String>) -> Self {
        TextRule::Pattern {
            pattern,
            replacement: replacement.into(),
        }
    }

    /// Apply this rule to `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextRule::Literal { from, to } => {
                if from.is_empty() {
                    text.to_string()
                } else {
                    text.replace(from.as_str(), to)
                }
            }
            TextRule::Pattern {
                pattern,
                replacement,
            } => pattern.replace_all(text, replacement.as_str()).into_owned(),
        }
    }
}

/// Apply `rules` in order.
pub fn apply_rules(text: &str, rules: &[TextRule]) -> String {
    rules
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// A named, ordered list of text rules usable with the batch runner.
#[derive(Debug, Clone)]
pub struct TextPatch {
    name: String,
    rules: Vec<TextRule>,
    /// When set, files that do not contain this needle are skipped untouched.
    require: Option<String>,
}

impl TextPatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            require: None,
        }
    }

    pub fn rule(mut self, rule: TextRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn require(mut self, needle: impl Into<String>) -> Self {
        self.require = Some(needle.into());
        self
    }
}

impl FileTransform for TextPatch {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, _path: &Path, text: &str) -> Result<Transformed> {
        if let Some(ref needle) = self.require {
            if !text.contains(needle.as_str()) {
                return Ok(Transformed::Skipped(format!("{} not present", needle)));
            }
        }
        let patched = apply_rules(text, &self.rules);
        if patched == text {
            Ok(Transformed::Unchanged)
        } else {
            Ok(Transformed::Changed(patched))
        }
    }
}
