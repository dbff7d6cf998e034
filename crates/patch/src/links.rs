// ABOUTME: Relative link fixer for article pages moved one directory deeper.
// ABOUTME: Rewrites href/src values from ../X to ../../X and applies literal path fixes.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::batch::{FileTransform, Transformed};
use crate::config::LiteralFix;
use crate::error::Result;
use crate::text::{apply_rules, TextRule};

static PARENT_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\s)(href|src)="\.\./([^"]*)""#).unwrap());

/// Deepen every `href="../X"` and `src="../X"` by one level.
///
/// Values that are already `../../…` are left untouched, so the rewrite is stable
/// under repeated runs.
pub fn deepen_parent_refs(text: &str) -> String {
    PARENT_REF_RE
        .replace_all(text, |caps: &Captures| {
            let rest = &caps[3];
            if rest.starts_with("../") {
                caps[0].to_string()
            } else {
                format!(r#"{}{}="../../{}""#, &caps[1], &caps[2], rest)
            }
        })
        .into_owned()
}

/// Batch transform for nested article pages.
#[derive(Debug, Clone)]
pub struct LinkFixer {
    fixes: Vec<TextRule>,
}

impl LinkFixer {
    pub fn new(fixes: &[LiteralFix]) -> Self {
        Self {
            fixes: fixes
                .iter()
                .map(|f| TextRule::literal(f.from.clone(), f.to.clone()))
                .collect(),
        }
    }

    pub fn fix(&self, text: &str) -> String {
        apply_rules(&deepen_parent_refs(text), &self.fixes)
    }
}

impl FileTransform for LinkFixer {
    fn name(&self) -> &str {
        "fix-links"
    }

    fn transform(&self, _path: &Path, text: &str) -> Result<Transformed> {
        let fixed = self.fix(text);
        if fixed == text {
            Ok(Transformed::Unchanged)
        } else {
            Ok(Transformed::Changed(fixed))
        }
    }
}
