// ABOUTME: Google Analytics / Tag Manager tag maintenance for static HTML pages.
// ABOUTME: Collapses duplicate gtag config lines, inserts the snippet, and swaps placeholder IDs.

use std::ops::Range;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::batch::{FileTransform, Transformed};
use crate::error::{PatchError, Result};
use crate::text::{TextPatch, TextRule};

/// Matches one `gtag('config', 'G-…');` or `gtag('config', 'GTM-…');` statement.
static CONFIG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"gtag\('config', 'G(?:TM)?-[A-Z0-9]+'\);").unwrap());

/// Matches the ID in the gtag.js loader URL.
static LOADER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(gtag/js\?id=)G(?:TM)?-[A-Z0-9]+").unwrap());

static ID_SHAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^G(?:TM)?-[A-Z0-9]+$").unwrap());

const JS_INIT: &str = "gtag('js', new Date());";

/// Returns true if `id` looks like a GA4 (`G-`) or Tag Manager (`GTM-`) ID.
pub fn is_valid_id(id: &str) -> bool {
    ID_SHAPE_RE.is_match(id)
}

/// Reject IDs that do not have the measurement ID shape.
pub fn validate_id(id: &str) -> Result<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(PatchError::config(
            "",
            "validate measurement id",
            Some(anyhow::anyhow!("{:?} is not a G-/GTM- identifier", id)),
        ))
    }
}

/// Returns true if `id` is already wired into the page.
///
/// The ID must appear as a whole token inside a `gtag('config', …)` call or the
/// loader URL; a mention in a comment or a longer ID sharing the prefix does not count.
pub fn is_present(text: &str, id: &str) -> bool {
    let pattern = format!(
        r#"(?:gtag/js\?id=|gtag\(\s*'config'\s*,\s*['"]){}(?:[^A-Za-z0-9_-]|$)"#,
        regex::escape(id)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

/// Number of gtag config statements in `text`.
pub fn count_configs(text: &str) -> usize {
    CONFIG_RE.find_iter(text).count()
}

/// Rewrite the page so exactly one config statement remains and it uses `id`.
///
/// The first statement is rewritten in place and later ones are removed along
/// with the blank line they leave. The loader URL is pointed at `id` as well.
pub fn update_config(text: &str, id: &str) -> String {
    let matches: Vec<Range<usize>> = CONFIG_RE.find_iter(text).map(|m| m.range()).collect();
    let statement = format!("gtag('config', '{}');", id);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (idx, range) in matches.iter().enumerate() {
        if idx == 0 {
            out.push_str(&text[cursor..range.start]);
            out.push_str(&statement);
            cursor = range.end;
        } else {
            let removal = line_aware_range(text, range.clone());
            out.push_str(&text[cursor..removal.start]);
            cursor = removal.end;
        }
    }
    out.push_str(&text[cursor..]);

    LOADER_ID_RE
        .replace_all(&out, format!("${{1}}{}", id).as_str())
        .into_owned()
}

/// Widen `range` to its whole line when nothing else lives on that line.
fn line_aware_range(text: &str, range: Range<usize>) -> Range<usize> {
    let line_start = text[..range.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[range.end..]
        .find('\n')
        .map(|i| range.end + i + 1)
        .unwrap_or(text.len());

    let before_blank = text[line_start..range.start].trim().is_empty();
    let after_blank = text[range.end..line_end].trim().is_empty();
    if before_blank && after_blank {
        line_start..line_end
    } else {
        range
    }
}

/// The full gtag.js snippet inserted before `</head>`.
pub fn snippet(id: &str) -> String {
    format!(
        r#"    <!-- Google tag (gtag.js) -->
    <script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
    <script>
      window.dataLayer = window.dataLayer || [];
      function gtag(){{dataLayer.push(arguments);}}
      {JS_INIT}

      gtag('config', '{id}');
    </script>
"#
    )
}

/// Insert the snippet before the first `</head>`.
///
/// A page that already carries a tag for another ID has that tag repointed
/// instead, so it still ends with a single config statement. Returns `None` when
/// the ID is already present or there is no tag and no `</head>`.
pub fn insert_snippet(text: &str, id: &str) -> Option<String> {
    if is_present(text, id) {
        return None;
    }
    if count_configs(text) > 0 {
        return Some(update_config(text, id));
    }
    let pos = text.find("</head>")?;
    let mut out = String::with_capacity(text.len() + 400);
    out.push_str(&text[..pos]);
    out.push_str(&snippet(id));
    out.push('\n');
    out.push_str(&text[pos..]);
    Some(out)
}

/// Batch transform that normalizes existing config statements to one ID.
#[derive(Debug, Clone)]
pub struct UpdateAnalytics {
    id: String,
}

impl UpdateAnalytics {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self { id })
    }
}

impl FileTransform for UpdateAnalytics {
    fn name(&self) -> &str {
        "analytics-update"
    }

    fn transform(&self, _path: &Path, text: &str) -> Result<Transformed> {
        let updated = update_config(text, &self.id);
        if updated == text {
            Ok(Transformed::Unchanged)
        } else {
            Ok(Transformed::Changed(updated))
        }
    }
}

/// Batch transform that adds the snippet to pages missing the ID.
#[derive(Debug, Clone)]
pub struct AddAnalytics {
    id: String,
}

impl AddAnalytics {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self { id })
    }
}

impl FileTransform for AddAnalytics {
    fn name(&self) -> &str {
        "analytics-add"
    }

    fn transform(&self, _path: &Path, text: &str) -> Result<Transformed> {
        if is_present(text, &self.id) {
            return Ok(Transformed::Skipped("tag already present".to_string()));
        }
        match insert_snippet(text, &self.id) {
            Some(updated) => Ok(Transformed::Changed(updated)),
            None => Ok(Transformed::Skipped("no </head> tag".to_string())),
        }
    }
}

/// Literal swap of an old or placeholder ID for a new one.
pub fn replace_id_patch(old_id: &str, new_id: &str) -> TextPatch {
    TextPatch::new("analytics-replace")
        .require(old_id)
        .rule(TextRule::literal(old_id, new_id))
}
