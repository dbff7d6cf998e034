// ABOUTME: Stylesheet link normalization for article and case-study pages.
// ABOUTME: Removes legacy style.css/article.css links and inserts the common and page-type sheets.

use std::path::Path;

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

use crate::batch::{FileTransform, Transformed};
use crate::dom::{escape_attr, EditSet, HtmlDocument};
use crate::error::Result;

/// Stylesheet file names that mark a link as legacy.
pub const LEGACY_STYLESHEETS: &[&str] = &["style.css", "article.css"];

static LEGACY_MATCHER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(LEGACY_STYLESHEETS).unwrap());

/// Returns true if `href` points at a legacy stylesheet.
pub fn is_legacy_href(href: &str) -> bool {
    LEGACY_MATCHER.is_match(href)
}

/// Which stylesheets a family of pages should link, and how deep those pages sit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetProfile {
    pub name: String,
    /// Path from the pages back to the site root, e.g. `../../`.
    pub prefix: String,
    /// Sheets to link, in order.
    pub sheets: Vec<String>,
    /// Elements removed alongside the legacy links.
    pub remove_selectors: Vec<String>,
}

impl StylesheetProfile {
    /// Nested writing articles: `writing/<section>/<page>.html`.
    pub fn articles() -> Self {
        Self {
            name: "css-articles".to_string(),
            prefix: "../../".to_string(),
            sheets: vec![
                "styles/common.css".to_string(),
                "styles/writing_articles.css".to_string(),
            ],
            remove_selectors: vec!["header > img.profile-pic".to_string()],
        }
    }

    /// Case-study pages directly under `case_studies/`.
    pub fn case_studies() -> Self {
        Self {
            name: "css-case-studies".to_string(),
            prefix: "../".to_string(),
            sheets: vec![
                "styles/common.css".to_string(),
                "styles/case_studies_articles.css".to_string(),
            ],
            remove_selectors: Vec::new(),
        }
    }

    fn hrefs(&self) -> Vec<String> {
        self.sheets
            .iter()
            .map(|s| format!("{}{}", self.prefix, s))
            .collect()
    }
}

/// Swap legacy stylesheet links for the profile's links.
///
/// The new links go after the last remaining `<link href>` in `<head>`, or at the
/// end of `<head>` when none remain. A link whose href is already present is not
/// added again. Returns `None` when nothing needed to change.
pub fn normalize_stylesheets(text: &str, profile: &StylesheetProfile) -> Option<String> {
    let doc = HtmlDocument::parse(text);
    let head = doc.select_first("head")?;
    let mut edits = EditSet::new();

    for selector in &profile.remove_selectors {
        for el in doc.select_all(selector) {
            edits.remove(el.id());
        }
    }

    let stylesheet_links = doc.select_all("head link[rel~=\"stylesheet\"]");
    let legacy: Vec<_> = stylesheet_links
        .iter()
        .filter(|el| el.value().attr("href").map(is_legacy_href).unwrap_or(false))
        .map(|el| el.id())
        .collect();

    if legacy.is_empty() && edits.is_empty() {
        return None;
    }

    if !legacy.is_empty() {
        for id in &legacy {
            edits.remove(*id);
        }

        let surviving: Vec<_> = doc
            .select_all("head link[href]")
            .into_iter()
            .filter(|el| !legacy.contains(&el.id()))
            .collect();

        let new_links: Vec<String> = profile
            .hrefs()
            .into_iter()
            .filter(|href| {
                !surviving
                    .iter()
                    .any(|el| el.value().attr("href") == Some(href.as_str()))
            })
            .map(|href| {
                format!(
                    "\n    <link href=\"{}\" rel=\"stylesheet\">",
                    escape_attr(&href)
                )
            })
            .collect();

        match surviving.last() {
            Some(last) => {
                for link in new_links {
                    edits.insert_after(last.id(), link);
                }
            }
            None => {
                for link in new_links {
                    edits.append(head.id(), link);
                }
                edits.append(head.id(), "\n");
            }
        }
    }

    Some(doc.serialize(&edits))
}

/// Batch transform applying one [`StylesheetProfile`].
#[derive(Debug, Clone)]
pub struct StylesheetNormalizer {
    profile: StylesheetProfile,
}

impl StylesheetNormalizer {
    pub fn new(profile: StylesheetProfile) -> Self {
        Self { profile }
    }
}

impl FileTransform for StylesheetNormalizer {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn transform(&self, _path: &Path, text: &str) -> Result<Transformed> {
        match normalize_stylesheets(text, &self.profile) {
            Some(updated) => Ok(Transformed::Changed(updated)),
            None => Ok(Transformed::Unchanged),
        }
    }
}
