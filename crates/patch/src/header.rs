// ABOUTME: Shared site header synchronization across every page of the portfolio.
// ABOUTME: Builds the header with depth-correct relative links and swaps it in for a placeholder or old header.

use std::path::{Component, Path, PathBuf};

use crate::batch::{FileTransform, Transformed};
use crate::config::{HeaderSection, MenuItem};
use crate::dom::{escape_attr, escape_text, EditSet, HtmlDocument};
use crate::error::{PatchError, Result};

const PLACEHOLDER_SELECTOR: &str = "div#header-placeholder";

/// Prefix that leads from `file`'s directory back to `root`, always `/`-separated.
///
/// Files directly under the root get an empty prefix; one level down gets `../`.
pub fn relative_prefix(root: &Path, file: &Path) -> Result<String> {
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    let rel = pathdiff::diff_paths(root, dir).ok_or_else(|| {
        PatchError::parse(
            file,
            "compute relative path",
            Some(anyhow::anyhow!("no relative path to {}", root.display())),
        )
    })?;

    let mut prefix = String::new();
    for component in rel.components() {
        match component {
            Component::ParentDir => prefix.push_str("../"),
            Component::Normal(part) => {
                prefix.push_str(&part.to_string_lossy());
                prefix.push('/');
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(PatchError::parse(
                    file,
                    "compute relative path",
                    Some(anyhow::anyhow!("{} is not under a common root", file.display())),
                ))
            }
        }
    }
    Ok(prefix)
}

/// Render the standard header with every link prefixed by `prefix`.
pub fn render_header(site_title: &str, menu: &[MenuItem], prefix: &str) -> String {
    let mut html = String::from("<header>\n");
    html.push_str(&format!(
        "  <h1><a href=\"{}\">{}</a></h1>\n",
        escape_attr(&format!("{}index.html", prefix)),
        escape_text(site_title)
    ));
    html.push_str("  <nav>\n    <ul>\n");
    for item in menu {
        html.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            escape_attr(&format!("{}{}", prefix, item.href)),
            escape_text(&item.label)
        ));
    }
    html.push_str("    </ul>\n  </nav>\n</header>");
    html
}

/// Replace the header placeholder (or the existing site header) in `text`.
///
/// Returns `None` when the page has neither. Any further `body > header`
/// elements are dropped so the page ends with exactly one site header.
pub fn sync_header(text: &str, header_html: &str) -> Option<String> {
    let doc = HtmlDocument::parse(text);
    let target = doc
        .select_first(PLACEHOLDER_SELECTOR)
        .or_else(|| doc.select_first("header"))?;

    let mut edits = EditSet::new();
    edits.replace(target.id(), header_html);
    for extra in doc.select_all("body > header") {
        if extra.id() != target.id() {
            edits.remove(extra.id());
        }
    }
    Some(doc.serialize(&edits))
}

/// Batch transform that keeps every page's header in sync.
#[derive(Debug, Clone)]
pub struct HeaderSync {
    root: PathBuf,
    site_title: String,
    menu: Vec<MenuItem>,
}

impl HeaderSync {
    pub fn new(root: impl Into<PathBuf>, section: &HeaderSection) -> Self {
        Self {
            root: root.into(),
            site_title: section.site_title.clone(),
            menu: section.menu.clone(),
        }
    }
}

impl FileTransform for HeaderSync {
    fn name(&self) -> &str {
        "sync-headers"
    }

    fn transform(&self, path: &Path, text: &str) -> Result<Transformed> {
        let prefix = relative_prefix(&self.root, path)?;
        let header = render_header(&self.site_title, &self.menu, &prefix);
        match sync_header(text, &header) {
            Some(updated) => Ok(Transformed::Changed(updated)),
            None => Ok(Transformed::Skipped("no header or placeholder".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_menu;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefix_by_depth() {
        let root = Path::new("/site");
        assert_eq!(relative_prefix(root, Path::new("/site/index.html")).unwrap(), "");
        assert_eq!(
            relative_prefix(root, Path::new("/site/writing/a.html")).unwrap(),
            "../"
        );
        assert_eq!(
            relative_prefix(root, Path::new("/site/writing/substack/a.html")).unwrap(),
            "../../"
        );
    }

    #[test]
    fn header_lists_menu_in_order() {
        let html = render_header("Harry Hunter", &default_menu(), "../");
        assert!(html.starts_with("<header>\n  <h1><a href=\"../index.html\">Harry Hunter</a></h1>"));
        let labels: Vec<usize> = ["Home", "Consulting", "CV", "Case Studies", "Writing", "Books"]
            .iter()
            .map(|l| html.find(&format!(">{}</a></li>", l)).unwrap())
            .collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
        assert!(html.contains("<a href=\"../case_studies.html\">Case Studies</a>"));
    }

    #[test]
    fn placeholder_wins_over_existing_header() {
        let page = r#"<html><head></head><body><header>old</header><div id="header-placeholder"></div><main>x</main></body></html>"#;
        let out = sync_header(page, "<header>new</header>").unwrap();
        assert_eq!(
            out,
            "<html><head></head><body><header>new</header><main>x</main></body></html>"
        );
    }

    #[test]
    fn pages_without_target_are_skipped() {
        let sync = HeaderSync::new("/site", &HeaderSection::default());
        let result = sync
            .transform(Path::new("/site/a.html"), "<html><body><p>x</p></body></html>")
            .unwrap();
        assert_eq!(result, Transformed::Skipped("no header or placeholder".to_string()));
    }
}
