// ABOUTME: Index page maintenance for imported newsletter articles.
// ABOUTME: Prepends a dated list item under the Newsletter heading, creating the list when absent.

use std::fs;
use std::path::{Component, Path};

use chrono::NaiveDate;
use scraper::ElementRef;

use crate::dom::{element_text, escape_attr, escape_text, has_class, EditSet, HtmlDocument};
use crate::error::{PatchError, Result};

const LIST_CLASS: &str = "article-list";

/// One line of the article list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub date: NaiveDate,
    pub title: String,
    /// Root-relative link to the article page.
    pub href: String,
}

impl IndexEntry {
    pub fn render(&self) -> String {
        format!(
            "<li class=\"article-item\">[{}] <a href=\"{}\">{}</a></li>",
            self.date.format("%Y-%m-%d"),
            escape_attr(&self.href),
            escape_text(&self.title)
        )
    }
}

/// What happened to the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexUpdate {
    /// The entry was added; carries the new page text.
    Added(String),
    AlreadyListed,
    HeadingMissing,
    PageMissing,
}

fn is_section_heading(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h1" | "h2" | "h3")
}

/// Prepend `entry` to the `ul.article-list` following the `h3` whose text contains
/// `heading`.
///
/// The list is looked up among the heading's following siblings up to the next
/// section heading. When there is none, a new list is created after the first
/// `<p>` of the section, or directly after the heading.
pub fn prepend_entry(text: &str, heading: &str, entry: &IndexEntry) -> IndexUpdate {
    let doc = HtmlDocument::parse(text);
    let Some(title) = doc
        .select_all("h3")
        .into_iter()
        .find(|h| element_text(h).contains(heading))
    else {
        return IndexUpdate::HeadingMissing;
    };

    let section: Vec<ElementRef<'_>> = title
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !is_section_heading(el))
        .collect();

    let item = entry.render();
    let mut edits = EditSet::new();
    match section
        .iter()
        .find(|el| el.value().name() == "ul" && has_class(el, LIST_CLASS))
    {
        Some(list) => {
            let listed = list.descendants().filter_map(ElementRef::wrap).any(|a| {
                a.value().name() == "a" && a.value().attr("href") == Some(entry.href.as_str())
            });
            if listed {
                return IndexUpdate::AlreadyListed;
            }
            edits.prepend(list.id(), format!("\n  {}", item));
        }
        None => {
            let anchor = section
                .iter()
                .find(|el| el.value().name() == "p")
                .map(|p| p.id())
                .unwrap_or_else(|| title.id());
            edits.insert_after(
                anchor,
                format!("\n<ul class=\"{}\">\n  {}\n</ul>", LIST_CLASS, item),
            );
        }
    }
    IndexUpdate::Added(doc.serialize(&edits))
}

/// Apply [`prepend_entry`] to the page at `path`, writing unless `dry_run`.
pub fn update_index_page(
    path: &Path,
    heading: &str,
    entry: &IndexEntry,
    dry_run: bool,
) -> Result<IndexUpdate> {
    if !path.is_file() {
        return Ok(IndexUpdate::PageMissing);
    }
    let text = fs::read_to_string(path).map_err(|e| PatchError::io(path, "read index", e))?;
    let update = prepend_entry(&text, heading, entry);
    if let IndexUpdate::Added(new_text) = &update {
        if !dry_run {
            fs::write(path, new_text).map_err(|e| PatchError::io(path, "write index", e))?;
        }
    }
    Ok(update)
}

/// `/`-separated path of `file` relative to `root`.
pub fn root_relative_href(root: &Path, file: &Path) -> Result<String> {
    let rel = pathdiff::diff_paths(file, root).ok_or_else(|| {
        PatchError::parse(
            file,
            "compute index link",
            Some(anyhow::anyhow!("no relative path from {}", root.display())),
        )
    })?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(Ok(part.to_string_lossy().into_owned())),
            Component::CurDir => None,
            _ => Some(Err(())),
        })
        .collect::<std::result::Result<Vec<String>, ()>>()
        .map_err(|_| {
            PatchError::parse(
                file,
                "compute index link",
                Some(anyhow::anyhow!("{} is outside {}", file.display(), root.display())),
            )
        })?;
    Ok(parts.join("/"))
}
