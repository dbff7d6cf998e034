// ABOUTME: Feed parsing implementation using feed-rs.
// ABOUTME: Maps feed-rs types to native models and matches entries against post URLs.

use feed_rs::model::{Entry, Link};
use url::Url;

use crate::error::FeedError;
use crate::models::{Feed, FeedEntry};

/// Parses feed bytes (RSS, Atom, or JSON Feed) into a [`Feed`].
///
/// `feed_url` is stored as-is. A feed without entries is an [`FeedError::Empty`].
pub fn parse_feed_bytes(data: &[u8], feed_url: &str) -> Result<Feed, FeedError> {
    let parsed = feed_rs::parser::parse(data).map_err(FeedError::parse)?;
    if parsed.entries.is_empty() {
        return Err(FeedError::Empty);
    }

    Ok(Feed {
        title: parsed.title.map(|t| t.content).unwrap_or_default(),
        home_url: extract_home_url(&parsed.links),
        feed_url: feed_url.to_string(),
        entries: parsed.entries.iter().map(map_entry).collect(),
    })
}

fn is_enclosure_link(link: &Link) -> bool {
    link.rel.as_deref() == Some("enclosure")
}

/// Prefers link with rel="alternate", otherwise uses first link href.
fn extract_home_url(links: &[Link]) -> String {
    links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

/// Prefers link with rel="alternate", otherwise first non-enclosure link, then entry.id.
fn extract_item_url(entry: &Entry) -> String {
    if let Some(link) = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
    {
        return link.href.clone();
    }
    if let Some(link) = entry.links.iter().find(|l| !is_enclosure_link(l)) {
        return link.href.clone();
    }
    entry.id.clone()
}

fn map_entry(entry: &Entry) -> FeedEntry {
    let content_html = entry.content.as_ref().and_then(|c| {
        c.body
            .clone()
            .or_else(|| c.src.as_ref().map(|l| l.href.clone()))
    });

    FeedEntry {
        title: entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default(),
        url: extract_item_url(entry),
        id: entry.id.clone(),
        links: entry
            .links
            .iter()
            .filter(|l| !is_enclosure_link(l))
            .map(|l| l.href.clone())
            .collect(),
        published: entry.published,
        updated: entry.updated,
        content_html,
        summary_html: entry.summary.as_ref().map(|t| t.content.clone()),
    }
}

/// Normalizes a URL for comparison: lowercase scheme and host, no fragment, no
/// trailing slash on the path. Returns `None` for strings that are not absolute URLs.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);
    let trimmed = url.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&trimmed);
    }
    Some(url.to_string())
}

fn same_url(a: &str, b: &str) -> bool {
    match (normalize_url(a), normalize_url(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim() == b.trim(),
    }
}

/// First entry whose canonical link, any other link, or id matches `post_url`.
pub fn find_entry<'a>(feed: &'a Feed, post_url: &str) -> Option<&'a FeedEntry> {
    feed.entries.iter().find(|entry| {
        same_url(&entry.url, post_url)
            || entry.links.iter().any(|l| same_url(l, post_url))
            || same_url(&entry.id, post_url)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_host_case_fragment_and_trailing_slash() {
        assert_eq!(
            normalize_url("https://Example.SUBSTACK.com/p/hello/#footnote-1").as_deref(),
            Some("https://example.substack.com/p/hello")
        );
        assert_eq!(
            normalize_url("https://example.com").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(normalize_url("not a url"), None);
    }

    #[test]
    fn same_url_ignores_cosmetic_differences() {
        assert!(same_url(
            "https://x.substack.com/p/post",
            "https://X.substack.com/p/post/"
        ));
        assert!(!same_url(
            "https://x.substack.com/p/post",
            "https://x.substack.com/p/other"
        ));
    }
}
