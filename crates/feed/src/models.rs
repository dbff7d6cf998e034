// ABOUTME: Native models for parsed newsletter feeds.
// ABOUTME: Keeps the raw entry HTML and both dates so import policy can choose between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry of a feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    /// Canonical link of the post.
    pub url: String,
    pub id: String,
    /// Every non-enclosure link the entry carries.
    pub links: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    /// First content block, raw HTML.
    pub content_html: Option<String>,
    pub summary_html: Option<String>,
}

impl FeedEntry {
    /// Published timestamp, falling back to the updated timestamp.
    pub fn publish_date(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.updated)
    }

    /// Content block, falling back to the summary. Blank blocks count as absent.
    pub fn body_html(&self) -> Option<&str> {
        self.content_html
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.summary_html.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// A parsed feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub home_url: String,
    /// Where the feed was read from.
    pub feed_url: String,
    pub entries: Vec<FeedEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_and_body_fallbacks() {
        let updated = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let entry = FeedEntry {
            updated: Some(updated),
            content_html: Some("   ".to_string()),
            summary_html: Some("<p>short</p>".to_string()),
            ..Default::default()
        };
        assert_eq!(entry.publish_date(), Some(updated));
        assert_eq!(entry.body_html(), Some("<p>short</p>"));
        assert_eq!(FeedEntry::default().body_html(), None);
        assert_eq!(FeedEntry::default().publish_date(), None);
    }
}
