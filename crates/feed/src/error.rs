// ABOUTME: Error types for feed fetching, parsing, and newsletter imports.
// ABOUTME: FeedError covers getting a usable feed; ImportError covers turning one entry into a page.

use std::fmt;

use folio_patch::PatchError;
use thiserror::Error;

/// Errors that can occur while fetching or parsing a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Failed to parse the feed data (malformed XML/JSON).
    #[error("failed to parse feed: {0}")]
    Parse(String),

    /// The feed contains no items.
    #[error("feed is empty: no items found")]
    Empty,

    /// The feed could not be downloaded.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// A local feed file or stdin could not be read.
    #[error("failed to read {source_name}: {error}")]
    Read {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
}

impl FeedError {
    /// Creates a Parse error from an underlying feed-rs error.
    pub fn parse(err: impl fmt::Display) -> Self {
        FeedError::Parse(err.to_string())
    }

    pub fn fetch(url: impl Into<String>, err: impl fmt::Display) -> Self {
        FeedError::Fetch {
            url: url.into(),
            message: err.to_string(),
        }
    }
}

/// Reasons a newsletter import stops without producing a page.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// No entry in the feed links to the requested post.
    #[error("post not found in feed: {url}")]
    NotFound { url: String },

    /// The entry has neither a published nor an updated date.
    #[error("entry {url} has no publish date")]
    MissingDate { url: String },

    /// The entry has neither content nor a summary.
    #[error("entry {url} has no content")]
    MissingContent { url: String },

    /// The requested post URL is not an absolute http(s) URL.
    #[error("invalid post url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl ImportError {
    /// Returns true when the feed was read but the post is not in it.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImportError::NotFound { .. })
    }
}
