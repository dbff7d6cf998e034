// ABOUTME: Newsletter import pipeline from feed entry to static article page.
// ABOUTME: Finds the post, sanitizes its body, renders the template, writes the page, and lists it on the index.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use folio_patch::dom::{escape_attr, escape_text};
use folio_patch::index::{root_relative_href, update_index_page, IndexEntry, IndexUpdate};
use folio_patch::{article_file_name, sanitize_newsletter_html, PatchError, Placeholder, SiteConfig, Template};
use serde::Serialize;
use url::Url;

use crate::error::{FeedError, ImportError};
use crate::fetch::FeedClient;
use crate::parser::{find_entry, parse_feed_bytes};

/// What the import did to the index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Added,
    AlreadyListed,
    HeadingMissing,
    PageMissing,
}

impl From<&IndexUpdate> for IndexStatus {
    fn from(update: &IndexUpdate) -> Self {
        match update {
            IndexUpdate::Added(_) => IndexStatus::Added,
            IndexUpdate::AlreadyListed => IndexStatus::AlreadyListed,
            IndexUpdate::HeadingMissing => IndexStatus::HeadingMissing,
            IndexUpdate::PageMissing => IndexStatus::PageMissing,
        }
    }
}

/// Summary of one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub title: String,
    pub source_url: String,
    pub published: NaiveDate,
    pub output_path: PathBuf,
    /// Root-relative link written to the index page.
    pub index_href: String,
    pub index: IndexStatus,
    pub dry_run: bool,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "would write" } else { "wrote" };
        format!(
            "import: {} {} ({}), index {}",
            verb,
            self.output_path.display(),
            self.title,
            match self.index {
                IndexStatus::Added => "updated",
                IndexStatus::AlreadyListed => "already lists it",
                IndexStatus::HeadingMissing => "has no newsletter heading",
                IndexStatus::PageMissing => "page not found",
            }
        )
    }
}

/// One import request.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub post_url: String,
    /// Feed URL, file path, or `-`; defaults to the newsletter's feed URL.
    pub feed: Option<String>,
    pub dry_run: bool,
}

/// Imports newsletter posts into the site described by a [`SiteConfig`].
#[derive(Debug, Clone)]
pub struct Importer<'a> {
    config: &'a SiteConfig,
    client: FeedClient,
}

impl<'a> Importer<'a> {
    pub fn new(config: &'a SiteConfig) -> Result<Self, ImportError> {
        Ok(Self {
            config,
            client: FeedClient::from_config(&config.http)?,
        })
    }

    pub fn run(&self, request: &ImportRequest) -> Result<ImportReport, ImportError> {
        validate_post_url(&request.post_url)?;
        let newsletter = &self.config.newsletter;

        let template = Template::load(self.config.resolve(&newsletter.template))?;
        for missing in template.missing_placeholders() {
            tracing::warn!(placeholder = %missing, template = %template.path().display(), "template lacks placeholder");
        }

        let source = request
            .feed
            .clone()
            .unwrap_or_else(|| newsletter.feed_url());
        let bytes = self.client.load(&source)?;
        // An empty feed cannot hold the post.
        let feed = match parse_feed_bytes(&bytes, &source) {
            Err(FeedError::Empty) => {
                return Err(ImportError::NotFound {
                    url: request.post_url.clone(),
                })
            }
            other => other?,
        };
        tracing::debug!(feed = %source, entries = feed.entries.len(), "parsed feed");

        let entry = find_entry(&feed, &request.post_url).ok_or_else(|| ImportError::NotFound {
            url: request.post_url.clone(),
        })?;
        let published = entry
            .publish_date()
            .ok_or_else(|| ImportError::MissingDate {
                url: entry.url.clone(),
            })?
            .date_naive();
        let body = entry.body_html().ok_or_else(|| ImportError::MissingContent {
            url: entry.url.clone(),
        })?;

        let title = escape_text(&entry.title);
        let source_url = escape_attr(&entry.url);
        let date = published.format("%B %d, %Y").to_string();
        let sanitized = sanitize_newsletter_html(body);
        let page = template.render(&[
            (Placeholder::ArticleTitle, title.as_str()),
            (Placeholder::SourceUrl, source_url.as_str()),
            (Placeholder::PublishDate, date.as_str()),
            (Placeholder::ArticleBody, sanitized.as_str()),
        ]);

        let output_dir = self.config.resolve(&newsletter.output_dir);
        let output_path = output_dir.join(article_file_name(published, &entry.title));
        if request.dry_run {
            tracing::info!(path = %output_path.display(), "would write article");
        } else {
            fs::create_dir_all(&output_dir)
                .map_err(|e| PatchError::io(&output_dir, "create output directory", e))?;
            fs::write(&output_path, page)
                .map_err(|e| PatchError::io(&output_path, "write article", e))?;
            tracing::info!(path = %output_path.display(), "wrote article");
        }

        let index_href = root_relative_href(&self.config.root, &output_path)?;
        let index_path = self.config.resolve(&newsletter.index_page);
        let index_entry = IndexEntry {
            date: published,
            title: entry.title.clone(),
            href: index_href.clone(),
        };
        let update = update_index_page(&index_path, &newsletter.heading, &index_entry, request.dry_run)?;
        match &update {
            IndexUpdate::Added(_) => {
                tracing::info!(path = %index_path.display(), href = %index_href, "listed article on index page")
            }
            IndexUpdate::AlreadyListed => {
                tracing::warn!(path = %index_path.display(), href = %index_href, "index page already lists article")
            }
            IndexUpdate::HeadingMissing => {
                tracing::warn!(path = %index_path.display(), heading = %newsletter.heading, "index page has no newsletter heading")
            }
            IndexUpdate::PageMissing => {
                tracing::warn!(path = %index_path.display(), "index page not found")
            }
        }

        Ok(ImportReport {
            title: entry.title.clone(),
            source_url: entry.url.clone(),
            published,
            output_path,
            index_href,
            index: IndexStatus::from(&update),
            dry_run: request.dry_run,
        })
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_post_url(raw: &str) -> Result<Url, ImportError> {
    let url = Url::parse(raw).map_err(|e| ImportError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ImportError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme {}", other),
        }),
    }
}
