// ABOUTME: Loads feed bytes from an http(s) URL, a local file, or stdin.
// ABOUTME: Uses a blocking reqwest client configured with the site's timeout and user agent.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use folio_patch::config::HttpSection;
use reqwest::blocking::Client;

use crate::error::FeedError;

/// Blocking HTTP client for feed downloads.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FeedError::fetch("<client>", e))?;
        Ok(Self { client })
    }

    pub fn from_config(http: &HttpSection) -> Result<Self, FeedError> {
        Self::new(http.timeout(), &http.user_agent)
    }

    /// GET `url` and return the body; non-2xx statuses are errors.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        tracing::debug!(url, "fetching feed");
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FeedError::fetch(url, e))?;
        let bytes = resp.bytes().map_err(|e| FeedError::fetch(url, e))?;
        Ok(bytes.to_vec())
    }

    /// Load feed bytes from `target`: `-` reads stdin, http(s) URLs are fetched,
    /// anything else is a file path.
    pub fn load(&self, target: &str) -> Result<Vec<u8>, FeedError> {
        if target == "-" {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|error| FeedError::Read {
                    source_name: "stdin".to_string(),
                    error,
                })?;
            return Ok(buf);
        }

        if is_http_url(target) {
            return self.fetch(target);
        }

        fs::read(Path::new(target)).map_err(|error| FeedError::Read {
            source_name: target.to_string(),
            error,
        })
    }
}

pub fn is_http_url(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}
