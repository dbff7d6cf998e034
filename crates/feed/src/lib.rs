// ABOUTME: Newsletter feed library for folio.
// ABOUTME: Provides feed loading, parsing into native models, and the article import pipeline.

pub mod error;
pub mod fetch;
pub mod import;
pub mod models;
pub mod parser;

pub use error::{FeedError, ImportError};
pub use fetch::FeedClient;
pub use import::{ImportReport, ImportRequest, Importer, IndexStatus};
pub use models::{Feed, FeedEntry};
pub use parser::{find_entry, normalize_url, parse_feed_bytes};
