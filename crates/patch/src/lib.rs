// ABOUTME: Site maintenance library for folio: walking, batch patching, and DOM rewriting of HTML pages.
// ABOUTME: Provides analytics, link, header, and stylesheet transforms plus sanitizing and templating.

pub mod analytics;
pub mod batch;
pub mod config;
pub mod dom;
pub mod error;
pub mod header;
pub mod index;
pub mod links;
pub mod sanitize;
pub mod slug;
pub mod stylesheet;
pub mod tasks;
pub mod template;
pub mod text;
pub mod walk;

pub use analytics::{AddAnalytics, UpdateAnalytics};
pub use batch::{run_batch, BatchOptions, BatchReport, FileOutcome, FileTransform, Transformed};
pub use config::{MenuItem, SiteConfig, SiteConfigBuilder, CONFIG_FILE_NAME};
pub use error::{ErrorCode, PatchError, Result};
pub use header::HeaderSync;
pub use index::{update_index_page, IndexEntry, IndexUpdate};
pub use links::LinkFixer;
pub use sanitize::{sanitize_html, sanitize_newsletter_html, SanitizePolicy, NEWSLETTER_POLICY};
pub use slug::{article_file_name, slugify};
pub use stylesheet::{StylesheetNormalizer, StylesheetProfile};
pub use tasks::{run_task, Task};
pub use template::{Placeholder, Template};
pub use walk::FileWalker;
