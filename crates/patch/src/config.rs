// ABOUTME: Site configuration for folio including paths, analytics IDs, menu, and HTTP settings.
// ABOUTME: Loads optional folio.toml files and provides a fluent builder for CLI overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};

/// Default configuration file name looked up at the site root.
pub const CONFIG_FILE_NAME: &str = "folio.toml";

/// A single navigation entry rendered into the shared header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    pub href: String,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Root-level settings shared by every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Directories (relative to the root) never visited by batch operations.
    pub exclude_dirs: Vec<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            exclude_dirs: vec![".git".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSection {
    /// Measurement ID written by `analytics update` and `analytics add`.
    pub measurement_id: String,
}

impl Default for AnalyticsSection {
    fn default() -> Self {
        Self {
            measurement_id: "G-VE38R5Y66Q".to_string(),
        }
    }
}

/// A literal substitution applied after the relative-link rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralFix {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksSection {
    /// Directory whose nested article pages get their relative links deepened.
    pub dir: String,
    pub fixes: Vec<LiteralFix>,
}

impl Default for LinksSection {
    fn default() -> Self {
        Self {
            dir: "writing".to_string(),
            fixes: vec![
                LiteralFix {
                    from: r#"src="../../profile.png""#.to_string(),
                    to: r#"src="../../assets/profile.png""#.to_string(),
                },
                LiteralFix {
                    from: r#"href="../article.css""#.to_string(),
                    to: r#"href="../../article.css""#.to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSection {
    pub site_title: String,
    pub menu: Vec<MenuItem>,
    /// Directories skipped by `sync-headers` only, on top of `[site]` exclusions.
    pub exclude_dirs: Vec<String>,
}

impl Default for HeaderSection {
    fn default() -> Self {
        Self {
            site_title: "Harry Hunter".to_string(),
            menu: default_menu(),
            exclude_dirs: vec!["utility".to_string()],
        }
    }
}

/// The fixed navigation menu in display order.
pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("Home", "index.html"),
        MenuItem::new("Consulting", "consulting.html"),
        MenuItem::new("CV", "cv.html"),
        MenuItem::new("Case Studies", "case_studies.html"),
        MenuItem::new("Writing", "writing.html"),
        MenuItem::new("Books", "books.html"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesheetSection {
    pub articles_dir: String,
    pub case_studies_dir: String,
    /// Case-study landing pages that keep their own stylesheet.
    pub case_study_excludes: Vec<String>,
}

impl Default for StylesheetSection {
    fn default() -> Self {
        Self {
            articles_dir: "writing".to_string(),
            case_studies_dir: "case_studies".to_string(),
            case_study_excludes: vec!["thekey.html".to_string(), "atkinsrealis.html".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterSection {
    pub site_url: String,
    pub template: String,
    pub output_dir: String,
    pub index_page: String,
    pub heading: String,
}

impl Default for NewsletterSection {
    fn default() -> Self {
        Self {
            site_url: "https://harryhunter.substack.com".to_string(),
            template: "writing/_substack_template.html".to_string(),
            output_dir: "writing/substack".to_string(),
            index_page: "writing.html".to_string(),
            heading: "Newsletter".to_string(),
        }
    }
}

impl NewsletterSection {
    /// The syndication feed URL for the newsletter site.
    pub fn feed_url(&self) -> String {
        format!("{}/feed", self.site_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Full configuration for one site tree.
///
/// Every relative path is resolved against `root`. The `root` itself is never
/// read from the file; it comes from the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    #[serde(skip)]
    pub root: PathBuf,
    pub site: SiteSection,
    pub analytics: AnalyticsSection,
    pub links: LinksSection,
    pub header: HeaderSection,
    pub stylesheets: StylesheetSection,
    pub newsletter: NewsletterSection,
    pub http: HttpSection,
}

impl SiteConfig {
    /// Create a default configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(root: impl Into<PathBuf>, text: &str, origin: &Path) -> Result<Self> {
        let mut config: SiteConfig = toml::from_str(text)
            .map_err(|e| PatchError::config(origin, "parse config", Some(e.into())))?;
        config.root = root.into();
        Ok(config)
    }

    /// Load configuration for `root`.
    ///
    /// With an explicit `path` the file must exist. Otherwise `<root>/folio.toml`
    /// is used when present and defaults apply when it is not.
    pub fn load(root: impl Into<PathBuf>, path: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let candidate = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = root.join(CONFIG_FILE_NAME);
                if !default.is_file() {
                    tracing::debug!(root = %root.display(), "no folio.toml, using defaults");
                    return Ok(Self::new(root));
                }
                default
            }
        };
        let text =
            fs::read_to_string(&candidate).map_err(|e| PatchError::io(&candidate, "read config", e))?;
        tracing::debug!(path = %candidate.display(), "loaded config");
        Self::from_toml(root, &text, &candidate)
    }

    /// Start a builder seeded with defaults for `root`.
    pub fn builder(root: impl Into<PathBuf>) -> SiteConfigBuilder {
        SiteConfigBuilder::from_config(Self::new(root))
    }

    /// Resolve a root-relative path from the configuration.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn excluded_dirs(&self) -> Vec<PathBuf> {
        self.site.exclude_dirs.iter().map(|d| self.resolve(d)).collect()
    }

    /// Site exclusions plus the directories the shared header never reaches.
    pub fn header_excluded_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.excluded_dirs();
        dirs.extend(self.header.exclude_dirs.iter().map(|d| self.resolve(d)));
        dirs
    }
}

/// Builder for applying command-line overrides on top of a loaded configuration.
#[derive(Debug, Clone)]
pub struct SiteConfigBuilder {
    config: SiteConfig,
}

impl SiteConfigBuilder {
    pub fn from_config(config: SiteConfig) -> Self {
        Self { config }
    }

    /// Set the analytics measurement ID.
    pub fn measurement_id(mut self, id: impl Into<String>) -> Self {
        self.config.analytics.measurement_id = id.into();
        self
    }

    /// Set the directory processed by the link fixer.
    pub fn links_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.links.dir = dir.into();
        self
    }

    /// Set the newsletter site URL (the feed lives at `<site_url>/feed`).
    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.config.newsletter.site_url = url.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout_secs = timeout.as_secs();
        self
    }

    pub fn build(self) -> SiteConfig {
        self.config
    }
}
