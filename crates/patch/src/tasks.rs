// ABOUTME: Maps each site maintenance operation to its file walker and transform.
// ABOUTME: The single entry point the command line uses to run a batch against a SiteConfig.

use std::fmt;

use crate::analytics::{replace_id_patch, validate_id, AddAnalytics, UpdateAnalytics};
use crate::batch::{run_batch, BatchOptions, BatchReport, FileTransform};
use crate::config::SiteConfig;
use crate::error::{PatchError, Result};
use crate::header::HeaderSync;
use crate::links::LinkFixer;
use crate::stylesheet::{StylesheetNormalizer, StylesheetProfile};
use crate::walk::FileWalker;

/// A batch operation over the site tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    AnalyticsUpdate,
    AnalyticsAdd,
    AnalyticsReplace { from: String, to: String },
    FixLinks,
    SyncHeaders,
    CssArticles,
    CssCaseStudies,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::AnalyticsUpdate => "analytics-update",
            Task::AnalyticsAdd => "analytics-add",
            Task::AnalyticsReplace { .. } => "analytics-replace",
            Task::FixLinks => "fix-links",
            Task::SyncHeaders => "sync-headers",
            Task::CssArticles => "css-articles",
            Task::CssCaseStudies => "css-case-studies",
        };
        f.write_str(name)
    }
}

impl Task {
    /// Walker over the files this task touches.
    pub fn walker(&self, config: &SiteConfig) -> FileWalker {
        let excluded = config.excluded_dirs();
        match self {
            Task::AnalyticsUpdate
            | Task::AnalyticsAdd
            | Task::AnalyticsReplace { .. } => FileWalker::new(&config.root).exclude_dirs(excluded),
            Task::SyncHeaders => {
                FileWalker::new(&config.root).exclude_dirs(config.header_excluded_dirs())
            }
            // Only pages nested below the links directory.
            Task::FixLinks => FileWalker::new(config.resolve(&config.links.dir))
                .exclude_dirs(excluded)
                .min_depth(2),
            Task::CssArticles => {
                FileWalker::new(config.resolve(&config.stylesheets.articles_dir))
                    .exclude_dirs(excluded)
            }
            Task::CssCaseStudies => {
                FileWalker::new(config.resolve(&config.stylesheets.case_studies_dir))
                    .exclude_dirs(excluded)
                    .max_depth(1)
                    .exclude_files(config.stylesheets.case_study_excludes.iter().cloned())
            }
        }
    }

    /// The transform applied to each walked file.
    pub fn transform(&self, config: &SiteConfig) -> Result<Box<dyn FileTransform>> {
        let transform: Box<dyn FileTransform> = match self {
            Task::AnalyticsUpdate => {
                Box::new(UpdateAnalytics::new(&config.analytics.measurement_id)?)
            }
            Task::AnalyticsAdd => Box::new(AddAnalytics::new(&config.analytics.measurement_id)?),
            Task::AnalyticsReplace { from, to } => {
                if from.is_empty() {
                    return Err(PatchError::config(
                        &config.root,
                        "analytics replace",
                        Some(anyhow::anyhow!("the ID to replace is empty")),
                    ));
                }
                validate_id(to)?;
                Box::new(replace_id_patch(from, to))
            }
            Task::FixLinks => Box::new(LinkFixer::new(&config.links.fixes)),
            Task::SyncHeaders => Box::new(HeaderSync::new(&config.root, &config.header)),
            Task::CssArticles => {
                Box::new(StylesheetNormalizer::new(StylesheetProfile::articles()))
            }
            Task::CssCaseStudies => {
                Box::new(StylesheetNormalizer::new(StylesheetProfile::case_studies()))
            }
        };
        Ok(transform)
    }
}

/// Run `task` over the site described by `config`.
///
/// Fails up front when the task's directory does not exist or its settings are
/// invalid; per-file problems are recorded in the report instead.
pub fn run_task(config: &SiteConfig, task: &Task, opts: BatchOptions) -> Result<BatchReport> {
    let walker = task.walker(config);
    if !walker.root().is_dir() {
        return Err(PatchError::missing(
            walker.root(),
            task.to_string(),
            "directory not found",
        ));
    }
    let transform = task.transform(config)?;
    tracing::debug!(task = %task, root = %walker.root().display(), dry_run = opts.dry_run, "running task");
    Ok(run_batch(transform.as_ref(), &walker, opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(dir.path());
        let err = run_task(&config, &Task::CssCaseStudies, BatchOptions::default()).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn invalid_measurement_id_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::builder(dir.path()).measurement_id("UA-1234").build();
        let err = run_task(&config, &Task::AnalyticsAdd, BatchOptions::default()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn case_study_walker_skips_excludes_and_nested_pages() {
        let dir = tempfile::tempdir().unwrap();
        let cs = dir.path().join("case_studies");
        fs::create_dir_all(cs.join("nested")).unwrap();
        for name in ["a.html", "thekey.html", "atkinsrealis.html", "nested/b.html"] {
            fs::write(cs.join(name), "<html></html>").unwrap();
        }
        let config = SiteConfig::new(dir.path());
        let files: Vec<_> = Task::CssCaseStudies.walker(&config).walk().collect();
        assert_eq!(files, vec![cs.join("a.html")]);
    }

    #[test]
    fn link_walker_only_sees_nested_articles() {
        let dir = tempfile::tempdir().unwrap();
        let writing = dir.path().join("writing");
        fs::create_dir_all(writing.join("essays")).unwrap();
        fs::write(writing.join("top.html"), "").unwrap();
        fs::write(writing.join("essays/a.html"), "").unwrap();
        let config = SiteConfig::new(dir.path());
        let files: Vec<_> = Task::FixLinks.walker(&config).walk().collect();
        assert_eq!(files, vec![writing.join("essays/a.html")]);
    }

    #[test]
    fn utility_pages_get_analytics_but_not_headers() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("utility")).unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        fs::write(dir.path().join("utility/tool.html"), "").unwrap();
        let config = SiteConfig::new(dir.path());

        let analytics: Vec<_> = Task::AnalyticsAdd.walker(&config).walk().collect();
        assert_eq!(
            analytics,
            vec![dir.path().join("index.html"), dir.path().join("utility/tool.html")]
        );
        let headers: Vec<_> = Task::SyncHeaders.walker(&config).walk().collect();
        assert_eq!(headers, vec![dir.path().join("index.html")]);
    }

    #[test]
    fn task_names() {
        assert_eq!(Task::CssCaseStudies.to_string(), "css-case-studies");
        assert_eq!(
            Task::AnalyticsReplace {
                from: "G-OLD".into(),
                to: "G-NEW".into()
            }
            .to_string(),
            "analytics-replace"
        );
    }
}
