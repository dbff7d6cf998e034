// ABOUTME: `folio` command line for maintaining the portfolio site tree.
// ABOUTME: Parses subcommands, sets up logging, and dispatches to the patch and feed libraries.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use folio_feed::{ImportRequest, Importer};
use folio_patch::{run_task, BatchOptions, BatchReport, SiteConfig, SiteConfigBuilder, Task};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Maintenance operations for a static portfolio site.
#[derive(Parser, Debug)]
#[command(name = "folio", version)]
#[command(about = "Patch, normalize, and import pages of a static portfolio site", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Site root directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file (default: <root>/folio.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report what would change without writing anything.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print the report as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// More log output (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the analytics tag on every page.
    Analytics {
        #[command(subcommand)]
        action: AnalyticsAction,
    },
    /// Deepen `../` links in nested writing pages.
    FixLinks {
        /// Directory to process, relative to the root.
        #[arg(long)]
        dir: Option<String>,
    },
    /// Rewrite the shared header on every page.
    SyncHeaders,
    /// Replace legacy stylesheet links.
    Css {
        #[command(subcommand)]
        profile: CssProfile,
    },
    /// Import a newsletter post as a static article page.
    Import {
        /// Post URL as it appears in the feed.
        #[arg(value_parser = parse_http_url)]
        post_url: String,

        /// Read the feed from this URL or file ("-" for stdin) instead of the site feed.
        #[arg(long)]
        feed: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AnalyticsAction {
    /// Collapse config statements into one using the configured ID.
    Update {
        #[arg(long)]
        id: Option<String>,
    },
    /// Insert the tag snippet into pages that lack it.
    Add {
        #[arg(long)]
        id: Option<String>,
    },
    /// Swap one ID for another wherever it appears.
    Replace {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand, Debug)]
enum CssProfile {
    /// Nested pages under the writing directory.
    Articles,
    /// Top-level case-study pages.
    CaseStudies,
}

fn parse_http_url(raw: &str) -> std::result::Result<String, String> {
    let url = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(format!("expected an http(s) URL, got scheme {}", other)),
    }
}

fn init_tracing(global: &GlobalArgs) {
    let level = match (global.quiet, global.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!("warn,folio={level},folio_patch={level},folio_feed={level}")
    }));

    // JSON reports own stdout.
    if global.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
            .init();
    }
}

fn load_config(global: &GlobalArgs) -> Result<SiteConfig> {
    let root = global
        .root
        .canonicalize()
        .with_context(|| format!("site root {} not found", global.root.display()))?;
    let config = SiteConfig::load(root, global.config.as_deref())?;
    Ok(config)
}

fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.summary());
        for outcome in &report.files {
            if let folio_patch::FileOutcome::Failed { path, error } = outcome {
                println!("  failed {}: {}", path.display(), error);
            }
        }
    }
    Ok(())
}

fn run_batch_command(config: &SiteConfig, task: Task, global: &GlobalArgs) -> Result<bool> {
    let opts = BatchOptions {
        dry_run: global.dry_run,
    };
    let report = run_task(config, &task, opts)?;
    print_report(&report, global.json)?;
    Ok(!report.has_failures())
}

fn run_import(config: &SiteConfig, post_url: String, feed: Option<String>, global: &GlobalArgs) -> Result<bool> {
    let importer = Importer::new(config)?;
    let report = importer.run(&ImportRequest {
        post_url,
        feed,
        dry_run: global.dry_run,
    })?;
    if global.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }
    Ok(true)
}

fn run(cli: Cli) -> Result<bool> {
    let global = &cli.global;
    let config = load_config(global)?;

    match cli.command {
        Command::Analytics { action } => {
            let (config, task) = match action {
                AnalyticsAction::Update { id } => (with_id(config, id), Task::AnalyticsUpdate),
                AnalyticsAction::Add { id } => (with_id(config, id), Task::AnalyticsAdd),
                AnalyticsAction::Replace { from, to } => (config, Task::AnalyticsReplace { from, to }),
            };
            run_batch_command(&config, task, global)
        }
        Command::FixLinks { dir } => {
            let config = match dir {
                Some(dir) => SiteConfigBuilder::from_config(config).links_dir(dir).build(),
                None => config,
            };
            run_batch_command(&config, Task::FixLinks, global)
        }
        Command::SyncHeaders => run_batch_command(&config, Task::SyncHeaders, global),
        Command::Css { profile } => {
            let task = match profile {
                CssProfile::Articles => Task::CssArticles,
                CssProfile::CaseStudies => Task::CssCaseStudies,
            };
            run_batch_command(&config, task, global)
        }
        Command::Import { post_url, feed } => run_import(&config, post_url, feed, global),
    }
}

fn with_id(config: SiteConfig, id: Option<String>) -> SiteConfig {
    match id {
        Some(id) => SiteConfigBuilder::from_config(config).measurement_id(id).build(),
        None => config,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
