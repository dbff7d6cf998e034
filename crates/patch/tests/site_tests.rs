// ABOUTME: Integration tests running folio-patch tasks over a temporary site tree.
// ABOUTME: Checks header structure by depth, stylesheet normalization, analytics idempotence, and link fixing.

use std::fs;
use std::path::Path;

use dom_query::Document;
use folio_patch::config::SiteConfig;
use folio_patch::{run_task, BatchOptions, FileOutcome, Task};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn run(config: &SiteConfig, task: Task) -> folio_patch::BatchReport {
    run_task(config, &task, BatchOptions::default()).unwrap()
}

const HEADER_PAGE: &str = "<!DOCTYPE html>
<html>
<head><title>x</title></head>
<body>
<header><img class=\"profile-pic\" src=\"p.png\"><h1>Old</h1></header>
<main><p>Content</p></main>
</body>
</html>
";

#[test]
fn header_links_match_page_depth() {
    let site = TempDir::new().unwrap();
    let root = site.path();
    write(root, "index.html", HEADER_PAGE);
    write(root, "writing/a.html", HEADER_PAGE);
    write(root, "writing/essays/b.html", HEADER_PAGE);
    write(root, "utility/tool.html", HEADER_PAGE);

    let report = run(&SiteConfig::new(root), Task::SyncHeaders);
    assert_eq!(report.updated, 3);

    for (rel, prefix) in [
        ("index.html", ""),
        ("writing/a.html", "../"),
        ("writing/essays/b.html", "../../"),
    ] {
        let doc = Document::from(read(root, rel).as_str());
        assert_eq!(doc.select("body > header").length(), 1, "{}", rel);
        assert_eq!(
            doc.select("header h1 a").attr("href").unwrap().to_string(),
            format!("{}index.html", prefix)
        );
        let labels: Vec<String> = doc
            .select("header nav ul li a")
            .iter()
            .map(|a| a.text().to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["Home", "Consulting", "CV", "Case Studies", "Writing", "Books"]
        );
        let hrefs: Vec<String> = doc
            .select("header nav ul li a")
            .iter()
            .map(|a| a.attr("href").unwrap().to_string())
            .collect();
        assert_eq!(hrefs[3], format!("{}case_studies.html", prefix));
    }

    assert_eq!(read(root, "utility/tool.html"), HEADER_PAGE);

    let again = run(&SiteConfig::new(root), Task::SyncHeaders);
    assert_eq!(again.updated, 0);
    assert_eq!(again.unchanged, 3);
}

#[test]
fn article_stylesheets_are_normalized_once() {
    let site = TempDir::new().unwrap();
    let root = site.path();
    let page = "<html><head>
    <link href=\"../../favicon.ico\" rel=\"icon\">
    <link href=\"../../style.css\" rel=\"stylesheet\">
    <link href=\"../article.css\" rel=\"stylesheet\">
</head><body><header><img class=\"profile-pic\" src=\"p.png\"></header></body></html>";
    write(root, "writing/essays/a.html", page);

    let report = run(&SiteConfig::new(root), Task::CssArticles);
    assert_eq!(report.updated, 1);

    let text = read(root, "writing/essays/a.html");
    let doc = Document::from(text.as_str());
    let sheets: Vec<String> = doc
        .select("head link[rel=\"stylesheet\"]")
        .iter()
        .map(|l| l.attr("href").unwrap().to_string())
        .collect();
    assert_eq!(
        sheets,
        vec!["../../styles/common.css", "../../styles/writing_articles.css"]
    );
    assert_eq!(doc.select("img.profile-pic").length(), 0);

    let again = run(&SiteConfig::new(root), Task::CssArticles);
    assert_eq!(again.unchanged, 1);
    assert_eq!(read(root, "writing/essays/a.html"), text);
}

#[test]
fn analytics_update_then_add_leaves_one_config() {
    let site = TempDir::new().unwrap();
    let root = site.path();
    write(
        root,
        "index.html",
        "<html><head>
<script>
  gtag('config', 'G-OLD111');
  gtag('config', 'G-OLD222');
</script>
</head><body></body></html>
",
    );
    write(root, "about.html", "<html><head></head><body></body></html>\n");
    write(root, "fragment.html", "<p>no head here</p>\n");

    let config = SiteConfig::builder(root).measurement_id("G-VE38R5Y66Q").build();
    run(&config, Task::AnalyticsUpdate);
    let report = run(&config, Task::AnalyticsAdd);

    assert_eq!(report.updated, 1);
    assert!(report.files.iter().any(|o| matches!(
        o,
        FileOutcome::Skipped { reason, .. } if reason == "no </head> tag"
    )));
    for rel in ["index.html", "about.html"] {
        let text = read(root, rel);
        assert_eq!(text.matches("gtag('config'").count(), 1, "{}", rel);
        assert!(text.contains("gtag('config', 'G-VE38R5Y66Q');"), "{}", rel);
    }

    let twice = run(&config, Task::AnalyticsAdd);
    assert_eq!(twice.updated, 0);
}

#[test]
fn analytics_replace_swaps_placeholder() {
    let site = TempDir::new().unwrap();
    let root = site.path();
    write(root, "a.html", "<script>gtag('config', 'G-XXXXXXXXXX');</script>");
    write(root, "b.html", "<p>nothing</p>");

    let report = run(
        &SiteConfig::new(root),
        Task::AnalyticsReplace {
            from: "G-XXXXXXXXXX".to_string(),
            to: "G-VE38R5Y66Q".to_string(),
        },
    );

    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(read(root, "a.html"), "<script>gtag('config', 'G-VE38R5Y66Q');</script>");
}

#[test]
fn nested_article_links_are_deepened() {
    let site = TempDir::new().unwrap();
    let root = site.path();
    let page = "<html><head><link href=\"../article.css\" rel=\"stylesheet\"></head>
<body><a href=\"../index.html\">Home</a><a href=\"../../cv.html\">CV</a><img src=\"../profile.png\"></body></html>";
    write(root, "writing/essays/a.html", page);
    write(root, "writing/top.html", page);

    let report = run(&SiteConfig::new(root), Task::FixLinks);
    assert_eq!(report.total(), 1);

    let text = read(root, "writing/essays/a.html");
    assert!(text.contains("href=\"../../article.css\""));
    assert!(text.contains("href=\"../../index.html\""));
    assert!(text.contains("href=\"../../cv.html\""));
    assert!(text.contains("src=\"../../assets/profile.png\""));
    assert_eq!(read(root, "writing/top.html"), page);

    let again = run(&SiteConfig::new(root), Task::FixLinks);
    assert_eq!(again.updated, 0);
}
