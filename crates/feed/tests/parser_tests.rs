// ABOUTME: Integration tests for feed parsing and entry lookup.
// ABOUTME: Covers RSS and Atom inputs, link selection, date/body fallbacks, and URL matching.

use chrono::{TimeZone, Utc};
use folio_feed::{find_entry, parse_feed_bytes, FeedError};
use pretty_assertions::assert_eq;

const NEWSLETTER_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
    <channel>
        <title>Harry's Newsletter</title>
        <link>https://example.substack.com</link>
        <description>Notes on consulting</description>
        <item>
            <title>Hello World</title>
            <link>https://example.substack.com/p/hello-world</link>
            <guid isPermaLink="false">post-1</guid>
            <pubDate>Mon, 15 Jan 2024 10:00:00 +0000</pubDate>
            <description>Short summary.</description>
            <content:encoded><![CDATA[<p>Full body.</p>]]></content:encoded>
        </item>
        <item>
            <title>Second Post</title>
            <link>https://example.substack.com/p/second-post</link>
            <guid isPermaLink="false">post-2</guid>
            <pubDate>Tue, 16 Jan 2024 11:00:00 +0000</pubDate>
            <description><![CDATA[<p>Only a summary.</p>]]></description>
        </item>
    </channel>
</rss>"#;

#[test]
fn parses_rss_entries() {
    let feed = parse_feed_bytes(NEWSLETTER_RSS.as_bytes(), "https://example.substack.com/feed").unwrap();

    assert_eq!(feed.title, "Harry's Newsletter");
    assert_eq!(feed.feed_url, "https://example.substack.com/feed");
    assert_eq!(feed.entries.len(), 2);

    let first = &feed.entries[0];
    assert_eq!(first.title, "Hello World");
    assert_eq!(first.url, "https://example.substack.com/p/hello-world");
    assert_eq!(
        first.publish_date(),
        Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap())
    );
    assert!(first.body_html().unwrap().contains("<p>Full body.</p>"));

    let second = &feed.entries[1];
    assert!(second.content_html.is_none());
    assert!(second.body_html().unwrap().contains("Only a summary."));
}

#[test]
fn finds_entry_despite_trailing_slash_and_host_case() {
    let feed = parse_feed_bytes(NEWSLETTER_RSS.as_bytes(), "feed.xml").unwrap();

    let entry = find_entry(&feed, "https://Example.substack.com/p/second-post/").unwrap();
    assert_eq!(entry.title, "Second Post");
    assert!(find_entry(&feed, "https://example.substack.com/p/missing").is_none());
}

#[test]
fn atom_alternate_link_wins() {
    let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom Notes</title>
    <id>urn:uuid:feed</id>
    <updated>2024-03-02T09:00:00Z</updated>
    <entry>
        <title>Atom Post</title>
        <id>urn:uuid:entry-1</id>
        <link rel="related" href="https://example.com/related"/>
        <link rel="alternate" href="https://example.com/p/atom-post"/>
        <updated>2024-03-02T09:00:00Z</updated>
        <content type="html">&lt;p&gt;Atom body&lt;/p&gt;</content>
    </entry>
</feed>"#;

    let feed = parse_feed_bytes(atom.as_bytes(), "atom.xml").unwrap();
    let entry = &feed.entries[0];
    assert_eq!(entry.url, "https://example.com/p/atom-post");
    assert_eq!(entry.published, None);
    assert_eq!(
        entry.publish_date(),
        Some(Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap())
    );
    assert!(find_entry(&feed, "https://example.com/p/atom-post").is_some());
}

#[test]
fn matches_secondary_links_and_permalink_ids() {
    let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom Notes</title>
    <id>urn:uuid:feed</id>
    <updated>2024-03-02T09:00:00Z</updated>
    <entry>
        <title>Renamed Post</title>
        <id>https://example.com/p/old-slug</id>
        <link rel="alternate" href="https://example.com/p/new-slug"/>
        <link rel="related" href="https://mirror.example.org/new-slug"/>
        <updated>2024-03-02T09:00:00Z</updated>
        <content type="html">&lt;p&gt;Body&lt;/p&gt;</content>
    </entry>
</feed>"#;

    let feed = parse_feed_bytes(atom.as_bytes(), "atom.xml").unwrap();
    for url in [
        "https://example.com/p/new-slug",
        "https://mirror.example.org/new-slug/",
        "https://example.com/p/old-slug",
    ] {
        assert_eq!(find_entry(&feed, url).unwrap().title, "Renamed Post", "{}", url);
    }
    assert!(find_entry(&feed, "https://example.com/p/other").is_none());
}

#[test]
fn malformed_and_empty_feeds_are_errors() {
    assert!(matches!(
        parse_feed_bytes(b"this is not xml", "bad.xml"),
        Err(FeedError::Parse(_))
    ));

    let empty = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Quiet</title><link>https://example.com</link><description>x</description></channel></rss>"#;
    assert!(matches!(
        parse_feed_bytes(empty.as_bytes(), "empty.xml"),
        Err(FeedError::Empty)
    ));
}
