// ABOUTME: Slug and file-name derivation for generated article pages.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, keep ASCII letters, digits, whitespace and hyphens, turn whitespace
/// runs into single hyphens and trim hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    WHITESPACE_RE
        .replace_all(&kept, "-")
        .trim_matches('-')
        .to_string()
}

/// `<YYYY-MM-DD>_<slug>.html`; titles without usable characters become `untitled`.
pub fn article_file_name(date: NaiveDate, title: &str) -> String {
    let slug = slugify(title);
    let slug = if slug.is_empty() { "untitled".to_string() } else { slug };
    format!("{}_{}.html", date.format("%Y-%m-%d"), slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("My Great Post!"), "my-great-post");
        assert_eq!(slugify("  Rust, Ownership & You  "), "rust-ownership-you");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slugify_is_idempotent() {
        for title in ["My Great Post!", "A - B", "--Edge--", "Tabs\tand\nnewlines"] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn file_name_has_date_prefix() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            article_file_name(date, "My Great Post!"),
            "2024-01-15_my-great-post.html"
        );
        assert_eq!(article_file_name(date, "!!!"), "2024-01-15_untitled.html");
    }
}
