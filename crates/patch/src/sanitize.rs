// ABOUTME: Allow-list HTML sanitizer for imported newsletter bodies.
// ABOUTME: Structural cleanup with scraper, then an ammonia policy built from a declarative tag table.

use std::collections::{HashMap, HashSet};

use crate::dom::{element_text, EditSet, HtmlDocument};

/// Declarative sanitizer policy.
#[derive(Debug, Clone, Copy)]
pub struct SanitizePolicy {
    /// Allowed tags and the attributes each may keep. Everything else is unwrapped.
    pub tags: &'static [(&'static str, &'static [&'static str])],
    /// Forced `target` on every link.
    pub link_target: Option<&'static str>,
    /// Forced `rel` on every link.
    pub link_rel: Option<&'static str>,
    /// Elements whose class contains any of these markers are dropped with their content.
    pub drop_class_markers: &'static [&'static str],
    pub url_schemes: &'static [&'static str],
}

/// Policy for newsletter posts rendered into the site's article template.
pub const NEWSLETTER_POLICY: SanitizePolicy = SanitizePolicy {
    tags: &[
        ("p", &[]),
        ("h3", &[]),
        ("h4", &[]),
        ("ul", &[]),
        ("ol", &[]),
        ("li", &[]),
        ("blockquote", &[]),
        ("em", &[]),
        ("strong", &[]),
        ("hr", &[]),
        ("figure", &[]),
        ("a", &["href", "target", "rel"]),
        ("img", &["src", "alt", "height", "width"]),
    ],
    link_target: Some("_blank"),
    link_rel: Some("noopener noreferrer"),
    drop_class_markers: &["subscribe-widget"],
    url_schemes: &["http", "https", "mailto"],
};

impl SanitizePolicy {
    fn builder(&self) -> ammonia::Builder<'static> {
        let mut builder = ammonia::Builder::new();
        builder.tags(self.tags.iter().map(|(tag, _)| *tag).collect());
        builder.generic_attributes(HashSet::new());

        let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        for (tag, attrs) in self.tags {
            let kept: HashSet<&'static str> = attrs
                .iter()
                .copied()
                .filter(|attr| !self.is_forced(tag, attr))
                .collect();
            if !kept.is_empty() {
                tag_attributes.insert(*tag, kept);
            }
        }
        builder.tag_attributes(tag_attributes);

        if let Some(target) = self.link_target {
            builder.set_tag_attribute_value("a", "target", target);
        }
        builder.link_rel(self.link_rel);
        builder.url_schemes(self.url_schemes.iter().copied().collect());
        builder
    }

    /// `target` and `rel` on links are set by the policy instead of copied from input.
    fn is_forced(&self, tag: &str, attr: &str) -> bool {
        tag == "a"
            && ((attr == "target" && self.link_target.is_some())
                || (attr == "rel" && self.link_rel.is_some()))
    }
}

/// Drop elements whose class attribute contains one of `markers`.
pub fn remove_marked_elements(html: &str, markers: &[&str]) -> String {
    if markers.is_empty() {
        return html.to_string();
    }
    let doc = HtmlDocument::parse_fragment(html);
    let mut edits = EditSet::new();
    for el in doc.select_all("[class]") {
        let class = el.value().attr("class").unwrap_or("");
        if markers.iter().any(|m| class.contains(m)) {
            edits.remove(el.id());
        }
    }
    if edits.is_empty() {
        return html.to_string();
    }
    doc.serialize(&edits)
}

/// Drop paragraphs with no visible text and no image.
pub fn remove_empty_paragraphs(html: &str) -> String {
    let doc = HtmlDocument::parse_fragment(html);
    let mut edits = EditSet::new();
    for p in doc.select_all("p") {
        let has_img = p.select(&img_selector()).next().is_some();
        if !has_img && element_text(&p).is_empty() {
            edits.remove(p.id());
        }
    }
    if edits.is_empty() {
        return html.to_string();
    }
    doc.serialize(&edits)
}

/// Wrap links that contain an image in `<figure>` unless they already sit in one.
pub fn wrap_linked_images(html: &str) -> String {
    let doc = HtmlDocument::parse_fragment(html);
    let mut edits = EditSet::new();
    for a in doc.select_all("a") {
        if a.select(&img_selector()).next().is_none() {
            continue;
        }
        let in_figure = a.ancestors().any(|node| {
            node.value()
                .as_element()
                .map(|el| el.name() == "figure")
                .unwrap_or(false)
        });
        if !in_figure {
            edits.wrap(a.id(), "<figure>", "</figure>");
        }
    }
    if edits.is_empty() {
        return html.to_string();
    }
    doc.serialize(&edits)
}

fn img_selector() -> scraper::Selector {
    scraper::Selector::parse("img").unwrap()
}

/// Sanitize `html` with `policy`.
///
/// Order: drop marked widgets, drop empty paragraphs, wrap linked images, apply the
/// allow-list, then drop paragraphs the allow-list emptied.
pub fn sanitize_html(html: &str, policy: &SanitizePolicy) -> String {
    let without_widgets = remove_marked_elements(html, policy.drop_class_markers);
    let without_empty = remove_empty_paragraphs(&without_widgets);
    let wrapped = wrap_linked_images(&without_empty);
    let cleaned = policy.builder().clean(&wrapped).to_string();
    remove_empty_paragraphs(&cleaned).trim().to_string()
}

/// Sanitize a newsletter body with [`NEWSLETTER_POLICY`].
pub fn sanitize_newsletter_html(html: &str) -> String {
    sanitize_html(html, &NEWSLETTER_POLICY)
}
