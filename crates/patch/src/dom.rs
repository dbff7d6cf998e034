// ABOUTME: Parsed HTML documents with an edit set applied during serialization.
// ABOUTME: Supports remove, replace, unwrap, wrap, insert-after, prepend and append by node id.

//! DOM patching on top of `scraper`.
//!
//! `scraper` trees are read-only once parsed, so edits are recorded against node
//! ids in an [`EditSet`] and applied while the tree is written back out. Nodes
//! without edits are serialized as they were parsed.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

/// Pending changes for a single node.
#[derive(Debug, Clone, Default)]
struct NodeEdit {
    /// `Some(None)` removes the node, `Some(Some(html))` replaces it.
    replace: Option<Option<String>>,
    unwrap: bool,
    wrap: Option<(String, String)>,
    after: Vec<String>,
    prepend: Vec<String>,
    append: Vec<String>,
}

/// Edits keyed by node id, applied by [`HtmlDocument::serialize`].
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: HashMap<NodeId, NodeEdit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn entry(&mut self, id: NodeId) -> &mut NodeEdit {
        self.edits.entry(id).or_default()
    }

    /// Drop the node and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        self.entry(id).replace = Some(None);
    }

    /// Replace the node and its subtree with raw HTML.
    pub fn replace(&mut self, id: NodeId, html: impl Into<String>) {
        self.entry(id).replace = Some(Some(html.into()));
    }

    /// Drop the element's tags but keep its children.
    pub fn unwrap(&mut self, id: NodeId) {
        self.entry(id).unwrap = true;
    }

    /// Surround the node with `open` and `close`.
    pub fn wrap(&mut self, id: NodeId, open: impl Into<String>, close: impl Into<String>) {
        self.entry(id).wrap = Some((open.into(), close.into()));
    }

    /// Insert after the node. Repeated calls keep call order.
    pub fn insert_after(&mut self, id: NodeId, html: impl Into<String>) {
        self.entry(id).after.push(html.into());
    }

    /// Insert as the first child. Repeated calls keep call order.
    pub fn prepend(&mut self, id: NodeId, html: impl Into<String>) {
        self.entry(id).prepend.push(html.into());
    }

    pub fn append(&mut self, id: NodeId, html: impl Into<String>) {
        self.entry(id).append.push(html.into());
    }

    fn get(&self, id: NodeId) -> Option<&NodeEdit> {
        self.edits.get(&id)
    }
}

/// A parsed HTML document or fragment.
pub struct HtmlDocument {
    html: Html,
    fragment: bool,
}

impl HtmlDocument {
    /// Parse a full document.
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
            fragment: false,
        }
    }

    /// Parse a body fragment.
    pub fn parse_fragment(text: &str) -> Self {
        Self {
            html: Html::parse_fragment(text),
            fragment: true,
        }
    }

    /// First element matching `css`, or `None` (also for an invalid selector).
    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = parse_selector(css)?;
        self.html.select(&selector).next()
    }

    /// All elements matching `css` in document order.
    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match parse_selector(css) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    /// Write the tree back out with `edits` applied.
    pub fn serialize(&self, edits: &EditSet) -> String {
        let mut output = String::new();
        if self.fragment {
            for child in self.html.root_element().children() {
                serialize_node(child, edits, &mut output);
            }
        } else {
            for child in self.html.tree.root().children() {
                serialize_node(child, edits, &mut output);
            }
        }
        output
    }
}

/// Parse a CSS selector, logging invalid ones.
pub fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(err) => {
            tracing::debug!(selector = css, error = %err, "invalid selector");
            None
        }
    }
}

/// Returns the element of `el`'s following siblings, skipping text and comments.
pub fn next_element_sibling<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Collapsed, trimmed text content of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if the element carries `class` among its classes.
pub fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Recursively serializes a node with its pending edits.
fn serialize_node(node: NodeRef<'_, Node>, edits: &EditSet, output: &mut String) {
    let edit = edits.get(node.id());

    if let Some(edit) = edit {
        if let Some(ref replacement) = edit.replace {
            if let Some(html) = replacement {
                output.push_str(html);
            }
            for html in &edit.after {
                output.push_str(html);
            }
            return;
        }
        if let Some((ref open, _)) = edit.wrap {
            output.push_str(open);
        }
    }

    match node.value() {
        Node::Text(text) => {
            if in_raw_text_element(&node) {
                output.push_str(text);
            } else {
                output.push_str(&escape_text(text));
            }
        }
        Node::Element(el) => {
            let tag_name = el.name();
            let unwrap = edit.map(|e| e.unwrap).unwrap_or(false);

            if !unwrap {
                output.push('<');
                output.push_str(tag_name);
                for (name, value) in el.attrs() {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    output.push_str(&escape_attr(value));
                    output.push('"');
                }
                output.push('>');
            }

            if !is_void_element(tag_name) || unwrap {
                if let Some(edit) = edit {
                    for html in &edit.prepend {
                        output.push_str(html);
                    }
                }
                for child in node.children() {
                    serialize_node(child, edits, output);
                }
                if let Some(edit) = edit {
                    for html in &edit.append {
                        output.push_str(html);
                    }
                }
                if !unwrap {
                    output.push_str("</");
                    output.push_str(tag_name);
                    output.push('>');
                }
            }
        }
        Node::Comment(comment) => {
            output.push_str("<!--");
            output.push_str(comment);
            output.push_str("-->");
        }
        Node::Doctype(doctype) => {
            output.push_str("<!DOCTYPE ");
            output.push_str(doctype.name());
            if !doctype.public_id().is_empty() {
                output.push_str(" PUBLIC \"");
                output.push_str(doctype.public_id());
                output.push('"');
            }
            if !doctype.system_id().is_empty() {
                output.push_str(" \"");
                output.push_str(doctype.system_id());
                output.push('"');
            }
            output.push('>');
        }
        _ => {
            for child in node.children() {
                serialize_node(child, edits, output);
            }
        }
    }

    if let Some(edit) = edit {
        if let Some((_, ref close)) = edit.wrap {
            output.push_str(close);
        }
        for html in &edit.after {
            output.push_str(html);
        }
    }
}

fn in_raw_text_element(node: &NodeRef<'_, Node>) -> bool {
    node.parent()
        .and_then(|p| p.value().as_element().map(|el| el.name().to_ascii_lowercase()))
        .map(|name| {
            matches!(
                name.as_str(),
                "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript"
            )
        })
        .unwrap_or(false)
}

/// Escapes text content.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes special characters in attribute values.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Checks if a tag is a void element (self-closing in HTML5).
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn untouched_fragment_round_trips() {
        let html = r#"<p class="a">Tom &amp; Jerry<br><img src="x.png"></p><!-- note -->"#;
        let doc = HtmlDocument::parse_fragment(html);
        assert_eq!(doc.serialize(&EditSet::new()), html);
    }

    #[test]
    fn document_keeps_doctype_and_script_text() {
        let html = "<!DOCTYPE html><html><head><script>if (a < b) {}</script></head><body><p>x</p></body></html>";
        let doc = HtmlDocument::parse(html);
        assert_eq!(doc.serialize(&EditSet::new()), html);
    }

    #[test]
    fn remove_replace_and_unwrap() {
        let doc = HtmlDocument::parse_fragment(
            r#"<div id="a">one</div><div id="b">two</div><span id="c"><em>three</em></span>"#,
        );
        let mut edits = EditSet::new();
        edits.remove(doc.select_first("#a").unwrap().id());
        edits.replace(doc.select_first("#b").unwrap().id(), "<p>2</p>");
        edits.unwrap(doc.select_first("#c").unwrap().id());
        assert_eq!(doc.serialize(&edits), "<p>2</p><em>three</em>");
    }

    #[test]
    fn inserts_keep_call_order() {
        let doc = HtmlDocument::parse_fragment("<ul><li>old</li></ul>");
        let ul = doc.select_first("ul").unwrap().id();
        let li = doc.select_first("li").unwrap().id();
        let mut edits = EditSet::new();
        edits.prepend(ul, "<li>new</li>");
        edits.insert_after(li, "<li>a</li>");
        edits.insert_after(li, "<li>b</li>");
        edits.wrap(ul, "<nav>", "</nav>");
        assert_eq!(
            doc.serialize(&edits),
            "<nav><ul><li>new</li><li>old</li><li>a</li><li>b</li></ul></nav>"
        );
    }

    #[test]
    fn sibling_and_text_helpers() {
        let doc = HtmlDocument::parse_fragment("<h3>  News\n letter </h3>\n<p>intro</p>");
        let h3 = doc.select_first("h3").unwrap();
        assert_eq!(element_text(&h3), "News letter");
        assert_eq!(next_element_sibling(&h3).unwrap().value().name(), "p");
    }

    #[test]
    fn invalid_selector_matches_nothing() {
        let doc = HtmlDocument::parse_fragment("<p>x</p>");
        assert!(doc.select_first("[[[").is_none());
        assert!(doc.select_all("[[[").is_empty());
    }
}
