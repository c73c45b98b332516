// ABOUTME: ContentStream adapter for rendered MediaWiki HTML, plus page title and description lookups.
// ABOUTME: Heading tags among the content root's children become blocks; h2 is a section, h3 a subsection.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

use super::{ContentBlock, ContentStream};

/// Candidate content roots, most specific first.
static CONTENT_ROOTS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["#mw-content-text .mw-parser-output", "#mw-content-text", "body"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse(".mw-headline").unwrap());
static FIRST_HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("#firstHeading").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static SHORT_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".shortdescription").unwrap());

const TITLE_SUFFIX: &str = " - Wikipedia";

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Element children of a node, skipping text and comments.
pub(crate) fn child_elements<'a>(node: NodeRef<'a, Node>) -> impl Iterator<Item = ElementRef<'a>> {
    node.children().filter_map(ElementRef::wrap)
}

/// The element whose children carry the article's headings and paragraphs.
pub(crate) fn content_root(doc: &Html) -> Option<ElementRef<'_>> {
    CONTENT_ROOTS
        .iter()
        .find_map(|sel| doc.select(sel).next())
}

fn heading_rank(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// If `el` is a heading, or a `div.mw-heading` wrapper around one, return its
/// tag rank (2 for h2) and the heading element itself.
pub(crate) fn heading_of<'a>(el: ElementRef<'a>) -> Option<(u8, ElementRef<'a>)> {
    if let Some(rank) = heading_rank(el.value().name()) {
        return Some((rank, el));
    }
    if el.value().name() == "div" && has_class(&el, "mw-heading") {
        return child_elements(*el)
            .find_map(|child| heading_rank(child.value().name()).map(|rank| (rank, child)));
    }
    None
}

fn push_text_skipping_edit_links(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !has_class(&el, "mw-editsection") {
                        push_text_skipping_edit_links(child, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Visible title of a heading element, without the "[edit]" link.
pub(crate) fn heading_title(heading: ElementRef<'_>) -> String {
    if let Some(headline) = heading.select(&HEADLINE).next() {
        return normalize_whitespace(&headline.text().collect::<String>());
    }
    let mut raw = String::new();
    push_text_skipping_edit_links(*heading, &mut raw);
    normalize_whitespace(&raw)
}

/// Heading tag rank to tree level: h2 is a section, h3 a subsection, h4 and below sub-subsections.
/// An h1 inside the content maps to level 0, which the tree builder treats as orphaned.
fn rank_to_level(rank: u8) -> u8 {
    (rank - 1).min(3)
}

impl ContentStream {
    /// Adapt a rendered page into a block stream.
    ///
    /// The lead is every paragraph before the first heading. A block's text is
    /// the markup of every sibling between its heading and the next heading of
    /// any rank, so hatnotes, figures and lists stay in it for the text
    /// extractor to skip. A heading followed directly by another has no text.
    pub fn from_html(page_html: &str) -> Self {
        let doc = Html::parse_document(page_html);
        let Some(root) = content_root(&doc) else {
            return Self::default();
        };

        let children: Vec<ElementRef<'_>> = child_elements(*root).collect();
        let mut lead = String::new();
        let mut blocks = Vec::new();
        let mut seen_heading = false;

        for (i, el) in children.iter().enumerate() {
            match heading_of(*el) {
                Some((rank, heading)) => {
                    seen_heading = true;
                    let text: String = children[i + 1..]
                        .iter()
                        .take_while(|next| heading_of(**next).is_none())
                        .map(|next| next.html())
                        .collect();
                    blocks.push(ContentBlock::new(
                        rank_to_level(rank),
                        heading_title(heading),
                        text,
                    ));
                }
                None if !seen_heading && el.value().name() == "p" => lead.push_str(&el.html()),
                None => {}
            }
        }

        Self { lead, blocks }
    }
}

/// Page title from `#firstHeading`, falling back to `<title>` without the site suffix.
pub fn page_title(doc: &Html) -> Option<String> {
    if let Some(h) = doc.select(&FIRST_HEADING).next() {
        let title = normalize_whitespace(&h.text().collect::<String>());
        if !title.is_empty() {
            return Some(title);
        }
    }
    let title = doc.select(&TITLE).next()?.text().collect::<String>();
    let title = normalize_whitespace(&title);
    let title = title.strip_suffix(TITLE_SUFFIX).unwrap_or(&title).to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Short description from the hidden `.shortdescription` element.
pub fn page_description(doc: &Html) -> Option<String> {
    let desc = doc.select(&SHORT_DESCRIPTION).next()?.text().collect::<String>();
    let desc = normalize_whitespace(&desc);
    if desc.is_empty() {
        None
    } else {
        Some(desc)
    }
}
