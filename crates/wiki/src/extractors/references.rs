// ABOUTME: Citation list extraction from the "References" region of a page.
// ABOUTME: Works on either the block stream (API source) or a rendered HTML document.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::blocks::html::{child_elements, content_root, heading_of, heading_title};
use crate::blocks::ContentBlock;

/// Exact, case-sensitive title of the region holding citations.
pub const REFERENCES_TITLE: &str = "References";

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());

fn list_item_texts(markup: &str, out: &mut Vec<String>) {
    let fragment = Html::parse_fragment(markup);
    out.extend(
        fragment
            .select(&LIST_ITEM)
            .map(|li| li.text().collect::<String>().trim().to_string()),
    );
}

/// Collect citation texts from the block titled "References".
///
/// The region is that block plus the deeper blocks nested under it, so
/// "Citations" and "Sources" subsections are included. When the title occurs
/// more than once, the last occurrence wins. No such block gives an empty list.
///
/// Each item's text is trimmed of surrounding whitespace; inner whitespace is
/// left as the markup has it.
pub fn collect_references(blocks: &[ContentBlock]) -> Vec<String> {
    let Some(start) = blocks.iter().rposition(|b| b.title == REFERENCES_TITLE) else {
        return Vec::new();
    };
    let level = blocks[start].level;

    let mut refs = Vec::new();
    list_item_texts(&blocks[start].text, &mut refs);
    for block in blocks[start + 1..].iter().take_while(|b| b.level > level) {
        list_item_texts(&block.text, &mut refs);
    }
    refs
}

/// Collect citation texts from a rendered page.
///
/// Everything between the "References" heading and the next heading of the
/// same or a higher rank is searched for list items. The last "References"
/// heading wins, matching the block-based collector.
pub fn collect_references_html(page_html: &str) -> Vec<String> {
    let doc = Html::parse_document(page_html);
    let Some(root) = content_root(&doc) else {
        return Vec::new();
    };

    let mut refs: Option<Vec<String>> = None;
    let mut open_rank: Option<u8> = None;

    for el in child_elements(*root) {
        if let Some((rank, heading)) = heading_of(el) {
            if open_rank.is_some_and(|open| rank <= open) {
                open_rank = None;
            }
            if heading_title(heading) == REFERENCES_TITLE {
                open_rank = Some(rank);
                refs = Some(Vec::new());
            }
            continue;
        }
        if open_rank.is_some() {
            if let Some(items) = refs.as_mut() {
                if el.value().name() == "li" {
                    items.push(el.text().collect::<String>().trim().to_string());
                } else {
                    items.extend(
                        el.select(&LIST_ITEM)
                            .map(|li| li.text().collect::<String>().trim().to_string()),
                    );
                }
            }
        }
    }

    refs.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn refs_block(text: &str) -> ContentBlock {
        ContentBlock::new(1, "References", text)
    }

    #[test]
    fn three_items_in_order() {
        let blocks = vec![
            ContentBlock::new(1, "History", "<p>h</p><ul><li>not a ref</li></ul>"),
            refs_block(r#"<ol class="references"><li>One</li><li> Two </li><li>Three</li></ol>"#),
        ];
        assert_eq!(collect_references(&blocks), vec!["One", "Two", "Three"]);
    }

    #[test]
    fn missing_region_is_empty() {
        let blocks = vec![ContentBlock::new(1, "History", "<ol><li>x</li></ol>")];
        assert!(collect_references(&blocks).is_empty());
        assert!(collect_references(&[]).is_empty());
    }

    #[test]
    fn title_match_is_case_sensitive() {
        let blocks = vec![ContentBlock::new(1, "references", "<ol><li>x</li></ol>")];
        assert!(collect_references(&blocks).is_empty());
    }

    #[test]
    fn includes_nested_subsections_only() {
        let blocks = vec![
            refs_block(""),
            ContentBlock::new(2, "Citations", "<ol><li>c1</li><li>c2</li></ol>"),
            ContentBlock::new(2, "Sources", "<ul><li>s1</li></ul>"),
            ContentBlock::new(1, "External links", "<ul><li>link</li></ul>"),
        ];
        assert_eq!(collect_references(&blocks), vec!["c1", "c2", "s1"]);
    }

    #[test]
    fn last_references_block_wins() {
        let blocks = vec![
            refs_block("<ol><li>old</li></ol>"),
            ContentBlock::new(1, "Other", ""),
            refs_block("<ol><li>new</li></ol>"),
        ];
        assert_eq!(collect_references(&blocks), vec!["new"]);
    }

    #[test]
    fn html_region_until_next_heading() {
        let html = r#"<html><body><div id="mw-content-text"><div class="mw-parser-output">
            <p>lead</p>
            <ul><li>not a ref</li></ul>
            <div class="mw-heading mw-heading2"><h2 id="References">References</h2><span class="mw-editsection">[edit]</span></div>
            <div class="reflist"><ol class="references"><li>A</li><li>B</li></ol></div>
            <div class="mw-heading mw-heading3"><h3>Sources</h3></div>
            <ul><li>C</li></ul>
            <div class="mw-heading mw-heading2"><h2>External links</h2></div>
            <ul><li>D</li></ul>
        </div></div></body></html>"#;
        assert_eq!(collect_references_html(html), vec!["A", "B", "C"]);
    }

    #[test]
    fn html_without_region() {
        assert!(collect_references_html("<p>x</p><ul><li>y</li></ul>").is_empty());
    }

    #[test]
    fn item_text_is_trimmed_but_inner_spacing_kept() {
        let blocks = vec![refs_block("<ol><li>\n  Smith,  J. (2001).\n</li></ol>")];
        assert_eq!(collect_references(&blocks), vec!["Smith,  J. (2001)."]);
    }
}
