// ABOUTME: Page assembly: runs every extractor over one fetched page and merges the results into PageData.
// ABOUTME: Pure and deterministic; the same FetchedPage always yields identical PageData.

use scraper::Html;

use crate::blocks::api::MobileSections;
use crate::blocks::html::{page_description, page_title};
use crate::blocks::ContentStream;
use crate::error::ScrapeError;
use crate::extractors::images::collect_images;
use crate::extractors::references::{collect_references, collect_references_html};
use crate::extractors::sections::build_sections;
use crate::extractors::text::extract_text;
use crate::options::TreeOptions;
use crate::result::PageData;

/// Everything fetched for one page, before any extraction.
#[derive(Debug, Clone)]
pub enum FetchedPage {
    /// Structured sections plus the rendered page (used for images only).
    Api {
        sections: MobileSections,
        html: String,
        url: String,
    },
    /// The rendered page alone.
    Html { html: String, url: String },
}

/// Assemble PageData from fetched content.
///
/// Extraction runs in a fixed order: basic info, intro, sections, images,
/// references. Collectors that find nothing leave their field empty; only a
/// structural error from the section walk aborts assembly.
pub fn assemble(page: &FetchedPage, tree: &TreeOptions) -> Result<PageData, ScrapeError> {
    match page {
        FetchedPage::Api {
            sections,
            html,
            url,
        } => assemble_api(sections, html, url, tree),
        FetchedPage::Html { html, url } => assemble_html(html, url, tree),
    }
}

fn assemble_api(
    data: &MobileSections,
    html: &str,
    url: &str,
    tree: &TreeOptions,
) -> Result<PageData, ScrapeError> {
    let stream = ContentStream::from_api(data);

    let title = data.title().unwrap_or_default().to_string();
    let description = data.description().unwrap_or_default().to_string();
    let intro = extract_text(&stream.lead);
    let sections = build_sections(&stream.blocks, tree)?;
    let images = collect_images(html, Some(url));
    let references = collect_references(&stream.blocks);

    tracing::debug!(
        title = %title,
        sections = sections.len(),
        images = images.len(),
        references = references.len(),
        "assembled page from api sections"
    );

    Ok(PageData {
        title,
        description,
        intro,
        sections,
        images: images.into(),
        references: references.into(),
    })
}

fn assemble_html(html: &str, url: &str, tree: &TreeOptions) -> Result<PageData, ScrapeError> {
    let stream = ContentStream::from_html(html);

    let (title, description) = {
        let doc = Html::parse_document(html);
        (
            page_title(&doc).unwrap_or_default(),
            page_description(&doc).unwrap_or_default(),
        )
    };
    let intro = extract_text(&stream.lead);
    let sections = build_sections(&stream.blocks, tree)?;
    let images = collect_images(html, Some(url));
    let references = collect_references_html(html);

    tracing::debug!(
        title = %title,
        sections = sections.len(),
        images = images.len(),
        references = references.len(),
        "assembled page from html"
    );

    Ok(PageData {
        title,
        description,
        intro,
        sections,
        images: images.into(),
        references: references.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OrphanPolicy;
    use pretty_assertions::assert_eq;

    const API_JSON: &str = r#"{
        "lead": {
            "displaytitle": "Cat",
            "description": "Small mammal",
            "sections": [{"id": 0, "text": "<p>The cat.</p><p>It purrs.</p>"}]
        },
        "remaining": {"sections": [
            {"id": 1, "toclevel": 1, "line": "Biology", "text": "<p>Body.</p>"},
            {"id": 2, "toclevel": 2, "line": "Claws", "text": "<p>Sharp.</p>"},
            {"id": 3, "toclevel": 1, "line": "References", "text": "<ol><li>R1</li><li>R2</li></ol>"},
            {"id": 4, "toclevel": 1, "line": "Trailing", "text": "<p>t</p>"}
        ]}
    }"#;

    const PAGE_HTML: &str = r#"<html><body><div id="bodyContent">
        <img src="//up/thumb/a/b/Cat.jpg/220px-Cat.jpg">
        <img src="//up/c/d/Logo.svg">
    </div></body></html>"#;

    fn api_page(json: &str) -> FetchedPage {
        FetchedPage::Api {
            sections: MobileSections::from_json(json).unwrap(),
            html: PAGE_HTML.to_string(),
            url: "https://en.wikipedia.org/wiki/Cat".to_string(),
        }
    }

    #[test]
    fn assembles_all_fields() {
        let page = assemble(&api_page(API_JSON), &TreeOptions::default()).unwrap();
        assert_eq!(page.title, "Cat");
        assert_eq!(page.description, "Small mammal");
        assert_eq!(page.intro, "The cat.It purrs.");
        assert_eq!(page.sections.keys().collect::<Vec<_>>(), vec!["Biology"]);
        assert_eq!(page.sections["Biology"].subsections["Claws"].intro, "Sharp.");
        assert_eq!(page.images.0, vec!["https://up/a/b/Cat.jpg"]);
        assert_eq!(page.references.0, vec!["R1", "R2"]);
    }

    #[test]
    fn missing_optional_parts_default_to_empty() {
        let json = r#"{"lead": {"displaytitle": "Bare", "sections": []}, "remaining": {"sections": []}}"#;
        let page = FetchedPage::Api {
            sections: MobileSections::from_json(json).unwrap(),
            html: String::new(),
            url: String::new(),
        };
        let page = assemble(&page, &TreeOptions::default()).unwrap();
        assert_eq!(page.title, "Bare");
        assert_eq!(page.description, "");
        assert_eq!(page.intro, "");
        assert!(page.sections.is_empty());
        assert!(page.images.is_empty());
        assert!(page.references.is_empty());
    }

    #[test]
    fn repeated_assembly_is_byte_identical() {
        let fetched = api_page(API_JSON);
        let opts = TreeOptions::default();
        let first = serde_json::to_string(&assemble(&fetched, &opts).unwrap()).unwrap();
        let second = serde_json::to_string(&assemble(&fetched, &opts).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn structural_error_aborts_under_fail_policy() {
        let json = r#"{"lead": {"sections": []}, "remaining": {"sections": [
            {"toclevel": 2, "line": "Orphan", "text": ""}
        ]}}"#;
        let opts = TreeOptions {
            orphans: OrphanPolicy::Fail,
            ..TreeOptions::default()
        };
        let err = assemble(&api_page(json), &opts).unwrap_err();
        assert!(err.is_structural());

        let page = assemble(&api_page(json), &TreeOptions::default()).unwrap();
        assert!(page.sections.is_empty());
    }

    #[test]
    fn assembles_from_html_only() {
        let html = r#"<html><head><title>Dog - Wikipedia</title></head><body>
            <div id="bodyContent"><div id="mw-content-text"><div class="mw-parser-output">
            <div class="shortdescription">Domestic animal</div>
            <p>Dogs bark.</p>
            <figure><img src="//up/thumb/x/y/Dog.jpg/200px-Dog.jpg"></figure>
            <h2>History</h2><p>Old.</p>
            <h3>Origins</h3><p>Wolves.</p>
            <h2>References</h2><ol class="references"><li>Ref</li></ol>
            <h2>Later</h2><p>ignored</p>
            </div></div></div></body></html>"#;
        let fetched = FetchedPage::Html {
            html: html.to_string(),
            url: "https://en.wikipedia.org/wiki/Dog".to_string(),
        };
        let page = assemble(&fetched, &TreeOptions::default()).unwrap();
        assert_eq!(page.title, "Dog");
        assert_eq!(page.description, "Domestic animal");
        assert_eq!(page.intro, "Dogs bark.");
        assert_eq!(page.sections.keys().collect::<Vec<_>>(), vec!["History"]);
        assert_eq!(page.sections["History"].subsections["Origins"].intro, "Wolves.");
        assert_eq!(page.images.0, vec!["https://up/x/y/Dog.jpg"]);
        assert_eq!(page.references.0, vec!["Ref"]);
    }
}
