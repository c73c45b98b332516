// ABOUTME: Image URL discovery and normalization for rendered article pages.
// ABOUTME: Keeps photographic images from the body content and strips thumbnail and crop segments.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

static BODY_IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("#bodyContent img").unwrap());

/// A photographic extension followed by the end of the URL or a non-alphanumeric character.
static PHOTO_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.jpe?g(?:$|[^a-z0-9])").unwrap());

/// Collect normalized photo URLs from the `#bodyContent` region of a page, in document order.
///
/// Icons, logos and other non-photographic images are dropped by extension.
/// `base_url` resolves root-relative and relative sources.
pub fn collect_images(page_html: &str, base_url: Option<&str>) -> Vec<String> {
    let document = Html::parse_document(page_html);
    document
        .select(&BODY_IMAGES)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| absolute_image_url(src, base_url))
        .filter(|url| is_photo_url(url))
        .map(|url| clean_image_url(&url))
        .collect()
}

/// Build an absolute URL from an image `src` attribute.
///
/// Protocol-relative sources get an `https:` prefix. Returns None for empty
/// sources, data URIs, and relative sources without a usable base.
pub fn absolute_image_url(src: &str, base_url: Option<&str>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }

    if src.starts_with("//") {
        return Some(format!("https:{}", src));
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }

    let base = Url::parse(base_url?).ok()?;
    base.join(src).ok().map(|u| u.to_string())
}

/// Returns true if the URL points at a photographic raster image.
pub fn is_photo_url(url: &str) -> bool {
    PHOTO_EXTENSION.is_match(url)
}

/// Remove the thumbnail path segment and anything after the photographic extension.
///
/// `https://x/thumb/a/b/c.jpg/220px-c.jpg` becomes `https://x/a/b/c.jpg`.
/// URLs without a photographic extension only lose the thumbnail segment.
pub fn clean_image_url(url: &str) -> String {
    let unthumbed = url.replacen("/thumb/", "/", 1);
    match PHOTO_EXTENSION.find(&unthumbed) {
        Some(m) => {
            // The match may include the character after the extension.
            let ext_len = if m.as_str().to_ascii_lowercase().starts_with(".jpeg") {
                5
            } else {
                4
            };
            unthumbed[..m.start() + ext_len].to_string()
        }
        None => unthumbed,
    }
}
