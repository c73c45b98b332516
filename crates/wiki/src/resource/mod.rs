// ABOUTME: Resource handling module for fetching upstream wiki resources.
// ABOUTME: Builds page URLs, maps HTTP outcomes to scrape errors, enforces a size limit and decodes charsets.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::error::ScrapeError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub query: Vec<(String, String)>,
    /// Per-request bound, applied on top of whatever the HTTP client was built with.
    pub timeout: Option<Duration>,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using the charset from the content-type header when present.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Decode body bytes using the content-type charset, falling back to lossy UTF-8.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Append a page id to a base URL as a single path segment.
///
/// Spaces become underscores, as the wiki spells titles in URLs; everything
/// else that is not allowed in a path segment is percent-encoded.
pub fn page_url(base: &str, page: &str) -> Result<Url, ScrapeError> {
    let mut url = Url::parse(base).map_err(|e| {
        ScrapeError::upstream(page, "PageUrl", Some(anyhow::anyhow!("invalid base URL {:?}: {}", base, e)))
    })?;
    let title = page.trim().replace(' ', "_");
    url.path_segments_mut()
        .map_err(|_| {
            ScrapeError::upstream(page, "PageUrl", Some(anyhow::anyhow!("base URL {:?} cannot take a path", base)))
        })?
        .pop_if_empty()
        .push(&title);
    Ok(url)
}

/// Fetch a resource for `page` from `url`.
///
/// A 404 is reported as NotFound; other non-success statuses, transport
/// failures, timeouts and oversized bodies are Upstream errors.
pub async fn fetch(
    client: &reqwest::Client,
    page: &str,
    url: &Url,
    opts: &FetchOptions,
) -> Result<FetchResult, ScrapeError> {
    let mut request = client.get(url.clone());
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }
    if !opts.query.is_empty() {
        request = request.query(&opts.query);
    }
    if let Some(timeout) = opts.timeout {
        request = request.timeout(timeout);
    }

    tracing::debug!(page, url = %url, "fetching");

    let response = request.send().await.map_err(|e| {
        let what = if e.is_timeout() { "request timed out" } else { "request failed" };
        ScrapeError::upstream(page, "Fetch", Some(anyhow::anyhow!("{}: {}", what, e)))
    })?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScrapeError::not_found(
            page,
            "Fetch",
            Some(anyhow::anyhow!("{} returned 404", url)),
        ));
    }
    if !status.is_success() {
        return Err(ScrapeError::upstream(
            page,
            "Fetch",
            Some(anyhow::anyhow!("{} returned status {}", url, status.as_u16())),
        ));
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ScrapeError::upstream(
                page,
                "Fetch",
                Some(anyhow::anyhow!("content length {} exceeds maximum {}", len, MAX_CONTENT_LENGTH)),
            ));
        }
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let body = response.bytes().await.map_err(|e| {
        let what = if e.is_timeout() { "reading body timed out" } else { "failed to read body" };
        ScrapeError::upstream(page, "Fetch", Some(anyhow::anyhow!("{}: {}", what, e)))
    })?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ScrapeError::upstream(
            page,
            "Fetch",
            Some(anyhow::anyhow!("body size {} exceeds maximum {}", body.len(), MAX_CONTENT_LENGTH)),
        ));
    }

    let result = FetchResult {
        status: status.as_u16(),
        url: url.to_string(),
        final_url,
        content_type,
        body,
    };
    tracing::debug!(
        page,
        url = %result.url,
        final_url = %result.final_url,
        status = result.status,
        bytes = result.body.len(),
        "fetched"
    );
    Ok(result)
}
