// ABOUTME: The main Client struct that fetches an article from the upstream wiki and assembles PageData.
// ABOUTME: In API mode the structured sections and the rendered page are fetched concurrently and joined.

use crate::assemble::{assemble, FetchedPage};
use crate::blocks::api::MobileSections;
use crate::error::ScrapeError;
use crate::options::{ClientBuilder, Options, SourceMode};
use crate::resource::{fetch, page_url, FetchOptions};
use crate::result::PageData;

/// The scraper client. Cheap to share behind an `Arc`; it holds no per-request state.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    ///
    /// `opts.timeout` bounds every upstream request, including those sent
    /// through an injected HTTP client.
    pub fn new(opts: Options) -> Result<Self, ScrapeError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| {
                    ScrapeError::upstream(
                        "",
                        "NewClient",
                        Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                    )
                })?,
        };

        Ok(Self { opts, http_client })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Scrape one page using the configured source mode.
    pub async fn scrape(&self, page: &str) -> Result<PageData, ScrapeError> {
        self.scrape_with(page, self.opts.source).await
    }

    /// Scrape one page, overriding the configured source mode.
    pub async fn scrape_with(&self, page: &str, source: SourceMode) -> Result<PageData, ScrapeError> {
        let fetched = self.fetch(page, source).await?;
        assemble(&fetched, &self.opts.tree).map_err(|e| e.with_page(page))
    }

    /// Fetch everything a page needs without extracting anything.
    ///
    /// An empty or blank page id is NotFound. In API mode both requests are
    /// in flight at once and the first failure fails the pair.
    pub async fn fetch(&self, page: &str, source: SourceMode) -> Result<FetchedPage, ScrapeError> {
        if page.trim().is_empty() {
            return Err(ScrapeError::not_found(
                page,
                "Scrape",
                Some(anyhow::anyhow!("empty page id")),
            ));
        }

        let html_url = page_url(&self.opts.wiki_base, page)?;
        let html_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            query: Vec::new(),
            timeout: Some(self.opts.timeout),
        };

        match source {
            SourceMode::Api => {
                let api_url = page_url(&self.opts.api_base, page)?;
                let api_opts = FetchOptions {
                    headers: self.opts.headers.clone(),
                    query: vec![("redirect".to_string(), "true".to_string())],
                    timeout: Some(self.opts.timeout),
                };

                let (api_res, html_res) = tokio::try_join!(
                    fetch(&self.http_client, page, &api_url, &api_opts),
                    fetch(&self.http_client, page, &html_url, &html_opts),
                )?;

                let sections = MobileSections::from_json(&api_res.text()).map_err(|e| {
                    ScrapeError::upstream(
                        page,
                        "FetchSections",
                        Some(anyhow::anyhow!("malformed sections response: {}", e)),
                    )
                })?;

                Ok(FetchedPage::Api {
                    sections,
                    html: html_res.text(),
                    url: html_res.final_url,
                })
            }
            SourceMode::Html => {
                let html_res = fetch(&self.http_client, page, &html_url, &html_opts).await?;
                Ok(FetchedPage::Html {
                    html: html_res.text(),
                    url: html_res.final_url,
                })
            }
        }
    }
}
