// ABOUTME: Configuration options for the wiki scraper including SourceMode, tree policies, Options and ClientBuilder.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::client::Client;

/// Default base for the structured mobile-sections API. The page id is appended as a path segment.
pub const DEFAULT_API_BASE: &str = "https://en.wikipedia.org/api/rest_v1/page/mobile-sections/";

/// Default base for rendered article pages.
pub const DEFAULT_WIKI_BASE: &str = "https://en.wikipedia.org/wiki/";

/// Trailing section titles that end the section walk.
pub const DEFAULT_STOP_TITLES: &[&str] = &[
    "See also",
    "References",
    "External links",
    "Notes",
    "Further reading",
];

/// Where the section stream comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// Structured JSON sections, plus rendered HTML for images.
    #[default]
    Api,
    /// Rendered HTML only; sections are read off the heading tags.
    Html,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceMode::Api => "api",
            SourceMode::Html => "html",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api" | "json" => Ok(SourceMode::Api),
            "html" | "markup" => Ok(SourceMode::Html),
            other => Err(format!("unknown source {:?}, expected api or html", other)),
        }
    }
}

/// Lenient conversion: anything unrecognized is the default API source.
impl From<&str> for SourceMode {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// What to do with a block whose parent section or subsection does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Drop the block and log a warning.
    #[default]
    Skip,
    /// Abort the walk with a structural error naming the block.
    Fail,
}

/// What to do when a title repeats within the same parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Last write wins; the key keeps its first position.
    #[default]
    Overwrite,
    /// The first occurrence is kept and later ones are ignored.
    KeepFirst,
}

/// Settings that drive the section tree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub stop_titles: Vec<String>,
    pub orphans: OrphanPolicy,
    pub duplicates: DuplicatePolicy,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            stop_titles: DEFAULT_STOP_TITLES.iter().map(|s| s.to_string()).collect(),
            orphans: OrphanPolicy::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

impl TreeOptions {
    /// Returns true if `title` ends the walk.
    pub fn is_stop_title(&self, title: &str) -> bool {
        self.stop_titles.iter().any(|t| t == title)
    }
}

/// Configuration options for the scraper client.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub api_base: String,
    pub wiki_base: String,
    pub source: SourceMode,
    pub tree: TreeOptions,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("wikiscrape/", env!("CARGO_PKG_VERSION")).to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            wiki_base: DEFAULT_WIKI_BASE.to_string(),
            source: SourceMode::Api,
            tree: TreeOptions::default(),
            http_client: None,
            headers: HashMap::new(),
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout applied to every upstream fetch.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the base URL of the structured sections API.
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.opts.api_base = base.into();
        self
    }

    /// Set the base URL of rendered article pages.
    pub fn wiki_base(mut self, base: impl Into<String>) -> Self {
        self.opts.wiki_base = base.into();
        self
    }

    /// Choose where sections are read from.
    pub fn source(mut self, source: SourceMode) -> Self {
        self.opts.source = source;
        self
    }

    /// Replace the set of titles that end the section walk.
    pub fn stop_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.tree.stop_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the orphaned block policy.
    pub fn orphans(mut self, policy: OrphanPolicy) -> Self {
        self.opts.tree.orphans = policy;
        self
    }

    /// Set the duplicate title policy.
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.opts.tree.duplicates = policy;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Result<Client, crate::error::ScrapeError> {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
