// ABOUTME: Error types for the wiki scraper including the ErrorCode enum and ScrapeError struct.
// ABOUTME: Provides categorized errors with convenience constructors, boolean helpers and user-facing messages.

use std::fmt;

/// Error codes representing different categories of scrape failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MissingInput,
    NotFound,
    Upstream,
    Structural,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::MissingInput => "missing input",
            ErrorCode::NotFound => "not found",
            ErrorCode::Upstream => "upstream error",
            ErrorCode::Structural => "structural error",
        };
        write!(f, "{}", s)
    }
}

/// Message returned to callers for anything that is not a missing page id.
pub const PAGE_ERROR_MESSAGE: &str = "Page could not be found, please try again.";

/// Message returned to callers that did not name a page.
pub const MISSING_INPUT_MESSAGE: &str = "No page was given. Pass one with ?page=<title>.";

/// The main error type for scrape operations.
#[derive(Debug, thiserror::Error)]
pub struct ScrapeError {
    pub code: ErrorCode,
    pub page: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wikiscrape: {} {:?}: {}", self.op, self.page, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ScrapeError {
    fn new(
        code: ErrorCode,
        page: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            page: page.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a MissingInput error.
    pub fn missing_input(op: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingInput, "", op, None)
    }

    /// Create a NotFound error.
    pub fn not_found(
        page: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NotFound, page, op, source)
    }

    /// Create an Upstream error.
    pub fn upstream(
        page: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Upstream, page, op, source)
    }

    /// Create a Structural error.
    pub fn structural(
        page: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Structural, page, op, source)
    }

    /// Attach the page id once it is known. Errors raised below the client
    /// (the tree builder, for one) do not know which page they belong to.
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        if self.page.is_empty() {
            self.page = page.into();
        }
        self
    }

    /// Returns true if this is a MissingInput error.
    pub fn is_missing_input(&self) -> bool {
        self.code == ErrorCode::MissingInput
    }

    /// Returns true if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// Returns true if this is an Upstream error.
    pub fn is_upstream(&self) -> bool {
        self.code == ErrorCode::Upstream
    }

    /// Returns true if this is a Structural error.
    pub fn is_structural(&self) -> bool {
        self.code == ErrorCode::Structural
    }

    /// The text placed in the `{"Error": ...}` payload.
    pub fn user_message(&self) -> &'static str {
        match self.code {
            ErrorCode::MissingInput => MISSING_INPUT_MESSAGE,
            _ => PAGE_ERROR_MESSAGE,
        }
    }
}

/// Errors raised while running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_page_and_source() {
        let err = ScrapeError::upstream(
            "Rust",
            "FetchSections",
            Some(anyhow::anyhow!("status 500")),
        );
        assert_eq!(
            err.to_string(),
            "wikiscrape: FetchSections \"Rust\": upstream error: status 500"
        );
    }

    #[test]
    fn predicates_match_code() {
        assert!(ScrapeError::missing_input("Scrape").is_missing_input());
        assert!(ScrapeError::not_found("x", "Scrape", None).is_not_found());
        assert!(ScrapeError::upstream("x", "Scrape", None).is_upstream());
        assert!(ScrapeError::structural("", "BuildSections", None).is_structural());
    }

    #[test]
    fn with_page_fills_only_empty_page() {
        let err = ScrapeError::structural("", "BuildSections", None).with_page("Rust");
        assert_eq!(err.page, "Rust");
        let err = err.with_page("Other");
        assert_eq!(err.page, "Rust");
    }

    #[test]
    fn user_message_is_uniform_for_page_failures() {
        let nf = ScrapeError::not_found("x", "Scrape", None);
        let up = ScrapeError::upstream("x", "Scrape", None);
        assert_eq!(nf.user_message(), up.user_message());
        assert_eq!(
            ScrapeError::missing_input("Scrape").user_message(),
            MISSING_INPUT_MESSAGE
        );
    }
}
