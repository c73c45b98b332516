// ABOUTME: Main library entry point for the wikiscrape article scraper.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, PageData, ScrapeError, ErrorCode, Options, ScrapeServer.

//! wikiscrape - turns a Wikipedia article into one structured JSON document.
//!
//! A page is fetched either as structured sections from the mobile-sections
//! REST endpoint (plus the rendered page, for images) or as rendered HTML
//! alone. Both are flattened into the same heading/text stream and walked
//! into a three-level section tree alongside the title, description, intro,
//! images and references.
//!
//! # Example
//!
//! ```no_run
//! use wikiscrape::{Client, ScrapeError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let client = Client::builder().build()?;
//!     let page = client.scrape("Rust (programming language)").await?;
//!     println!("{}", serde_json::to_string_pretty(&page).unwrap());
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod blocks;
pub mod client;
pub mod error;
pub mod extractors;
pub mod options;
pub mod resource;
pub mod result;
pub mod server;

pub use crate::assemble::{assemble, FetchedPage};
pub use crate::blocks::api::MobileSections;
pub use crate::blocks::{ContentBlock, ContentStream};
pub use crate::client::Client;
pub use crate::error::{ErrorCode, ScrapeError, ServerError};
pub use crate::options::{
    ClientBuilder, DuplicatePolicy, Options, OrphanPolicy, SourceMode, TreeOptions,
};
pub use crate::result::{Numbered, PageData, SectionNode, Sections, SubsectionNode};
pub use crate::server::ScrapeServer;
