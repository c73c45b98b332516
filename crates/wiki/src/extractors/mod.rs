// ABOUTME: Scraping components that turn fetched markup into page fields.
// ABOUTME: Includes the paragraph text extractor, image and reference collectors, and the section tree builder.

//! Extraction module.
//!
//! Submodules:
//! - `text`: paragraph text extraction from a markup fragment.
//! - `images`: body image discovery and URL normalization.
//! - `references`: numbered citation lists from the "References" region.
//! - `sections`: the linear-to-tree section walk.

pub mod images;
pub mod references;
pub mod sections;
pub mod text;
