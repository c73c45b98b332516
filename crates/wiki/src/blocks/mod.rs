// ABOUTME: The heading-tagged content block stream shared by every source format.
// ABOUTME: Adapters in `api` and `html` turn fetched data into a ContentStream for the tree builder.

//! Content block stream.
//!
//! The section tree builder never sees the source format. The structured API
//! and rendered HTML both reduce to a lead fragment followed by an ordered
//! list of [`ContentBlock`]s.

pub mod api;
pub mod html;

use serde::{Deserialize, Serialize};

/// One titled, leveled unit of source markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// 1 = section, 2 = subsection, 3 and deeper = sub-subsection.
    pub level: u8,
    pub title: String,
    /// Markup fragment holding the block's own text.
    pub text: String,
}

impl ContentBlock {
    pub fn new(level: u8, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Lead markup plus the ordered blocks that follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentStream {
    pub lead: String,
    pub blocks: Vec<ContentBlock>,
}
