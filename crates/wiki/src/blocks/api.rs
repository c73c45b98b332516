// ABOUTME: Serde model of the mobile-sections API response and its ContentStream adapter.
// ABOUTME: Accepts toclevel as a number or numeric string and drops records without one.

use serde::{Deserialize, Deserializer};

use super::{ContentBlock, ContentStream};

/// Top-level mobile-sections response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MobileSections {
    #[serde(default)]
    pub lead: Lead,
    #[serde(default)]
    pub remaining: Remaining,
}

/// The lead part: page-level metadata and the intro section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub displaytitle: Option<String>,
    #[serde(default)]
    pub normalizedtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Remaining {
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

/// One section record as the API returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionRecord {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default, deserialize_with = "de_toclevel")]
    pub toclevel: Option<u8>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Int(u64),
    Str(String),
}

/// `toclevel` shows up both as `1` and as `"1"`; anything unparseable is treated as absent.
fn de_toclevel<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawLevel>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawLevel::Int(n)) => u8::try_from(n).ok(),
        Some(RawLevel::Str(s)) => s.trim().parse::<u8>().ok(),
        None => None,
    })
}

impl MobileSections {
    /// Parse a raw API body.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Page title: the display title, then the normalized title.
    pub fn title(&self) -> Option<&str> {
        self.lead
            .displaytitle
            .as_deref()
            .or(self.lead.normalizedtitle.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.lead.description.as_deref()
    }
}

impl ContentStream {
    /// Adapt a mobile-sections response into a block stream.
    ///
    /// The lead is the text of the first lead section. Remaining records need
    /// a `toclevel` to be placed in the tree; those without one are dropped.
    pub fn from_api(data: &MobileSections) -> Self {
        let lead = data
            .lead
            .sections
            .first()
            .map(|s| s.text.clone())
            .unwrap_or_default();

        let blocks = data
            .remaining
            .sections
            .iter()
            .filter_map(|record| {
                let title = record.line.clone().unwrap_or_default();
                match record.toclevel {
                    Some(level) => Some(ContentBlock::new(level, title, record.text.clone())),
                    None => {
                        tracing::warn!(
                            id = ?record.id,
                            title = %title,
                            "dropping section record without toclevel"
                        );
                        None
                    }
                }
            })
            .collect();

        Self { lead, blocks }
    }
}
