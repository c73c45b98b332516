// ABOUTME: PageData and the typed section tree nodes produced by a scrape.
// ABOUTME: Images and references serialize as 1-indexed JSON objects; every map keeps insertion order.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Top-level sections keyed by title.
pub type Sections = IndexMap<String, SectionNode>;

/// One top-level section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNode {
    pub intro: String,
    pub subsections: IndexMap<String, SubsectionNode>,
}

/// One subsection; its children are plain text keyed by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionNode {
    pub intro: String,
    pub subsubsections: IndexMap<String, String>,
}

/// An ordered list that external consumers address from 1.
///
/// Serializes as `{"1": a, "2": b, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Numbered(pub Vec<String>);

impl Numbered {
    /// Look an entry up by its 1-based number.
    pub fn get(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries paired with their 1-based numbers.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().enumerate().map(|(i, s)| (i + 1, s.as_str()))
    }
}

impl From<Vec<String>> for Numbered {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl Serialize for Numbered {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (n, item) in self.iter() {
            map.serialize_entry(&n.to_string(), item)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Numbered {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = IndexMap::<String, String>::deserialize(deserializer)?;
        let mut entries: Vec<(usize, String)> = map
            .into_iter()
            .map(|(k, v)| {
                k.parse::<usize>()
                    .map(|n| (n, v))
                    .map_err(|_| serde::de::Error::custom(format!("non-numeric key {:?}", k)))
            })
            .collect::<Result<_, _>>()?;
        entries.sort_by_key(|(n, _)| *n);
        Ok(Self(entries.into_iter().map(|(_, v)| v).collect()))
    }
}

/// The result of scraping one article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    pub title: String,
    pub description: String,
    pub intro: String,
    pub sections: Sections,
    pub images: Numbered,
    pub references: Numbered,
}

impl PageData {
    /// Returns true if nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.intro.is_empty()
            && self.sections.is_empty()
            && self.images.is_empty()
            && self.references.is_empty()
    }

    /// Total number of nodes in the section tree, all levels counted.
    pub fn section_count(&self) -> usize {
        self.sections
            .values()
            .map(|s| {
                1 + s
                    .subsections
                    .values()
                    .map(|sub| 1 + sub.subsubsections.len())
                    .sum::<usize>()
            })
            .sum()
    }
}
