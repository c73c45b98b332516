// ABOUTME: The linear-to-tree section walk that nests heading-tagged blocks three levels deep.
// ABOUTME: Stops at the first trailing boilerplate title and applies the orphan and duplicate policies.

//! Section tree builder.
//!
//! Blocks arrive in document order, each tagged with a level. One forward
//! pass keeps track of the current section and subsection and hangs every
//! block under them:
//!
//! - level 1 opens a new section and closes the current subsection;
//! - level 2 opens a subsection under the current section;
//! - level 3 and deeper become plain-text entries of the current subsection.
//!
//! The first block whose title is in the stop set ends the walk, whatever its
//! level. A block with no parent to hang under is an orphan and is handled by
//! [`OrphanPolicy`]; a parent is never made up for it.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::blocks::ContentBlock;
use crate::error::ScrapeError;
use crate::extractors::text::extract_text;
use crate::options::{DuplicatePolicy, OrphanPolicy, TreeOptions};
use crate::result::{SectionNode, Sections, SubsectionNode};

/// Insert `value` under `key` according to the duplicate policy.
///
/// Overwrite replaces the value in place, so the key keeps its first position.
fn put<V>(map: &mut IndexMap<String, V>, key: &str, value: V, policy: DuplicatePolicy) {
    match map.entry(key.to_string()) {
        Entry::Occupied(mut e) => {
            if policy == DuplicatePolicy::Overwrite {
                e.insert(value);
            }
        }
        Entry::Vacant(e) => {
            e.insert(value);
        }
    }
}

fn orphan(
    index: usize,
    block: &ContentBlock,
    reason: &str,
    policy: OrphanPolicy,
) -> Result<(), ScrapeError> {
    match policy {
        OrphanPolicy::Skip => {
            tracing::warn!(
                index,
                level = block.level,
                title = %block.title,
                "skipping orphaned block: {}",
                reason
            );
            Ok(())
        }
        OrphanPolicy::Fail => Err(ScrapeError::structural(
            "",
            "BuildSections",
            Some(anyhow::anyhow!(
                "block {} {:?} (level {}): {}",
                index,
                block.title,
                block.level,
                reason
            )),
        )),
    }
}

/// Build the section tree from an ordered block stream.
///
/// Returns an error only under [`OrphanPolicy::Fail`], naming the first
/// orphaned block.
pub fn build_sections(blocks: &[ContentBlock], opts: &TreeOptions) -> Result<Sections, ScrapeError> {
    let mut sections = Sections::new();
    let mut current_section: Option<&str> = None;
    let mut current_subsection: Option<&str> = None;

    for (index, block) in blocks.iter().enumerate() {
        if opts.is_stop_title(&block.title) {
            tracing::debug!(index, title = %block.title, "stop title reached");
            break;
        }

        match block.level {
            0 => orphan(index, block, "level 0 is not a section level", opts.orphans)?,
            1 => {
                let node = SectionNode {
                    intro: extract_text(&block.text),
                    subsections: IndexMap::new(),
                };
                put(&mut sections, &block.title, node, opts.duplicates);
                current_section = Some(&block.title);
                current_subsection = None;
            }
            2 => {
                let Some(section) = current_section.and_then(|t| sections.get_mut(t)) else {
                    orphan(index, block, "subsection before any section", opts.orphans)?;
                    continue;
                };
                let node = SubsectionNode {
                    intro: extract_text(&block.text),
                    subsubsections: IndexMap::new(),
                };
                put(&mut section.subsections, &block.title, node, opts.duplicates);
                current_subsection = Some(&block.title);
            }
            _ => {
                let Some(section) = current_section.and_then(|t| sections.get_mut(t)) else {
                    orphan(index, block, "sub-subsection before any section", opts.orphans)?;
                    continue;
                };
                let Some(subsection) = current_subsection.and_then(|t| section.subsections.get_mut(t))
                else {
                    orphan(index, block, "sub-subsection before any subsection", opts.orphans)?;
                    continue;
                };
                put(
                    &mut subsection.subsubsections,
                    &block.title,
                    extract_text(&block.text),
                    opts.duplicates,
                );
            }
        }
    }

    Ok(sections)
}
