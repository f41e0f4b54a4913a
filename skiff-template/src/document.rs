//! Structured template document
//!
//! The base template is split once, at parse time, into an ordered list of
//! text sections and insertion points. Blocks are attached to their
//! insertion point instead of being spliced into the text, so inserting one
//! block never moves the position of another anchor.

use std::collections::BTreeSet;

use crate::anchor::Anchor;
use crate::error::{Result, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Text(String),
    Insertion { anchor: Anchor, blocks: Vec<String> },
}

/// Base template with its insertion points resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDocument {
    sections: Vec<Section>,
    declared: BTreeSet<String>,
}

impl TemplateDocument {
    /// Parses a base template
    ///
    /// Each anchor is located by its first occurrence; its insertion point is
    /// the start of the following line. Anchors absent from the source are
    /// not an error here; inserting at one is.
    ///
    /// The keys declared under the top-level `Parameters:` section are
    /// collected as well.
    pub fn parse(source: &str) -> Self {
        let mut points: Vec<(usize, Anchor)> = Anchor::ALL
            .iter()
            .filter_map(|anchor| insertion_offset(source, anchor.marker()).map(|o| (o, *anchor)))
            .collect();
        points.sort();

        let mut sections = Vec::with_capacity(points.len() * 2 + 1);
        let mut cursor = 0;

        for (offset, anchor) in points {
            sections.push(Section::Text(source[cursor..offset].to_string()));
            sections.push(Section::Insertion {
                anchor,
                blocks: Vec::new(),
            });
            cursor = offset;
        }
        sections.push(Section::Text(source[cursor..].to_string()));

        Self {
            sections,
            declared: declared_parameters(source),
        }
    }

    /// Whether the base template already declares this parameter
    pub fn declares(&self, key: &str) -> bool {
        self.declared.contains(key)
    }

    /// Parameter keys the base template declares, sorted
    pub fn declared_parameters(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    /// Whether the base template contains this anchor
    pub fn has_anchor(&self, anchor: Anchor) -> bool {
        self.sections
            .iter()
            .any(|s| matches!(s, Section::Insertion { anchor: a, .. } if *a == anchor))
    }

    /// Appends a block at an insertion point
    ///
    /// # Errors
    /// Returns [`TemplateError::MissingAnchor`] if the base template does not
    /// contain the anchor.
    pub fn insert(&mut self, anchor: Anchor, block: impl Into<String>) -> Result<()> {
        let blocks = self
            .sections
            .iter_mut()
            .find_map(|s| match s {
                Section::Insertion { anchor: a, blocks } if *a == anchor => Some(blocks),
                _ => None,
            })
            .ok_or(TemplateError::MissingAnchor(anchor))?;

        blocks.push(block.into());
        Ok(())
    }

    /// Number of blocks inserted at an anchor
    pub fn block_count(&self, anchor: Anchor) -> usize {
        self.sections
            .iter()
            .map(|s| match s {
                Section::Insertion { anchor: a, blocks } if *a == anchor => blocks.len(),
                _ => 0,
            })
            .sum()
    }

    /// Produces the final template text
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            match section {
                Section::Text(text) => out.push_str(text),
                Section::Insertion { blocks, .. } => {
                    for block in blocks {
                        out.push_str(block);
                    }
                }
            }
        }
        out
    }
}

/// Keys of the top-level `Parameters:` mapping
///
/// Only entries at the mapping's own indentation count; their nested
/// `Type:`/`Default:` lines are deeper and skipped.
fn declared_parameters(source: &str) -> BTreeSet<String> {
    let mut declared = BTreeSet::new();
    let mut lines = source
        .lines()
        .skip_while(|line| line.trim_end() != "Parameters:")
        .skip(1);
    let mut indent = None;

    for line in lines.by_ref() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let depth = line.len() - trimmed.len();
        if depth == 0 {
            break;
        }
        if *indent.get_or_insert(depth) != depth {
            continue;
        }

        if let Some(key) = trimmed.trim_end().strip_suffix(':') {
            declared.insert(key.to_string());
        }
    }
    declared
}

fn insertion_offset(source: &str, marker: &str) -> Option<usize> {
    let after = source.find(marker)? + marker.len();
    Some(match source[after..].find('\n') {
        Some(newline) => after + newline + 1,
        None => source.len(),
    })
}
