//! Draft and assembled documents
//!
//! A [`DraftDocument`] is the flat block stream produced by parsing. A
//! [`Document`] is the assembled result handed to renderers: sections nest
//! their content, every section carries an id, and footnotes are numbered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attributes::DocumentAttributes;
use crate::block::{Block, Section};
use crate::inline::{Footnote, Inline};

/// Element id → title, for cross-reference rendering
pub type ElementReferences = BTreeMap<String, Vec<Inline>>;

/// Footnote ref name → footnote registered under that name
pub type FootnoteReferences = BTreeMap<String, Footnote>;

/// Unassembled parser output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftDocument {
    pub blocks: Vec<Block>,
}

impl DraftDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Add a block to the draft
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Index of the first block that is not part of the document header.
    ///
    /// Leading blank lines are skipped. The header is then an optional
    /// level-0 title section followed by attribute declarations and resets.
    /// Any other block ends it, including a blank line between declarations.
    pub fn header_end(&self) -> usize {
        let mut blocks = self
            .blocks
            .iter()
            .enumerate()
            .skip_while(|(_, block)| matches!(block, Block::BlankLine))
            .peekable();
        if matches!(blocks.peek(), Some((_, Block::Section(title))) if title.level == 0) {
            blocks.next();
        }
        for (index, block) in blocks {
            match block {
                Block::AttributeDeclaration(_) | Block::AttributeReset(_) => {}
                _ => return index,
            }
        }
        self.blocks.len()
    }

    /// Attributes declared in the document header
    pub fn document_attributes(&self) -> DocumentAttributes {
        let mut attributes = DocumentAttributes::new();
        for block in &self.blocks[..self.header_end()] {
            match block {
                Block::AttributeDeclaration(decl) => attributes.set(&decl.name, &decl.value),
                Block::AttributeReset(reset) => {
                    attributes.reset(&reset.name);
                }
                _ => {}
            }
        }
        attributes
    }
}

/// A complete, assembled document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Attributes declared in the document header
    pub attributes: DocumentAttributes,
    /// Top-level elements
    pub elements: Vec<Block>,
    pub element_references: ElementReferences,
    /// Footnote definitions, in document order
    pub footnotes: Vec<Footnote>,
    pub footnote_references: FootnoteReferences,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the document is empty (no elements)
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of top-level elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// The document title, if the first element is a level-0 section
    pub fn title(&self) -> Option<&[Inline]> {
        match self.elements.first() {
            Some(Block::Section(section)) if section.level == 0 => Some(&section.title),
            _ => None,
        }
    }

    /// Top-level sections
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.elements.iter().filter_map(Block::as_section)
    }

    /// The definition a footnote occurrence points at.
    ///
    /// Named occurrences resolve through `footnote_references` (the result
    /// may be a dangling entry without content); anonymous ones are their own
    /// definition.
    pub fn footnote_definition<'a>(&'a self, occurrence: &'a Footnote) -> Option<&'a Footnote> {
        match &occurrence.ref_name {
            Some(name) => self.footnote_references.get(name),
            None => self.footnotes.iter().find(|f| f.id == occurrence.id),
        }
    }

    /// Whether a ref name was only ever referenced, never defined
    pub fn is_dangling_footnote_ref(&self, name: &str) -> bool {
        self.footnote_references
            .get(name)
            .is_some_and(|f| !f.has_content())
    }
}
