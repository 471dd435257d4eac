//! Document assembly
//!
//! Turns the flat block stream of a [`DraftDocument`] into a [`Document`]:
//!
//! - sections nest by level, and content moves into the section it follows
//! - every section gets a unique id, recorded with its title
//! - footnotes are numbered and collected in document order
//! - header attribute declarations become the document attributes
//!
//! A section is only attached to its parent once a sibling or shallower
//! section (or the end of input) closes it, the same way nested lists are
//! built.
//!
//! # Example
//!
//! ```
//! use stitchdoc_core::{assemble, draft};
//!
//! let draft = draft::parse("= Title\n\n== One\n\nText\n\n== Two").unwrap();
//! let doc = assemble(draft).unwrap();
//!
//! let root = doc.sections().next().unwrap();
//! assert_eq!(root.subsections().count(), 2);
//! assert!(doc.element_references.contains_key("_one"));
//! ```

use stitchdoc_ast::{
    Block, Document, DocumentAttributes, DraftDocument, FootnoteReferences, Section,
};
use tracing::debug;

use crate::config::AssemblyConfig;
use crate::error::Result;
use crate::footnotes::FootnoteCollector;
use crate::references::ReferenceRegistry;

/// Assembles draft documents
///
/// The reference registry and footnote numbering are reset at the start of
/// every [`assemble`](Assembler::assemble) call; separate assemblers can run
/// on separate threads.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    registry: ReferenceRegistry,
    footnotes: FootnoteCollector,
}

impl Assembler {
    pub fn new(config: AssemblyConfig) -> Self {
        Self {
            registry: ReferenceRegistry::new(config),
            footnotes: FootnoteCollector::new(),
        }
    }

    /// Assemble one document
    ///
    /// # Errors
    ///
    /// Fails if collecting footnotes fails; no partial document is returned.
    pub fn assemble(&mut self, draft: DraftDocument) -> Result<Document> {
        self.registry.reset();
        self.footnotes.reset();

        let attributes = draft.document_attributes();
        let header_end = draft.header_end();
        // Declarations after the header still change the prefix of later ids
        let mut running = attributes.clone();
        let mut tree = SectionTree::default();
        let mut footnotes = Vec::new();
        let mut footnote_references = FootnoteReferences::new();

        debug!("rearranging sections in {} blocks", draft.blocks.len());
        for (index, mut block) in draft.blocks.into_iter().enumerate() {
            let collected = self.footnotes.collect(&mut block)?;
            footnotes.extend(collected.footnotes);
            footnote_references.extend(collected.references);

            match block {
                Block::Section(section) => {
                    let section = self.identify(section, &running);
                    tree.open(section);
                }
                Block::BlankLine => {}
                Block::AttributeDeclaration(decl) => {
                    running.set(&decl.name, &decl.value);
                    if index >= header_end {
                        tree.append(Block::AttributeDeclaration(decl));
                    }
                }
                Block::AttributeReset(reset) => {
                    running.reset(&reset.name);
                    if index >= header_end {
                        tree.append(Block::AttributeReset(reset));
                    }
                }
                other => tree.append(other),
            }
        }

        Ok(Document {
            attributes,
            elements: tree.finish(),
            element_references: self.registry.take_references(),
            footnotes,
            footnote_references,
        })
    }

    fn identify(&mut self, mut section: Section, attrs: &DocumentAttributes) -> Section {
        let id = self
            .registry
            .resolve_id(&section.attributes, &section.title, attrs);
        section.attributes.set_id(id);
        section
    }
}

/// Assemble with the default configuration
pub fn assemble(draft: DraftDocument) -> Result<Document> {
    Assembler::default().assemble(draft)
}

/// Top-level elements plus the path of open sections, shallowest first.
///
/// Levels along the path strictly increase.
#[derive(Debug, Default)]
struct SectionTree {
    elements: Vec<Block>,
    path: Vec<Section>,
}

impl SectionTree {
    fn open(&mut self, section: Section) {
        match self.path.last() {
            None => {
                debug!(level = section.level, "section opens a new top-level element");
            }
            Some(deepest) if section.level > deepest.level => {
                debug!(
                    level = section.level,
                    parent = deepest.level,
                    "section nests under the current section"
                );
            }
            Some(_) => self.prune(section.level),
        }
        self.path.push(section);
    }

    /// Add a non-section block to the deepest open section
    fn append(&mut self, block: Block) {
        match self.path.last_mut() {
            Some(section) => section.children.push(block),
            None => self.elements.push(block),
        }
    }

    /// Close every open section at `level` or deeper, moving each into its
    /// parent. A root that closes becomes a completed top-level element.
    fn prune(&mut self, level: u8) {
        debug!("pruning the section path with {} level(s) of depth", self.path.len());
        while self.path.last().is_some_and(|deepest| deepest.level >= level) {
            let Some(section) = self.path.pop() else {
                break;
            };
            match self.path.last_mut() {
                Some(parent) => parent.children.push(Block::Section(section)),
                None => {
                    debug!(level = section.level, "moving section to the top-level elements");
                    self.elements.push(Block::Section(section));
                }
            }
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.prune(1);
        if let Some(root) = self.path.pop() {
            self.elements.push(Block::Section(root));
        }
        self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitchdoc_ast::{AttributeDeclaration, ElementAttributes, Inline, Paragraph};

    fn section(level: u8, title: &str) -> Block {
        Block::Section(Section::new(level, vec![Inline::text(title)]))
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph(Paragraph::new(vec![vec![Inline::text(text)]]))
    }

    fn titles(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .map(|block| match block {
                Block::Section(s) => match s.title.first() {
                    Some(Inline::Text(t)) => t.clone(),
                    _ => String::new(),
                },
                Block::Paragraph(p) => match p.lines.first().and_then(|l| l.first()) {
                    Some(Inline::Text(t)) => format!("p:{}", t),
                    _ => "p".to_string(),
                },
                other => format!("{:?}", other),
            })
            .collect()
    }

    fn as_section(block: &Block) -> &Section {
        block.as_section().expect("Expected section")
    }

    #[test]
    fn test_no_sections_keeps_order() {
        let doc = assemble(DraftDocument::new(vec![
            paragraph("a"),
            Block::BlankLine,
            paragraph("b"),
        ]))
        .unwrap();
        assert_eq!(titles(&doc.elements), vec!["p:a", "p:b"]);
        assert!(doc.element_references.is_empty());
    }

    #[test]
    fn test_two_level_zero_sections_are_siblings() {
        let doc = assemble(DraftDocument::new(vec![
            section(0, "a"),
            section(0, "b"),
        ]))
        .unwrap();
        assert_eq!(titles(&doc.elements), vec!["a", "b"]);
        assert!(as_section(&doc.elements[0]).children.is_empty());
    }

    #[test]
    fn test_levels_1_2_3_2() {
        let doc = assemble(DraftDocument::new(vec![
            section(1, "s1"),
            paragraph("in s1"),
            section(2, "s2a"),
            section(3, "s3"),
            paragraph("in s3"),
            section(2, "s2b"),
        ]))
        .unwrap();

        assert_eq!(doc.len(), 1);
        let s1 = as_section(&doc.elements[0]);
        assert_eq!(titles(&s1.children), vec!["p:in s1", "s2a", "s2b"]);
        let s2a = as_section(&s1.children[1]);
        assert_eq!(titles(&s2a.children), vec!["s3"]);
        assert_eq!(titles(&as_section(&s2a.children[0]).children), vec!["p:in s3"]);
    }

    #[test]
    fn test_shallower_section_closes_root() {
        let doc = assemble(DraftDocument::new(vec![
            section(2, "deep"),
            section(1, "shallow"),
            section(2, "child"),
        ]))
        .unwrap();
        assert_eq!(titles(&doc.elements), vec!["deep", "shallow"]);
        assert_eq!(titles(&as_section(&doc.elements[1]).children), vec!["child"]);
    }

    #[test]
    fn test_content_before_first_section_stays_top_level() {
        let doc = assemble(DraftDocument::new(vec![
            paragraph("preamble"),
            section(1, "s1"),
            paragraph("body"),
        ]))
        .unwrap();
        assert_eq!(titles(&doc.elements), vec!["p:preamble", "s1"]);
    }

    #[test]
    fn test_ids_follow_document_order() {
        let doc = assemble(DraftDocument::new(vec![
            section(1, "dup"),
            section(2, "dup"),
            section(1, "dup"),
        ]))
        .unwrap();
        let first = as_section(&doc.elements[0]);
        assert_eq!(first.id(), Some("_dup"));
        assert_eq!(as_section(&first.children[0]).id(), Some("_dup_2"));
        assert_eq!(as_section(&doc.elements[1]).id(), Some("_dup_3"));
    }

    #[test]
    fn test_running_id_prefix() {
        let doc = assemble(DraftDocument::new(vec![
            section(0, "a header"),
            Block::BlankLine,
            Block::AttributeDeclaration(AttributeDeclaration::new("idprefix", "custom1a_")),
            Block::BlankLine,
            section(1, "section 1a"),
            Block::BlankLine,
            Block::AttributeDeclaration(AttributeDeclaration::new("idprefix", "custom1b_")),
            Block::BlankLine,
            section(1, "section 1b"),
        ]))
        .unwrap();

        assert!(doc.attributes.is_empty());
        let keys: Vec<_> = doc.element_references.keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["_a_header", "custom1a_section_1a", "custom1b_section_1b"]
        );
    }

    #[test]
    fn test_header_declarations_are_consumed() {
        let doc = assemble(DraftDocument::new(vec![
            section(0, "a header"),
            Block::AttributeDeclaration(AttributeDeclaration::new("idprefix", "custom_")),
            Block::BlankLine,
            section(1, "section 1"),
        ]))
        .unwrap();

        assert_eq!(doc.attributes.get("idprefix"), Some("custom_"));
        let root = as_section(&doc.elements[0]);
        assert_eq!(root.id(), Some("custom_a_header"));
        assert_eq!(titles(&root.children), vec!["section 1"]);
    }

    #[test]
    fn test_custom_id_kept() {
        let mut custom = Section::new(1, vec![Inline::text("Intro")]);
        custom.attributes = ElementAttributes::with_custom_id("intro");
        let doc = assemble(DraftDocument::new(vec![Block::Section(custom)])).unwrap();
        let intro = as_section(&doc.elements[0]);
        assert_eq!(intro.id(), Some("intro"));
        assert!(intro.attributes.has_custom_id());
    }

    #[test]
    fn test_assembler_is_reusable() {
        let mut assembler = Assembler::default();
        let draft = DraftDocument::new(vec![section(1, "same")]);
        let first = assembler.assemble(draft.clone()).unwrap();
        let second = assembler.assemble(draft).unwrap();
        assert_eq!(first, second);
    }
}
