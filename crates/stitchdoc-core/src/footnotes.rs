//! Footnote collection and numbering
//!
//! Every `footnote:[]` / `footnoteref:[]` occurrence gets the next number
//! from a [`FootnoteSequence`], in document order. Occurrences with content
//! are definitions and are listed in the document footnotes. A
//! `footnoteref:[name]` without content points back at the definition
//! registered under `name`; if there is none yet it is registered as a
//! dangling reference (no content) until a definition shows up.

use std::collections::HashMap;

use stitchdoc_ast::{Block, Footnote, FootnoteReferences, Inline};
use tracing::{debug, trace};

use crate::error::FootnoteError;

/// Sequential footnote numbers, starting at 0
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FootnoteSequence {
    next: u32,
}

impl FootnoteSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next number
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u32 {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefState {
    Defined,
    Dangling,
}

/// Footnotes found in one block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedFootnotes {
    /// New definitions, in document order
    pub footnotes: Vec<Footnote>,
    /// Ref names registered by this block
    pub references: FootnoteReferences,
}

/// Walks blocks, numbering footnotes and tracking ref names across one
/// assembly pass
#[derive(Debug, Clone, Default)]
pub struct FootnoteCollector {
    sequence: FootnoteSequence,
    refs: HashMap<String, RefState>,
}

impl FootnoteCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering from an existing sequence
    pub fn with_sequence(sequence: FootnoteSequence) -> Self {
        Self {
            sequence,
            refs: HashMap::new(),
        }
    }

    /// Restart numbering at 0 and forget every ref name
    pub fn reset(&mut self) {
        self.sequence.reset();
        self.refs.clear();
    }

    pub fn sequence(&self) -> &FootnoteSequence {
        &self.sequence
    }

    /// Number the footnotes of `block` (pre-order) and return the
    /// definitions and ref registrations it contributes.
    pub fn collect(&mut self, block: &mut Block) -> Result<CollectedFootnotes, FootnoteError> {
        let mut collected = CollectedFootnotes::default();
        self.walk_block(block, &mut collected)?;
        Ok(collected)
    }

    /// Same as [`collect`](Self::collect), for inline content
    pub fn collect_inlines(
        &mut self,
        inlines: &mut [Inline],
    ) -> Result<CollectedFootnotes, FootnoteError> {
        let mut collected = CollectedFootnotes::default();
        self.walk_inlines(inlines, &mut collected)?;
        Ok(collected)
    }

    fn walk_block(
        &mut self,
        block: &mut Block,
        collected: &mut CollectedFootnotes,
    ) -> Result<(), FootnoteError> {
        match block {
            Block::Section(section) => {
                self.walk_inlines(&mut section.title, collected)?;
                for child in &mut section.children {
                    self.walk_block(child, collected)?;
                }
            }
            Block::Paragraph(paragraph) => {
                for line in &mut paragraph.lines {
                    self.walk_inlines(line, collected)?;
                }
            }
            Block::List(list) => {
                for item in &mut list.items {
                    self.walk_inlines(&mut item.text, collected)?;
                    for child in &mut item.content {
                        self.walk_block(child, collected)?;
                    }
                }
            }
            Block::Admonition(admonition) => {
                for child in &mut admonition.content {
                    self.walk_block(child, collected)?;
                }
            }
            Block::BlankLine
            | Block::Literal(_)
            | Block::UserMacro(_)
            | Block::AttributeDeclaration(_)
            | Block::AttributeReset(_) => {}
        }
        Ok(())
    }

    fn walk_inlines(
        &mut self,
        inlines: &mut [Inline],
        collected: &mut CollectedFootnotes,
    ) -> Result<(), FootnoteError> {
        for inline in inlines {
            match inline {
                Inline::Format(_, inner) => self.walk_inlines(inner, collected)?,
                Inline::Link(link) => self.walk_inlines(&mut link.text, collected)?,
                Inline::Footnote(note) => self.register(note, collected)?,
                Inline::Text(_)
                | Inline::AttributeSubstitution(_)
                | Inline::UserMacro(_)
                | Inline::Break => {}
            }
        }
        Ok(())
    }

    fn register(
        &mut self,
        note: &mut Footnote,
        collected: &mut CollectedFootnotes,
    ) -> Result<(), FootnoteError> {
        let id = self.sequence.next_id();
        note.id = Some(id);
        if contains_footnote(&note.elements) {
            return Err(FootnoteError::Nested { outer: id });
        }

        let Some(name) = note.ref_name.clone() else {
            trace!(id, "footnote definition");
            collected.footnotes.push(note.clone());
            return Ok(());
        };
        if name.is_empty() {
            return Err(FootnoteError::EmptyReference { id });
        }

        match (self.refs.get(&name).copied(), note.has_content()) {
            (Some(RefState::Defined), has_content) => {
                if has_content {
                    debug!(id, name = name.as_str(), "ignoring content of already defined footnote");
                    note.elements.clear();
                }
            }
            (_, true) => {
                trace!(id, name = name.as_str(), "named footnote definition");
                collected.footnotes.push(note.clone());
                collected.references.insert(name.clone(), note.clone());
                self.refs.insert(name, RefState::Defined);
            }
            (Some(RefState::Dangling), false) => {}
            (None, false) => {
                debug!(id, name = name.as_str(), "footnote reference to unknown name");
                collected.references.insert(name.clone(), note.clone());
                self.refs.insert(name, RefState::Dangling);
            }
        }
        Ok(())
    }
}

fn contains_footnote(inlines: &[Inline]) -> bool {
    inlines.iter().any(|inline| match inline {
        Inline::Footnote(_) => true,
        Inline::Format(_, inner) => contains_footnote(inner),
        Inline::Link(link) => contains_footnote(&link.text),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitchdoc_ast::{FormatType, Paragraph};

    fn paragraph(line: Vec<Inline>) -> Block {
        Block::Paragraph(Paragraph::new(vec![line]))
    }

    fn footnotes_of(block: &Block) -> Vec<Footnote> {
        let Block::Paragraph(paragraph) = block else {
            panic!("Expected paragraph");
        };
        paragraph
            .lines
            .iter()
            .flatten()
            .filter_map(|inline| match inline {
                Inline::Footnote(note) => Some(note.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sequence_reset() {
        let mut sequence = FootnoteSequence::new();
        assert_eq!(sequence.next_id(), 0);
        assert_eq!(sequence.next_id(), 1);
        assert_eq!(sequence.issued(), 2);
        sequence.reset();
        assert_eq!(sequence.next_id(), 0);
    }

    #[test]
    fn test_independent_footnotes() {
        let mut collector = FootnoteCollector::new();
        let mut block = paragraph(vec![
            Inline::Footnote(Footnote::new(vec![Inline::text("x")])),
            Inline::Footnote(Footnote::new(vec![Inline::text("x")])),
        ]);
        let collected = collector.collect(&mut block).unwrap();

        let ids: Vec<_> = collected.footnotes.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![Some(0), Some(1)]);
        assert!(collected.references.is_empty());
    }

    #[test]
    fn test_footnoteref_reuse() {
        let mut collector = FootnoteCollector::new();
        let mut block = paragraph(vec![
            Inline::text("foo "),
            Inline::Footnote(Footnote::with_ref("ref", vec![Inline::text("some content")])),
            Inline::text(" and "),
            Inline::Footnote(Footnote::reference("ref")),
        ]);
        let collected = collector.collect(&mut block).unwrap();

        let notes = footnotes_of(&block);
        assert_eq!(notes[0].id, Some(0));
        assert_eq!(notes[1].id, Some(1));
        assert_eq!(notes[1].ref_name.as_deref(), Some("ref"));
        assert!(notes[1].elements.is_empty());

        assert_eq!(collected.footnotes, vec![notes[0].clone()]);
        assert_eq!(collected.references.get("ref"), Some(&notes[0]));
    }

    #[test]
    fn test_unknown_ref_is_dangling() {
        let mut collector = FootnoteCollector::new();
        let mut block = paragraph(vec![
            Inline::Footnote(Footnote::with_ref("ref", vec![Inline::text("content")])),
            Inline::Footnote(Footnote::reference("ref2")),
        ]);
        let collected = collector.collect(&mut block).unwrap();

        assert_eq!(collected.footnotes.len(), 1);
        let dangling = &collected.references["ref2"];
        assert_eq!(dangling.id, Some(1));
        assert!(!dangling.has_content());
    }

    #[test]
    fn test_definition_after_dangling_reference() {
        let mut collector = FootnoteCollector::new();
        let mut first = paragraph(vec![Inline::Footnote(Footnote::reference("late"))]);
        let mut second = paragraph(vec![Inline::Footnote(Footnote::with_ref(
            "late",
            vec![Inline::text("finally")],
        ))]);

        let dangling = collector.collect(&mut first).unwrap();
        let defined = collector.collect(&mut second).unwrap();

        assert!(dangling.footnotes.is_empty());
        assert!(!dangling.references["late"].has_content());
        assert_eq!(defined.footnotes.len(), 1);
        assert_eq!(defined.references["late"].id, Some(1));
    }

    #[test]
    fn test_refs_span_blocks() {
        let mut collector = FootnoteCollector::new();
        let mut first = paragraph(vec![Inline::Footnote(Footnote::with_ref(
            "r",
            vec![Inline::text("c")],
        ))]);
        let mut second = paragraph(vec![Inline::Footnote(Footnote::with_ref(
            "r",
            vec![Inline::text("again")],
        ))]);
        collector.collect(&mut first).unwrap();
        let collected = collector.collect(&mut second).unwrap();

        assert!(collected.footnotes.is_empty());
        assert!(collected.references.is_empty());
        assert!(footnotes_of(&second)[0].elements.is_empty());
    }

    #[test]
    fn test_footnotes_inside_formatting() {
        let mut collector = FootnoteCollector::new();
        let mut inlines = vec![Inline::Format(
            FormatType::Italic,
            vec![Inline::Footnote(Footnote::new(vec![Inline::text("deep")]))],
        )];
        let collected = collector.collect_inlines(&mut inlines).unwrap();
        assert_eq!(collected.footnotes.len(), 1);
    }

    #[test]
    fn test_nested_footnote_fails() {
        let mut collector = FootnoteCollector::new();
        let mut block = paragraph(vec![Inline::Footnote(Footnote::new(vec![
            Inline::text("outer"),
            Inline::Footnote(Footnote::new(vec![Inline::text("inner")])),
        ]))]);
        let err = collector.collect(&mut block).unwrap_err();
        assert_eq!(err, FootnoteError::Nested { outer: 0 });
    }

    #[test]
    fn test_empty_ref_name_fails() {
        let mut collector = FootnoteCollector::new();
        let mut block = paragraph(vec![Inline::Footnote(Footnote::reference(""))]);
        assert_eq!(
            collector.collect(&mut block).unwrap_err(),
            FootnoteError::EmptyReference { id: 0 }
        );
    }

    #[test]
    fn test_with_sequence_continues_numbering() {
        let mut sequence = FootnoteSequence::new();
        sequence.next_id();
        let mut collector = FootnoteCollector::with_sequence(sequence);
        let mut inlines = vec![Inline::Footnote(Footnote::new(vec![Inline::text("a")]))];
        let collected = collector.collect_inlines(&mut inlines).unwrap();
        assert_eq!(collected.footnotes[0].id, Some(1));

        collector.reset();
        assert_eq!(collector.sequence().issued(), 0);
    }
}
