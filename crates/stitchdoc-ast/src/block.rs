//! Block-level elements for document structure
//!
//! This module defines the closed set of blocks a parser emits, such as
//! sections, paragraphs, lists and attribute declarations. Sections arrive
//! flat; their `children` are filled in when the document is assembled.

use serde::{Deserialize, Serialize};

use crate::attributes::ElementAttributes;
use crate::inline::Inline;

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A section heading and, once assembled, its content
    Section(Section),
    /// A paragraph of text
    Paragraph(Paragraph),
    /// An ordered or unordered list
    List(List),
    /// An empty line separating blocks
    BlankLine,
    /// A literal block
    Literal(LiteralBlock),
    /// A block macro, `name::value[attributes]`
    UserMacro(UserMacro),
    /// `:name: value`
    AttributeDeclaration(AttributeDeclaration),
    /// `:name!:`
    AttributeReset(AttributeReset),
    /// An admonition block (note, warning, etc.)
    Admonition(Admonition),
}

impl Block {
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Block::Section(section) => Some(section),
            _ => None,
        }
    }
}

/// A section heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading level (0 is the document title)
    pub level: u8,
    /// Heading text content
    pub title: Vec<Inline>,
    pub attributes: ElementAttributes,
    /// Nested blocks, including subsections
    pub children: Vec<Block>,
}

impl Section {
    /// A section with no attributes and no children yet
    pub fn new(level: u8, title: Vec<Inline>) -> Self {
        Self {
            level,
            title,
            attributes: ElementAttributes::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes.id()
    }

    /// Direct subsections, in order
    pub fn subsections(&self) -> impl Iterator<Item = &Section> {
        self.children.iter().filter_map(Block::as_section)
    }
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub attributes: ElementAttributes,
    /// Source lines, each a sequence of inline elements
    pub lines: Vec<Vec<Inline>>,
}

impl Paragraph {
    pub fn new(lines: Vec<Vec<Inline>>) -> Self {
        Self {
            attributes: ElementAttributes::new(),
            lines,
        }
    }
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Type of list
    pub list_type: ListType,
    /// List items
    pub items: Vec<ListItem>,
    pub attributes: ElementAttributes,
}

/// List type variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListType {
    /// Unordered/bullet list
    Unordered,
    /// Ordered/numbered list
    Ordered,
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Nesting level (0-based)
    pub level: u8,
    /// Item text
    pub text: Vec<Inline>,
    /// Blocks attached to the item
    pub content: Vec<Block>,
}

/// A literal block (`....`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralBlock {
    pub attributes: ElementAttributes,
    /// The literal content, verbatim
    pub lines: Vec<String>,
}

/// A block macro, e.g. `toc::[]` or `video::intro.mp4[width=640]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMacro {
    pub name: String,
    pub value: String,
    pub attributes: ElementAttributes,
}

/// A document attribute declaration, `:name: value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDeclaration {
    pub name: String,
    pub value: String,
}

impl AttributeDeclaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A document attribute reset, `:name!:`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeReset {
    pub name: String,
}

/// An admonition block (note, warning, tip, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admonition {
    /// Type of admonition
    pub admonition_type: AdmonitionType,
    /// Admonition content
    pub content: Vec<Block>,
    pub attributes: ElementAttributes,
}

/// Admonition type variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmonitionType {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionType {
    /// Parse the `NOTE`, `TIP`, ... label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "NOTE" => Some(Self::Note),
            "TIP" => Some(Self::Tip),
            "IMPORTANT" => Some(Self::Important),
            "WARNING" => Some(Self::Warning),
            "CAUTION" => Some(Self::Caution),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_default() {
        let para = Paragraph::default();
        assert!(para.lines.is_empty());
        assert!(para.attributes.is_empty());
    }

    #[test]
    fn test_section_levels() {
        let title = Section::new(0, vec![Inline::text("Title")]);
        assert_eq!(title.level, 0);
        assert!(title.children.is_empty());
        assert_eq!(title.id(), None);
    }

    #[test]
    fn test_subsections_skip_other_blocks() {
        let mut section = Section::new(1, vec![Inline::text("Parent")]);
        section.children.push(Block::Paragraph(Paragraph::default()));
        section
            .children
            .push(Block::Section(Section::new(2, vec![Inline::text("Child")])));

        let subsections: Vec<_> = section.subsections().collect();
        assert_eq!(subsections.len(), 1);
        assert_eq!(subsections[0].level, 2);
    }

    #[test]
    fn test_admonition_labels() {
        assert_eq!(AdmonitionType::from_label("TIP"), Some(AdmonitionType::Tip));
        assert_eq!(AdmonitionType::from_label("tip"), None);
    }
}
