//! Inline elements for document content
//!
//! This module defines inline-level elements that appear within blocks and
//! section titles, such as text, formatting, links and footnotes.

use serde::{Deserialize, Serialize};

use crate::attributes::ElementAttributes;
use crate::location::Location;

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    /// Plain text content
    Text(String),
    /// Formatted content (bold, italic, etc.)
    Format(FormatType, Vec<Inline>),
    /// A hyperlink
    Link(Link),
    /// An attribute placeholder, `{name}`
    AttributeSubstitution(String),
    /// A `footnote:[]` or `footnoteref:[]` occurrence
    Footnote(Footnote),
    /// An inline user macro, `name:value[attributes]`
    UserMacro(InlineUserMacro),
    /// A line break
    Break,
}

impl Inline {
    /// Shorthand for a plain text span
    pub fn text(content: impl Into<String>) -> Self {
        Inline::Text(content.into())
    }
}

/// Text formatting types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatType {
    /// Bold text
    Bold,
    /// Italic text
    Italic,
    /// Monospace/code text
    Monospace,
    /// Superscript text
    Superscript,
    /// Subscript text
    Subscript,
}

/// A hyperlink element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The link target
    pub location: Location,
    /// The link label, empty when the target is shown as-is
    pub text: Vec<Inline>,
}

/// A footnote occurrence
///
/// The parser leaves `id` unset; ids are assigned in document order when
/// the document is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    pub id: Option<u32>,
    /// Name given with `footnoteref:[name,...]`
    pub ref_name: Option<String>,
    pub elements: Vec<Inline>,
}

impl Footnote {
    /// `footnote:[content]`
    pub fn new(elements: Vec<Inline>) -> Self {
        Self {
            id: None,
            ref_name: None,
            elements,
        }
    }

    /// `footnoteref:[name,content]`
    pub fn with_ref(ref_name: impl Into<String>, elements: Vec<Inline>) -> Self {
        Self {
            id: None,
            ref_name: Some(ref_name.into()),
            elements,
        }
    }

    /// `footnoteref:[name]`
    pub fn reference(ref_name: impl Into<String>) -> Self {
        Self::with_ref(ref_name, Vec::new())
    }

    pub fn has_content(&self) -> bool {
        !self.elements.is_empty()
    }
}

/// An inline user macro, e.g. `kbd:Ctrl[alt=yes]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineUserMacro {
    pub name: String,
    pub value: String,
    pub attributes: ElementAttributes,
}
