//! stitchdoc-ast - Document model definitions
//!
//! This crate provides the types shared by the stitchdoc pipeline: the flat
//! blocks produced by parsing, the inline spans inside them, element and
//! document attributes, locations, and the final assembled [`Document`].

pub mod attributes;
pub mod block;
pub mod document;
pub mod inline;
pub mod location;

pub use attributes::{
    DocumentAttributes, ElementAttributes, ATTR_CUSTOM_ID, ATTR_ID, ATTR_ID_PREFIX,
    ATTR_IMAGES_DIR, ATTR_ROLE, ATTR_TITLE,
};
pub use block::{
    Admonition, AdmonitionType, AttributeDeclaration, AttributeReset, Block, List, ListItem,
    ListType, LiteralBlock, Paragraph, Section, UserMacro,
};
pub use document::{Document, DraftDocument, ElementReferences, FootnoteReferences};
pub use inline::{Footnote, FormatType, Inline, InlineUserMacro, Link};
pub use location::{Location, LocationElement};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
