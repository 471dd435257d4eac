//! stitchdoc-core - Document assembly
//!
//! Turns the flat block stream produced by parsing into a structured
//! document: nested sections with unique ids, numbered footnotes, document
//! attributes, plus the range matching and location resolution used by
//! include directives.
//!
//! # Example
//!
//! ```
//! use stitchdoc_core::{assemble, draft};
//!
//! let text = "= Manual\n\n== Intro\n\nHello footnote:[A note.]\n\n=== Details";
//! let doc = assemble(draft::parse(text)?)?;
//!
//! let root = doc.sections().next().unwrap();
//! assert_eq!(root.id(), Some("_manual"));
//! assert_eq!(doc.footnotes.len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod assembler;
pub mod config;
pub mod draft;
pub mod error;
pub mod footnotes;
pub mod include;
pub mod location;
pub mod ranges;
pub mod references;

// Re-export main types and functions
pub use assembler::{assemble, Assembler};
pub use config::AssemblyConfig;
pub use error::{AssemblyError, ConfigError, FootnoteError, RangeError, Result};
pub use footnotes::{CollectedFootnotes, FootnoteCollector, FootnoteSequence};
pub use include::IncludeDirective;
pub use location::{parse_location, resolve_location, LocationResolver};
pub use ranges::{
    CurrentRanges, CurrentTagRange, LineRange, LineRanges, TagRange, TagRanges,
};
pub use references::{plain_text, slugify, ReferenceRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
