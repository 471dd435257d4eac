//! Error types for the assembly pipeline

use thiserror::Error;

/// Errors raised when building line or tag ranges
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// A `lines=` value that is not a list of `N`, `N..M` or `N..-1`
    #[error("Malformed line range '{spec}': {reason}")]
    MalformedLineRange { spec: String, reason: String },

    /// A `tags=` value with an empty or invalid directive
    #[error("Malformed tag range '{spec}': {reason}")]
    MalformedTagRange { spec: String, reason: String },
}

/// Errors raised while walking content for footnotes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FootnoteError {
    /// A footnote whose content contains another footnote
    #[error("Footnote {outer} contains a nested footnote")]
    Nested { outer: u32 },

    /// `footnoteref:[]` without a name
    #[error("Footnote reference {id} has an empty name")]
    EmptyReference { id: u32 },
}

/// Errors that abort the assembly of a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Unable to collect footnotes in document: {0}")]
    FootnoteCollection(#[from] FootnoteError),
}

/// Errors loading an [`AssemblyConfig`](crate::config::AssemblyConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error parsing the TOML source
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A setting with an unusable value
    #[error("Invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Result type for assembly operations
pub type Result<T> = std::result::Result<T, AssemblyError>;
