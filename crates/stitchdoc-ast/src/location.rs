//! Locations (link targets, image and include paths)
//!
//! A location may still contain `{name}` attribute placeholders until it is
//! resolved against the document attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fragment of a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationElement {
    /// Literal text
    Text(String),
    /// An attribute placeholder, `{name}`
    AttributeSubstitution(String),
}

/// A path or URL, possibly containing attribute placeholders
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub elements: Vec<LocationElement>,
}

impl Location {
    pub fn new(elements: Vec<LocationElement>) -> Self {
        Self { elements }
    }

    /// A location made of a single literal fragment
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            elements: vec![LocationElement::Text(text.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.iter().all(|e| match e {
            LocationElement::Text(t) => t.is_empty(),
            LocationElement::AttributeSubstitution(_) => false,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            match element {
                LocationElement::Text(text) => f.write_str(text)?,
                LocationElement::AttributeSubstitution(name) => write!(f, "{{{}}}", name)?,
            }
        }
        Ok(())
    }
}
