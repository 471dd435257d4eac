//! Location resolution
//!
//! Substitutes `{name}` placeholders with document attributes and prefixes
//! relative paths with the base directory (`imagesdir` by default). No other
//! path normalization is done: `./img` + `./inc/x` gives `./img/./inc/x`.

use once_cell::sync::Lazy;
use regex::Regex;
use stitchdoc_ast::{DocumentAttributes, Location, LocationElement};

use crate::config::AssemblyConfig;

static URI_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme pattern"));

pub(crate) static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_][A-Za-z0-9_-]*)\}").expect("valid placeholder pattern"));

/// Resolves locations against document attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationResolver {
    config: AssemblyConfig,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(&AssemblyConfig::default())
    }
}

impl LocationResolver {
    pub fn new(config: &AssemblyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Resolve a location into a single literal fragment
    pub fn resolve(&self, location: &Location, attrs: &DocumentAttributes) -> Location {
        let value = substitute(location, attrs);
        let value = match self.config.base_dir(attrs) {
            Some(base) if !base.is_empty() && is_relative(&value) => join(base, &value),
            _ => value,
        };
        Location::from_text(value)
    }
}

/// Resolve with the default configuration
pub fn resolve_location(location: &Location, attrs: &DocumentAttributes) -> Location {
    LocationResolver::default().resolve(location, attrs)
}

/// Split raw text into literal fragments and `{name}` placeholders
pub fn parse_location(text: &str) -> Location {
    let mut elements = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            elements.push(LocationElement::Text(text[last..whole.start()].to_string()));
        }
        elements.push(LocationElement::AttributeSubstitution(name.as_str().to_string()));
        last = whole.end();
    }
    if last < text.len() {
        elements.push(LocationElement::Text(text[last..].to_string()));
    }
    Location::new(elements)
}

/// The location with known placeholders substituted, unknown ones kept
/// as `{name}`
pub(crate) fn substitute(location: &Location, attrs: &DocumentAttributes) -> String {
    let mut value = String::new();
    for element in &location.elements {
        match element {
            LocationElement::Text(text) => value.push_str(text),
            LocationElement::AttributeSubstitution(name) => match attrs.get(name) {
                Some(replacement) => value.push_str(replacement),
                None => {
                    value.push('{');
                    value.push_str(name);
                    value.push('}');
                }
            },
        }
    }
    value
}

fn is_relative(value: &str) -> bool {
    !value.starts_with('/') && !URI_SCHEME.is_match(value)
}

fn join(base: &str, path: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
