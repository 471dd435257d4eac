//! Element and document attributes
//!
//! Element attributes are attached to individual blocks (`[#id.role]`,
//! `.Title`), document attributes come from `:name: value` declarations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Element identifier
pub const ATTR_ID: &str = "id";
/// Set when the identifier was supplied by the author
pub const ATTR_CUSTOM_ID: &str = "customid";
/// Block title
pub const ATTR_TITLE: &str = "title";
/// Block role
pub const ATTR_ROLE: &str = "role";
/// Document attribute overriding the generated id prefix
pub const ATTR_ID_PREFIX: &str = "idprefix";
/// Document attribute holding the base directory for relative locations
pub const ATTR_IMAGES_DIR: &str = "imagesdir";

/// Attributes attached to a single block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementAttributes(BTreeMap<String, String>);

impl ElementAttributes {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes carrying an author-supplied identifier
    pub fn with_custom_id(id: impl Into<String>) -> Self {
        let mut attrs = Self::new();
        attrs.set_custom_id(id);
        attrs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The element identifier, generated or custom
    pub fn id(&self) -> Option<&str> {
        self.get(ATTR_ID)
    }

    /// Store a generated identifier
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.insert(ATTR_ID, id);
    }

    /// Store an author-supplied identifier
    pub fn set_custom_id(&mut self, id: impl Into<String>) {
        self.insert(ATTR_ID, id);
        self.insert(ATTR_CUSTOM_ID, "true");
    }

    /// Whether the identifier was supplied by the author
    pub fn has_custom_id(&self) -> bool {
        self.get(ATTR_CUSTOM_ID) == Some("true") && self.contains(ATTR_ID)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(ATTR_TITLE)
    }

    pub fn role(&self) -> Option<&str> {
        self.get(ATTR_ROLE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ElementAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Document-level attributes (`:name: value`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentAttributes(BTreeMap<String, String>);

impl DocumentAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Remove an attribute (`:name!:`)
    pub fn reset(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DocumentAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
