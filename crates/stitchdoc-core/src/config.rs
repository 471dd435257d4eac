//! Assembly configuration
//!
//! Defaults match AsciiDoc conventions; every value can be overridden from a
//! TOML table, and the id prefix can further be overridden per document with
//! an attribute declaration.

use serde::{Deserialize, Serialize};
use stitchdoc_ast::{DocumentAttributes, ATTR_ID_PREFIX, ATTR_IMAGES_DIR};

use crate::error::ConfigError;

/// Settings shared by the assembler and the location resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Prefix for generated ids when the document does not set one
    pub id_prefix: String,
    /// Document attribute that overrides `id_prefix`
    pub id_prefix_attribute: String,
    /// Document attribute holding the base directory for relative locations
    pub base_dir_attribute: String,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            id_prefix: "_".to_string(),
            id_prefix_attribute: ATTR_ID_PREFIX.to_string(),
            base_dir_attribute: ATTR_IMAGES_DIR.to_string(),
        }
    }
}

impl AssemblyConfig {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id_prefix_attribute.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "id_prefix_attribute",
                reason: "attribute name must not be empty".to_string(),
            });
        }
        if self.base_dir_attribute.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "base_dir_attribute",
                reason: "attribute name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The id prefix in effect for the given attributes
    pub fn id_prefix<'a>(&'a self, attrs: &'a DocumentAttributes) -> &'a str {
        attrs
            .get(&self.id_prefix_attribute)
            .unwrap_or(self.id_prefix.as_str())
    }

    /// The base directory in effect for the given attributes
    pub fn base_dir<'a>(&self, attrs: &'a DocumentAttributes) -> Option<&'a str> {
        attrs.get(&self.base_dir_attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssemblyConfig::default();
        assert_eq!(config.id_prefix, "_");
        assert_eq!(config.id_prefix_attribute, "idprefix");
        assert_eq!(config.base_dir_attribute, "imagesdir");
    }

    #[test]
    fn test_load_partial_config_from_toml() {
        let config = AssemblyConfig::from_toml_str(r#"id_prefix = "sect_""#).unwrap();
        assert_eq!(config.id_prefix, "sect_");
        assert_eq!(config.base_dir_attribute, "imagesdir");
    }

    #[test]
    fn test_empty_attribute_name_rejected() {
        let err = AssemblyConfig::from_toml_str(r#"base_dir_attribute = " ""#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "base_dir_attribute",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = AssemblyConfig::from_toml_str("id_prefix = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_document_attribute_overrides_prefix() {
        let config = AssemblyConfig::default();
        let attrs: DocumentAttributes = [("idprefix", "custom_")].into_iter().collect();
        assert_eq!(config.id_prefix(&attrs), "custom_");
        assert_eq!(config.id_prefix(&DocumentAttributes::new()), "_");
    }

    #[test]
    fn test_base_dir_unset_by_default() {
        let config = AssemblyConfig::default();
        assert_eq!(config.base_dir(&DocumentAttributes::new()), None);
    }
}
