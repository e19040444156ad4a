//! Compiler configuration
//!
//! Options that shape the generated model without changing the schema:
//! wrapper generation, element flattening, and the extra mapping tables.
//! Everything has a default, so a configuration file only needs the keys it
//! changes.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Which classes get a generated wrapper type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WrapperPolicy {
    /// No wrappers; attribute types are never rewritten
    Disabled,
    /// Every complex type gets a wrapper
    AllClasses,
    /// Only the listed complex types get a wrapper
    Only {
        /// Class identifiers (Pascal case)
        names: BTreeSet<String>,
    },
}

impl Default for WrapperPolicy {
    fn default() -> Self {
        WrapperPolicy::AllClasses
    }
}

impl WrapperPolicy {
    /// Wrap only the given classes
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WrapperPolicy::Only {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Compilation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Hoist the single element of an anonymous wrapper element into the parent
    pub flatten_wrapper_elements: bool,

    /// Wrapper generation policy
    pub wrappers: WrapperPolicy,

    /// Schema type token -> model primitive, consulted before the built-in table
    pub primitive_overrides: IndexMap<String, String>,

    /// Mixed-content element name -> element class, for element mapping records
    pub mixed_element_types: IndexMap<String, String>,

    /// Extra schema token -> Pascal identifier exceptions for the name mapper
    pub name_exceptions: IndexMap<String, String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            flatten_wrapper_elements: true,
            wrappers: WrapperPolicy::default(),
            primitive_overrides: IndexMap::new(),
            mixed_element_types: IndexMap::new(),
            name_exceptions: IndexMap::new(),
        }
    }
}

impl CompilerConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Set the wrapper policy
    pub fn with_wrappers(mut self, policy: WrapperPolicy) -> Self {
        self.wrappers = policy;
        self
    }

    /// Enable or disable wrapper-element flattening
    pub fn with_flatten_wrapper_elements(mut self, flatten: bool) -> Self {
        self.flatten_wrapper_elements = flatten;
        self
    }

    /// Map a schema type token to a primitive
    pub fn with_primitive_override(
        mut self,
        token: impl Into<String>,
        primitive: impl Into<String>,
    ) -> Self {
        self.primitive_overrides.insert(token.into(), primitive.into());
        self
    }

    /// Map a mixed-content element name to its element class
    pub fn with_mixed_element_type(
        mut self,
        element: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        self.mixed_element_types
            .insert(element.into(), class_name.into());
        self
    }

    /// Add a name mapper exception
    pub fn with_name_exception(
        mut self,
        token: impl Into<String>,
        pascal: impl Into<String>,
    ) -> Self {
        self.name_exceptions.insert(token.into(), pascal.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert!(config.flatten_wrapper_elements);
        assert_eq!(config.wrappers, WrapperPolicy::AllClasses);
        assert!(config.primitive_overrides.is_empty());
    }

    #[test]
    fn test_partial_json() {
        let config = CompilerConfig::from_json(
            r#"{
                "wrappers": {"mode": "only", "names": ["Alpha"]},
                "mixed_element_types": {"FT": "LOverviewParagraph"}
            }"#,
        )
        .unwrap();

        assert!(config.flatten_wrapper_elements);
        assert_eq!(config.wrappers, WrapperPolicy::only(["Alpha"]));
        assert_eq!(
            config.mixed_element_types.get("FT").map(String::as_str),
            Some("LOverviewParagraph")
        );
    }

    #[test]
    fn test_invalid_json() {
        let err = CompilerConfig::from_json(r#"{"wrappers": 3}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"flatten_wrapper_elements": false, "wrappers": {{"mode": "disabled"}}}}"#
        )
        .unwrap();

        let config = CompilerConfig::from_file(file.path()).unwrap();
        assert!(!config.flatten_wrapper_elements);
        assert_eq!(config.wrappers, WrapperPolicy::Disabled);
    }

    #[test]
    fn test_builder() {
        let config = CompilerConfig::new()
            .with_wrappers(WrapperPolicy::Disabled)
            .with_primitive_override("STRING--SIMPLE", "String")
            .with_name_exception("CAN-ID", "CANId");
        assert_eq!(config.wrappers, WrapperPolicy::Disabled);
        assert_eq!(config.primitive_overrides.len(), 1);
        assert_eq!(config.name_exceptions.len(), 1);
    }
}
