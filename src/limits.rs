//! Limits and constraints for schema compilation
//!
//! This module defines limits that keep a compilation pass bounded: document
//! size and depth, and how deep the grammar constructs may nest before the
//! compiler refuses or flags them.

use crate::error::{Error, Result};

/// Compilation limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum element nesting depth of the schema document
    pub max_xml_depth: usize,

    /// Maximum schema file size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Deepest choice-within-choice nesting compiled without a review warning
    pub max_choice_nesting: usize,

    /// Maximum depth of anonymous types nested inside elements
    pub max_inner_class_depth: usize,

    /// Maximum length of a simple type restriction chain
    pub max_derivation_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
            max_choice_nesting: 3,
            max_inner_class_depth: 2,
            max_derivation_depth: 32,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
            max_choice_nesting: 3,
            max_inner_class_depth: 2,
            max_derivation_depth: 8,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
            max_choice_nesting: 8,
            max_inner_class_depth: 4,
            max_derivation_depth: 256,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }

    /// Whether a choice at this nesting depth must be flagged for review
    pub fn exceeds_choice_nesting(&self, depth: usize) -> bool {
        depth > self.max_choice_nesting
    }

    /// Check if an anonymous type nesting depth is within limits
    pub fn check_inner_class_depth(&self, depth: usize, element: &str) -> Result<()> {
        if depth > self.max_inner_class_depth {
            Err(Error::LimitExceeded(format!(
                "anonymous type of element '{}' is nested {} levels deep, maximum is {}",
                element, depth, self.max_inner_class_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a simple type derivation chain is within limits
    pub fn check_derivation_depth(&self, depth: usize, type_name: &str) -> Result<()> {
        if depth > self.max_derivation_depth {
            Err(Error::LimitExceeded(format!(
                "derivation of '{}' exceeds {} levels (cyclic restriction?)",
                type_name, self.max_derivation_depth
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_xml_depth, 1000);
        assert!(limits.check_xml_depth(500).is_ok());
        assert!(limits.check_xml_depth(1500).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_xml_depth < Limits::default().max_xml_depth);
        assert!(limits.check_xml_depth(150).is_err());
    }

    #[test]
    fn test_choice_nesting_flag() {
        let limits = Limits::default();
        assert!(!limits.exceeds_choice_nesting(3));
        assert!(limits.exceeds_choice_nesting(4));
    }

    #[test]
    fn test_inner_class_depth() {
        let limits = Limits::default();
        assert!(limits.check_inner_class_depth(2, "SETTINGS").is_ok());
        let err = limits.check_inner_class_depth(3, "SETTINGS").unwrap_err();
        assert!(err.to_string().contains("SETTINGS"));
    }

    #[test]
    fn test_check_xml_size() {
        let limits = Limits::default();
        assert!(limits.check_xml_size(1024).is_ok());
        assert!(limits.check_xml_size(200 * 1024 * 1024).is_err());
    }
}
