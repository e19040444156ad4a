//! Error types for xsd-classmodel
//!
//! This module defines the fatal error taxonomy of a compilation pass and the
//! recoverable warnings collected alongside the model.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for schema compilation
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced group, attribute group, base type or type could not be resolved
    #[error("unresolved schema reference: {0}")]
    SchemaReference(#[from] SchemaReferenceError),

    /// Inner-class unification could not settle on a unique name
    #[error("ambiguous inner class '{name}' in '{enclosing}': {reason}")]
    AmbiguousInnerClass {
        /// Inner class name as it appears in the schema
        name: String,
        /// Class that encloses the occurrence
        enclosing: String,
        /// Why the occurrence could not be unified or renamed
        reason: String,
    },

    /// Schema document structure error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid compiler configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kind of schema component a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `group ref="..."`
    Group,
    /// `attributeGroup ref="..."`
    AttributeGroup,
    /// `extension base="..."`
    BaseType,
    /// `type="..."` or a resolved attribute type in the final model
    Type,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::AttributeGroup => write!(f, "attribute group"),
            Self::BaseType => write!(f, "base type"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// A reference to a schema component that is absent from its index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReferenceError {
    /// What kind of component was referenced
    pub kind: ReferenceKind,
    /// The unresolved name
    pub name: String,
    /// Component that holds the reference
    pub referenced_from: Option<String>,
}

impl SchemaReferenceError {
    /// Create a new reference error
    pub fn new(kind: ReferenceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            referenced_from: None,
        }
    }

    /// Set the component holding the reference
    pub fn with_referenced_from(mut self, component: impl Into<String>) -> Self {
        self.referenced_from = Some(component.into());
        self
    }
}

impl fmt::Display for SchemaReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' is not defined", self.kind, self.name)?;

        if let Some(ref from) = self.referenced_from {
            write!(f, " (referenced from '{}')", from)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaReferenceError {}

/// Schema document structure error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Recoverable conditions recorded during compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileWarning {
    /// A schema-level primitive has no entry in the primitive table
    UnmappedPrimitive {
        /// Schema type token
        type_name: String,
        /// Identifier used instead
        fallback: String,
    },
    /// A choice nested deeper than the supported level; needs manual review
    DeepChoiceNesting {
        /// Group or class holding the choice
        component: String,
        /// Nesting depth reached
        depth: usize,
    },
    /// A group references itself through its own content model
    RecursiveGroup {
        /// The re-entered group
        group: String,
    },
    /// A destination enum family has no subtype index entry
    MissingSubtypeFamily {
        /// Enum family token
        family: String,
        /// Indirection class holding the `dest` attribute
        class_name: String,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedPrimitive {
                type_name,
                fallback,
            } => write!(
                f,
                "primitive type '{}' has no mapping, using '{}'",
                type_name, fallback
            ),
            Self::DeepChoiceNesting { component, depth } => write!(
                f,
                "choice nested {} levels deep in '{}' needs manual review",
                depth, component
            ),
            Self::RecursiveGroup { group } => {
                write!(f, "group '{}' references itself, recursion skipped", group)
            }
            Self::MissingSubtypeFamily { family, class_name } => write!(
                f,
                "no subtype index entry for family '{}' (dest of '{}')",
                family, class_name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_reference_display() {
        let err = SchemaReferenceError::new(ReferenceKind::Group, "MISSING-GROUP")
            .with_referenced_from("SOME-TYPE");

        let msg = format!("{}", err);
        assert!(msg.contains("group 'MISSING-GROUP' is not defined"));
        assert!(msg.contains("SOME-TYPE"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Invalid schema syntax")
            .with_location("schema.xsd:42:10")
            .with_source("<xsd:element name='invalid'/>");

        let msg = format!("{}", err);
        assert!(msg.contains("Invalid schema syntax"));
        assert!(msg.contains("Location:"));
        assert!(msg.contains("Source:"));
    }

    #[test]
    fn test_error_conversion() {
        let ref_err = SchemaReferenceError::new(ReferenceKind::BaseType, "X");
        let err: Error = ref_err.into();
        assert!(matches!(err, Error::SchemaReference(_)));
    }

    #[test]
    fn test_warning_serializes_with_kind() {
        let warning = CompileWarning::RecursiveGroup {
            group: "G".to_string(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"kind\":\"recursive_group\""));
    }
}
