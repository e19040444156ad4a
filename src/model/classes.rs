//! Class-level descriptors

use super::attributes::{AttrId, Provenance, TypeTarget};
use serde::{Deserialize, Serialize};

/// A named group after expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Schema name
    pub name: String,
    /// Identifier (Pascal case)
    pub class_name: String,
    /// Expanded attributes, in document order
    pub attributes: Vec<AttrId>,
    /// Inner classes contributed by the expansion
    pub inner_classes: Vec<InnerClassDescriptor>,
    /// Documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sourced into a mixed content model; the group emits no element attributes
    pub mixed: bool,
    /// Element names the group contributed before it was marked mixed
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub mixed_elements: Vec<String>,
    /// Concrete complex types listed for this group in the subtype index
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub implementors: Vec<String>,
}

/// An anonymous type defined inline inside an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerClassDescriptor {
    /// Identifier, possibly renamed during unification
    pub name: String,
    /// Schema element that defines the type
    pub xml_name: String,
    /// Attributes
    pub attributes: Vec<AttrId>,
    /// Nested inner classes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inner_classes: Vec<InnerClassDescriptor>,
    /// Base class from a complex extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_class: Option<String>,
    /// Group or class that produced it
    pub provenance: Provenance,
    /// Name before a unification rename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Duplicate of an earlier occurrence; not emitted
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub suppressed: bool,
    /// Synthesized accessors
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub methods: Vec<DynamicMethod>,
}

impl InnerClassDescriptor {
    /// Whether this occurrence produces generated output
    pub fn is_emitted(&self) -> bool {
        !self.suppressed
    }
}

/// One class per named complex type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexTypeDescriptor {
    /// Identifier (Pascal case)
    pub name: String,
    /// Schema name
    pub xml_name: String,
    /// Attributes
    pub attributes: Vec<AttrId>,
    /// Inner classes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inner_classes: Vec<InnerClassDescriptor>,
    /// Base class from an extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_class: Option<String>,
    /// Primitive or enumeration facade rather than a structural node
    pub is_attribute: bool,
    /// Mixed content model
    pub mixed: bool,
    /// Element -> class records for mixed content factories
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub element_mappings: Vec<ElementMapping>,
    /// Documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parents from the generalization table
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub generalizations: Vec<String>,
    /// Synthesized accessors
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub methods: Vec<DynamicMethod>,
}

/// Element name -> element class inside a mixed class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMapping {
    /// Schema element name
    pub element_name: String,
    /// Class instantiated for that element
    pub element_type: String,
    /// Mixed class that owns the element
    pub complex_type: String,
}

/// A named simple type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTypeDescriptor {
    /// Identifier (Pascal case)
    pub name: String,
    /// Schema name
    pub xml_name: String,
    /// Shape
    pub kind: SimpleTypeKind,
    /// Documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SimpleTypeDescriptor {
    /// Whether the type is an enumeration model entity
    pub fn is_enumeration(&self) -> bool {
        matches!(self.kind, SimpleTypeKind::Enumeration { .. })
    }
}

/// How a simple type is represented
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimpleTypeKind {
    /// Closed set of literals
    Enumeration {
        /// Literals in schema order
        literals: Vec<String>,
    },
    /// Restriction of a primitive
    Restriction {
        /// Underlying primitive
        primitive: TypeTarget,
        /// First `pattern` facet along the derivation chain
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
}

/// Accessors synthesized on a class by the reference stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DynamicMethod {
    /// Resolve an indirection attribute to its referenced object
    ReferenceLookup {
        /// Attribute holding the reference
        attribute: String,
        /// Method identifier
        method: String,
        /// Indirection class
        target: String,
        /// The attribute is a collection
        list: bool,
        /// Element tag to match when it differs from the type name
        #[serde(skip_serializing_if = "Option::is_none")]
        tag_name: Option<String>,
    },
    /// Typed accessor for one legal destination of a polymorphic reference
    DestinationLookup {
        /// Attribute holding the reference
        via_attribute: String,
        /// Destination subtype
        subtype: String,
        /// Returned type: the subtype or its wrapper
        returns: TypeTarget,
        /// The attribute is a collection
        list: bool,
        /// Element tag to match when it differs from the type name
        #[serde(skip_serializing_if = "Option::is_none")]
        tag_name: Option<String>,
    },
    /// Accessor for one element kind inside mixed content
    ContentAccessor {
        /// Schema element name
        element_name: String,
        /// Element class
        returns: String,
    },
}

/// An abstract interface generated per group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    /// Identifier (Pascal case)
    pub name: String,
    /// Schema group name
    pub group: String,
    /// Parent interfaces
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parents: Vec<String>,
    /// Classes implementing the interface
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub implementors: Vec<String>,
}
