//! Attribute descriptors and the canonical attribute table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix appended to a class name to name its wrapper type
pub const WRAPPER_SUFFIX: &str = "Wrapper";

/// What an attribute's type resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TypeTarget {
    /// Model primitive (`String`, `Integer`, ...)
    Primitive(String),
    /// Complex type or inner class
    Class(String),
    /// Enumeration simple type
    Enum(String),
    /// Wrapper generated over a class
    Wrapper(String),
    /// Generic boxed element of mixed or untyped content
    Content,
}

impl TypeTarget {
    /// Class name referenced by this target, for class and wrapper targets
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeTarget::Class(name) | TypeTarget::Wrapper(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this is a model primitive
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeTarget::Primitive(_))
    }
}

impl fmt::Display for TypeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTarget::Primitive(name) | TypeTarget::Class(name) | TypeTarget::Enum(name) => {
                write!(f, "{}", name)
            }
            TypeTarget::Wrapper(name) => write!(f, "{}{}", name, WRAPPER_SUFFIX),
            TypeTarget::Content => write!(f, "Content"),
        }
    }
}

/// Scalar or collection-of-type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", content = "of", rename_all = "snake_case")]
pub enum TypeExpr {
    /// Single value
    Single(TypeTarget),
    /// Collection of values
    List(TypeTarget),
}

impl TypeExpr {
    /// The element type
    pub fn target(&self) -> &TypeTarget {
        match self {
            TypeExpr::Single(t) | TypeExpr::List(t) => t,
        }
    }

    /// Whether this is a collection
    pub fn is_list(&self) -> bool {
        matches!(self, TypeExpr::List(_))
    }

    /// The same element type as a collection
    pub fn into_list(self) -> Self {
        match self {
            TypeExpr::Single(t) | TypeExpr::List(t) => TypeExpr::List(t),
        }
    }

    /// Replace the element type, keeping the shape
    pub fn map_target(self, f: impl FnOnce(TypeTarget) -> TypeTarget) -> Self {
        match self {
            TypeExpr::Single(t) => TypeExpr::Single(f(t)),
            TypeExpr::List(t) => TypeExpr::List(f(t)),
        }
    }

    /// Point class references at `old` to `new`; returns whether anything changed
    pub fn retarget(&mut self, old: &str, new: &str) -> bool {
        let target = match self {
            TypeExpr::Single(t) | TypeExpr::List(t) => t,
        };
        match target {
            TypeTarget::Class(name) if name == old => {
                *name = new.to_string();
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Single(t) => write!(f, "{}", t),
            TypeExpr::List(t) => write!(f, "List<{}>", t),
        }
    }
}

/// How an attribute is serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SerializationTag {
    /// Child element
    Element {
        /// Schema element name
        name: String,
        /// Enclosing element that was flattened away, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        wrapper: Option<String>,
    },
    /// XML attribute
    Attribute {
        /// Schema attribute name
        name: String,
    },
    /// Simple content text
    Value,
    /// Interleaved text and elements
    MixedContent {
        /// Element names legal inside the content
        element_names: Vec<String>,
    },
}

impl SerializationTag {
    /// Plain child element tag
    pub fn element(name: impl Into<String>) -> Self {
        SerializationTag::Element {
            name: name.into(),
            wrapper: None,
        }
    }

    /// Whether this attribute serializes as a child element
    pub fn is_element(&self) -> bool {
        matches!(self, SerializationTag::Element { .. })
    }

    /// Child element the attribute appears as; the wrapper when flattened
    pub fn element_name(&self) -> Option<&str> {
        match self {
            SerializationTag::Element { name, wrapper } => Some(wrapper.as_deref().unwrap_or(name)),
            _ => None,
        }
    }

    /// Schema element or attribute name, if any
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            SerializationTag::Element { name, .. } | SerializationTag::Attribute { name } => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// Which construct contributed an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Provenance {
    /// Named group (schema name)
    Group(String),
    /// Named attribute group (schema name)
    AttributeGroup(String),
    /// Simple content of a complex type
    SimpleContent(String),
    /// The complex type's own content (schema name)
    ComplexType(String),
    /// An inner class body (inner class schema element name)
    InnerClass(String),
}

impl Provenance {
    /// Group name when contributed by a named group
    pub fn group(&self) -> Option<&str> {
        match self {
            Provenance::Group(name) => Some(name),
            _ => None,
        }
    }
}

/// One attribute of a group, class, or inner class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Identifier (camel case)
    pub name: String,
    /// Resolved type
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    /// Type token as written in the schema (local part)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Normalized `minOccurs`
    pub min_occurs: String,
    /// Normalized `maxOccurs`
    pub max_occurs: String,
    /// Serialization
    pub tag: SerializationTag,
    /// Contributing construct
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    /// Documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Restriction pattern of a simple-content value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Simple-content value of a primitive (not enumeration) type
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub is_primitive: bool,
}

impl AttributeDescriptor {
    /// Attribute with default cardinality `0..1`
    pub fn new(name: impl Into<String>, ty: TypeExpr, tag: SerializationTag) -> Self {
        Self {
            name: name.into(),
            ty,
            schema_type: None,
            min_occurs: "0".to_string(),
            max_occurs: "1".to_string(),
            tag,
            provenance: None,
            description: None,
            pattern: None,
            is_primitive: false,
        }
    }

    /// Set the schema type token
    pub fn with_schema_type(mut self, schema_type: impl Into<String>) -> Self {
        self.schema_type = Some(schema_type.into());
        self
    }

    /// Set the cardinality
    pub fn with_occurs(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min_occurs = min.into();
        self.max_occurs = max.into();
        self
    }

    /// Set the provenance
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Whether the attribute holds more than one value
    pub fn is_repeating(&self) -> bool {
        repeating(&self.max_occurs)
    }

    /// Order-independent comparison key for inner-class shapes
    pub fn shape_key(&self) -> (String, String, String) {
        (
            self.name.clone(),
            self.ty.to_string(),
            self.max_occurs.clone(),
        )
    }
}

/// Whether a normalized `maxOccurs` value allows more than one occurrence
pub fn repeating(max_occurs: &str) -> bool {
    max_occurs != "1" && max_occurs != "0"
}

/// Stable handle into the [`AttributeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrId(pub usize);

/// A table row: an attribute plus the row it was copied from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRow {
    /// Row handle
    pub id: AttrId,
    /// Row this one was copied from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<AttrId>,
    /// The attribute
    #[serde(flatten)]
    pub attribute: AttributeDescriptor,
}

/// The single canonical attribute table
///
/// Groups, classes and inner classes hold [`AttrId`]s. A class that merges a
/// group's attributes gets derived rows whose `origin` points at the group
/// rows, so a rename can be applied to exactly the rows that reference the
/// old name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeTable {
    rows: Vec<AttributeRow>,
}

impl AttributeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new row
    pub fn push(&mut self, attribute: AttributeDescriptor) -> AttrId {
        self.insert(attribute, None)
    }

    /// Append a copy of an existing row, transformed by `f`
    pub fn derive(
        &mut self,
        source: AttrId,
        f: impl FnOnce(AttributeDescriptor) -> AttributeDescriptor,
    ) -> Option<AttrId> {
        let attribute = f(self.get(source)?.clone());
        Some(self.insert(attribute, Some(source)))
    }

    fn insert(&mut self, attribute: AttributeDescriptor, origin: Option<AttrId>) -> AttrId {
        let id = AttrId(self.rows.len());
        self.rows.push(AttributeRow {
            id,
            origin,
            attribute,
        });
        id
    }

    /// Look up an attribute
    pub fn get(&self, id: AttrId) -> Option<&AttributeDescriptor> {
        self.rows.get(id.0).map(|row| &row.attribute)
    }

    /// Look up an attribute for modification
    pub fn get_mut(&mut self, id: AttrId) -> Option<&mut AttributeDescriptor> {
        self.rows.get_mut(id.0).map(|row| &mut row.attribute)
    }

    /// Row a derived attribute was copied from
    pub fn origin(&self, id: AttrId) -> Option<AttrId> {
        self.rows.get(id.0).and_then(|row| row.origin)
    }

    /// Retarget `old` to `new` in the given rows; returns the number changed
    pub fn retarget(&mut self, ids: &[AttrId], old: &str, new: &str) -> usize {
        let mut changed = 0;
        for id in ids {
            if let Some(attr) = self.get_mut(*id) {
                if attr.ty.retarget(old, new) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Resolve a list of handles
    pub fn resolve<'a>(
        &'a self,
        ids: &'a [AttrId],
    ) -> impl Iterator<Item = &'a AttributeDescriptor> + 'a {
        ids.iter().filter_map(move |id| self.get(*id))
    }

    /// Every row, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &AttributeRow> {
        self.rows.iter()
    }

    /// Every attribute, for in-place rewriting
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AttributeDescriptor> {
        self.rows.iter_mut().map(|row| &mut row.attribute)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_attr(name: &str, class: &str) -> AttributeDescriptor {
        AttributeDescriptor::new(
            name,
            TypeExpr::Single(TypeTarget::Class(class.into())),
            SerializationTag::element(name.to_uppercase()),
        )
    }

    #[test]
    fn test_type_display() {
        let ty = TypeExpr::List(TypeTarget::Wrapper("Alpha".into()));
        assert_eq!(ty.to_string(), "List<AlphaWrapper>");
        assert_eq!(
            TypeExpr::Single(TypeTarget::Primitive("String".into())).to_string(),
            "String"
        );
    }

    #[test]
    fn test_retarget_inside_list() {
        let mut ty = TypeExpr::List(TypeTarget::Class("Settings".into()));
        assert!(ty.retarget("Settings", "Settings_Second"));
        assert_eq!(ty, TypeExpr::List(TypeTarget::Class("Settings_Second".into())));
        assert!(!ty.retarget("Settings", "Other"));
    }

    #[test]
    fn test_retarget_ignores_non_class() {
        let mut ty = TypeExpr::Single(TypeTarget::Primitive("Settings".into()));
        assert!(!ty.retarget("Settings", "Settings_Second"));
    }

    #[test]
    fn test_repeating() {
        assert!(!repeating("1"));
        assert!(repeating("unbounded"));
        assert!(repeating("5"));
    }

    #[test]
    fn test_table_derive_keeps_origin() {
        let mut table = AttributeTable::new();
        let a = table.push(class_attr("settings", "Settings"));
        let b = table
            .derive(a, |attr| AttributeDescriptor {
                ty: attr.ty.clone().into_list(),
                ..attr
            })
            .unwrap();

        assert_eq!(table.origin(b), Some(a));
        assert_eq!(table.origin(a), None);
        assert!(table.get(b).unwrap().ty.is_list());
        assert!(!table.get(a).unwrap().ty.is_list());
    }

    #[test]
    fn test_table_retarget_only_given_rows() {
        let mut table = AttributeTable::new();
        let a = table.push(class_attr("settings", "Settings"));
        let b = table.push(class_attr("settings", "Settings"));

        assert_eq!(table.retarget(&[b], "Settings", "Settings_Second"), 1);
        assert_eq!(
            table.get(a).unwrap().ty.target(),
            &TypeTarget::Class("Settings".into())
        );
        assert_eq!(
            table.get(b).unwrap().ty.target(),
            &TypeTarget::Class("Settings_Second".into())
        );
    }
}
