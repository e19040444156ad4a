//! Schema indexer
//!
//! One pass over the top level of the schema document, building name -> node
//! tables for the definitions later stages look up.

use crate::documents::{Document, Element};
use crate::error::{ParseError, ReferenceKind, Result, SchemaReferenceError};
use crate::names::local_name;
use indexmap::IndexMap;

/// Named top-level definitions of one schema document
#[derive(Debug)]
pub struct SchemaIndex<'a> {
    root: &'a Element,
    groups: IndexMap<&'a str, &'a Element>,
    attribute_groups: IndexMap<&'a str, &'a Element>,
    complex_types: IndexMap<&'a str, &'a Element>,
    simple_types: IndexMap<&'a str, &'a Element>,
}

impl<'a> SchemaIndex<'a> {
    /// Index a parsed schema document
    pub fn build(doc: &'a Document) -> Result<Self> {
        let root = doc
            .root()
            .ok_or_else(|| ParseError::new("schema document is empty"))?;
        if !root.is("schema") {
            return Err(ParseError::new(format!(
                "expected a 'schema' root element, found '{}'",
                root.local_name()
            ))
            .into());
        }

        let mut index = Self {
            root,
            groups: IndexMap::new(),
            attribute_groups: IndexMap::new(),
            complex_types: IndexMap::new(),
            simple_types: IndexMap::new(),
        };

        for child in &root.children {
            let Some(name) = child.get_attribute("name") else {
                continue;
            };
            let table = match child.local_name() {
                "group" => &mut index.groups,
                "attributeGroup" => &mut index.attribute_groups,
                "complexType" => &mut index.complex_types,
                "simpleType" => &mut index.simple_types,
                _ => continue,
            };
            // Redefinitions keep the first definition and its position
            table.entry(name).or_insert(child);
        }

        tracing::debug!(
            groups = index.groups.len(),
            attribute_groups = index.attribute_groups.len(),
            complex_types = index.complex_types.len(),
            simple_types = index.simple_types.len(),
            "indexed schema"
        );

        Ok(index)
    }

    /// The `schema` element
    pub fn root(&self) -> &'a Element {
        self.root
    }

    /// Look up a group by (possibly prefixed) name
    pub fn lookup_group(&self, name: &str, referenced_from: &str) -> Result<&'a Element> {
        lookup(&self.groups, ReferenceKind::Group, name, referenced_from)
    }

    /// Look up an attribute group by (possibly prefixed) name
    pub fn lookup_attribute_group(&self, name: &str, referenced_from: &str) -> Result<&'a Element> {
        lookup(
            &self.attribute_groups,
            ReferenceKind::AttributeGroup,
            name,
            referenced_from,
        )
    }

    /// Named complex type, if defined
    pub fn complex_type(&self, name: &str) -> Option<&'a Element> {
        self.complex_types.get(local_name(name)).copied()
    }

    /// Named simple type, if defined
    pub fn simple_type(&self, name: &str) -> Option<&'a Element> {
        self.simple_types.get(local_name(name)).copied()
    }

    /// Whether any local definition carries this name
    pub fn defines_type(&self, name: &str) -> bool {
        self.complex_type(name).is_some() || self.simple_type(name).is_some()
    }

    /// Groups in document order
    pub fn groups(&self) -> impl Iterator<Item = (&'a str, &'a Element)> + '_ {
        self.groups.iter().map(|(k, v)| (*k, *v))
    }

    /// Complex types in document order
    pub fn complex_types(&self) -> impl Iterator<Item = (&'a str, &'a Element)> + '_ {
        self.complex_types.iter().map(|(k, v)| (*k, *v))
    }

    /// Simple types in document order
    pub fn simple_types(&self) -> impl Iterator<Item = (&'a str, &'a Element)> + '_ {
        self.simple_types.iter().map(|(k, v)| (*k, *v))
    }
}

fn lookup<'a>(
    table: &IndexMap<&'a str, &'a Element>,
    kind: ReferenceKind,
    name: &str,
    referenced_from: &str,
) -> Result<&'a Element> {
    let local = local_name(name);
    table.get(local).copied().ok_or_else(|| {
        SchemaReferenceError::new(kind, local)
            .with_referenced_from(referenced_from)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SCHEMA: &str = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:AR="urn:ar">
        <xsd:group name="G"><xsd:sequence/></xsd:group>
        <xsd:attributeGroup name="AG"/>
        <xsd:complexType name="CT"/>
        <xsd:simpleType name="ST"/>
        <xsd:element name="ROOT" type="AR:CT"/>
    </xsd:schema>"#;

    #[test]
    fn test_build_and_lookup() {
        let doc = Document::from_string(SCHEMA).unwrap();
        let index = SchemaIndex::build(&doc).unwrap();

        assert!(index.lookup_group("AR:G", "X").unwrap().is("group"));
        assert!(index.lookup_attribute_group("AG", "X").is_ok());
        assert!(index.complex_type("AR:CT").is_some());
        assert!(index.simple_type("ST").is_some());
        assert!(index.defines_type("CT"));
        assert!(!index.defines_type("ROOT"));
    }

    #[test]
    fn test_missing_group_names_reference() {
        let doc = Document::from_string(SCHEMA).unwrap();
        let index = SchemaIndex::build(&doc).unwrap();

        match index.lookup_group("AR:MISSING", "CT") {
            Err(Error::SchemaReference(err)) => {
                assert_eq!(err.kind, ReferenceKind::Group);
                assert_eq!(err.name, "MISSING");
                assert_eq!(err.referenced_from.as_deref(), Some("CT"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_schema_root() {
        let doc = Document::from_string("<root/>").unwrap();
        assert!(matches!(SchemaIndex::build(&doc), Err(Error::Parse(_))));
    }
}
