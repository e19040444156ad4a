//! The compiled class model
//!
//! A [`ClassModel`] is produced by one compilation pass and never mutated
//! afterwards. Every collection keeps schema discovery order, so two
//! compilations of the same inputs serialize to identical JSON.

mod attributes;
mod classes;

pub use attributes::{
    repeating, AttrId, AttributeDescriptor, AttributeRow, AttributeTable, Provenance,
    SerializationTag, TypeExpr, TypeTarget, WRAPPER_SUFFIX,
};
pub use classes::{
    ComplexTypeDescriptor, DynamicMethod, ElementMapping, GroupDefinition, InnerClassDescriptor,
    InterfaceDescriptor, SimpleTypeDescriptor, SimpleTypeKind,
};

use crate::error::{CompileWarning, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Normalized, name-resolved class model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassModel {
    /// Canonical attribute table
    pub attributes: AttributeTable,
    /// Expanded groups by schema name
    pub groups: IndexMap<String, GroupDefinition>,
    /// Classes by identifier
    pub classes: IndexMap<String, ComplexTypeDescriptor>,
    /// Simple types by schema name
    pub simple_types: IndexMap<String, SimpleTypeDescriptor>,
    /// Classes that get a wrapper type
    pub wrappers: BTreeSet<String>,
    /// Interfaces by identifier
    pub interfaces: IndexMap<String, InterfaceDescriptor>,
    /// Recoverable issues found during compilation
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<CompileWarning>,
}

impl ClassModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve attribute handles
    pub fn attributes_of<'a>(
        &'a self,
        ids: &'a [AttrId],
    ) -> impl Iterator<Item = &'a AttributeDescriptor> + 'a {
        self.attributes.resolve(ids)
    }

    /// Look up a class by identifier
    pub fn class(&self, name: &str) -> Option<&ComplexTypeDescriptor> {
        self.classes.get(name)
    }

    /// Attribute of a class by identifier
    pub fn class_attribute(&self, class: &str, attribute: &str) -> Option<&AttributeDescriptor> {
        let class = self.class(class)?;
        self.attributes_of(&class.attributes)
            .find(|a| a.name == attribute)
    }

    /// Attribute of a group by identifier
    pub fn group_attribute(&self, group: &str, attribute: &str) -> Option<&AttributeDescriptor> {
        let group = self.groups.get(group)?;
        self.attributes_of(&group.attributes)
            .find(|a| a.name == attribute)
    }

    /// Every inner class held by classes, at any depth, in class order
    pub fn all_inner_classes(&self) -> Vec<&InnerClassDescriptor> {
        fn collect<'a>(inner: &'a [InnerClassDescriptor], out: &mut Vec<&'a InnerClassDescriptor>) {
            for ic in inner {
                out.push(ic);
                collect(&ic.inner_classes, out);
            }
        }

        let mut out = Vec::new();
        for class in self.classes.values() {
            collect(&class.inner_classes, &mut out);
        }
        out
    }

    /// Inner classes that produce generated output
    pub fn emitted_inner_classes(&self) -> Vec<&InnerClassDescriptor> {
        self.all_inner_classes()
            .into_iter()
            .filter(|ic| ic.is_emitted())
            .collect()
    }

    /// Deterministic JSON dump
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
