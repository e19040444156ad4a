//! Inner-class unifier
//!
//! Inner classes are anonymous in the schema, so two elements with the same
//! name in different places may define different types. The unifier walks
//! classes in model order and, per inner class name, keeps every distinct
//! shape it has emitted:
//!
//! - first occurrence of a name: emitted unchanged
//! - same shape as an emitted occurrence: suppressed, references redirected
//!   to the emitted name
//! - new shape: renamed to `<Name>_<Class>`, with references in the owning
//!   attribute list rewritten
//!
//! Earlier occurrences always keep their names. When the renamed or
//! redirected class was contributed by a group, every group that carries the
//! same definition (the defining group and the groups that include it) gets
//! the new name as well, in its inner classes and its attribute list.

use crate::error::{Error, Result};
use crate::model::{
    AttrId, AttributeTable, ClassModel, GroupDefinition, InnerClassDescriptor, Provenance,
};
use indexmap::IndexMap;
use std::collections::BTreeSet;

type Shape = BTreeSet<(String, String, String)>;

fn shape_of(table: &AttributeTable, ids: &[AttrId]) -> Shape {
    table.resolve(ids).map(|a| a.shape_key()).collect()
}

/// An inner class as a group defines it, before a rename
struct GroupSourced<'i> {
    name: &'i str,
    xml_name: &'i str,
    provenance: &'i Provenance,
    shape: &'i Shape,
}

impl GroupSourced<'_> {
    fn matches(&self, table: &AttributeTable, inner: &InnerClassDescriptor) -> bool {
        inner.name == self.name
            && inner.xml_name == self.xml_name
            && &inner.provenance == self.provenance
            && shape_of(table, &inner.attributes) == *self.shape
    }
}

/// Give every group copy of an inner class its new name; returns the number
/// of rewritten references
fn rename_in_groups(
    groups: &mut IndexMap<String, GroupDefinition>,
    table: &mut AttributeTable,
    sourced: &GroupSourced<'_>,
    to: &str,
) -> usize {
    fn rename_in(
        inner_classes: &mut [InnerClassDescriptor],
        owner: &[AttrId],
        table: &mut AttributeTable,
        sourced: &GroupSourced<'_>,
        to: &str,
    ) -> usize {
        let mut changed = 0;
        for inner in inner_classes.iter_mut() {
            changed += rename_in(&mut inner.inner_classes, &inner.attributes, table, sourced, to);
            if sourced.matches(table, inner) {
                changed += table.retarget(owner, sourced.name, to);
                inner.name = to.to_string();
                inner.original_name = Some(sourced.name.to_string());
            }
        }
        changed
    }

    groups
        .values_mut()
        .map(|group| rename_in(&mut group.inner_classes, &group.attributes, table, sourced, to))
        .sum()
}

#[derive(Debug, Clone)]
struct Entry {
    enclosing: String,
    shape: Shape,
    emitted_name: String,
}

/// Registry of emitted inner classes, keyed by schema-derived name
#[derive(Debug, Default)]
pub(crate) struct Unifier {
    registry: IndexMap<String, Vec<Entry>>,
}

impl Unifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unify the inner classes of every class in the model
    pub fn run(mut self, model: &mut ClassModel) -> Result<()> {
        let ClassModel {
            attributes,
            groups,
            classes,
            ..
        } = model;

        for class in classes.values_mut() {
            let owner = class.attributes.clone();
            self.unify_all(
                &mut class.inner_classes,
                &owner,
                &class.name,
                false,
                attributes,
                groups,
            )?;
        }

        let renamed = self
            .registry
            .values()
            .flatten()
            .filter(|e| !self.registry.contains_key(&e.emitted_name))
            .count();
        tracing::debug!(
            names = self.registry.len(),
            renamed,
            "unified inner classes"
        );
        Ok(())
    }

    fn unify_all(
        &mut self,
        inner_classes: &mut [InnerClassDescriptor],
        owner: &[AttrId],
        enclosing: &str,
        in_group: bool,
        table: &mut AttributeTable,
        groups: &mut IndexMap<String, GroupDefinition>,
    ) -> Result<()> {
        for inner in inner_classes.iter_mut() {
            let in_group = in_group || inner.provenance.group().is_some();
            // Nested classes first, so this shape sees their final names
            let own = inner.attributes.clone();
            self.unify_all(
                &mut inner.inner_classes,
                &own,
                enclosing,
                in_group,
                table,
                groups,
            )?;
            self.unify(inner, owner, enclosing, in_group, table, groups)?;
        }
        Ok(())
    }

    fn unify(
        &mut self,
        inner: &mut InnerClassDescriptor,
        owner: &[AttrId],
        enclosing: &str,
        in_group: bool,
        table: &mut AttributeTable,
        groups: &mut IndexMap<String, GroupDefinition>,
    ) -> Result<()> {
        let original = inner.name.clone();
        let shape = shape_of(table, &inner.attributes);
        let sourced = GroupSourced {
            name: &original,
            xml_name: &inner.xml_name,
            provenance: &inner.provenance,
            shape: &shape,
        };

        let Some(entries) = self.registry.get(&original) else {
            self.registry.insert(
                original.clone(),
                vec![Entry {
                    enclosing: enclosing.to_string(),
                    shape,
                    emitted_name: original,
                }],
            );
            return Ok(());
        };

        if let Some(same) = entries.iter().find(|e| e.shape == shape) {
            inner.suppressed = true;
            if same.emitted_name != original {
                let emitted = same.emitted_name.clone();
                table.retarget(owner, &original, &emitted);
                if in_group {
                    rename_in_groups(groups, table, &sourced, &emitted);
                }
                inner.name = emitted;
                inner.original_name = Some(original.clone());
            }
            tracing::debug!(
                name = %original,
                enclosing = %enclosing,
                first = %same.enclosing,
                "suppressed duplicate inner class"
            );
            return Ok(());
        }

        let renamed = format!("{}_{}", original, enclosing);
        let taken = self
            .registry
            .values()
            .flatten()
            .any(|e| e.emitted_name == renamed);
        if taken {
            return Err(Error::AmbiguousInnerClass {
                name: original,
                enclosing: enclosing.to_string(),
                reason: format!("'{}' is already emitted with a different shape", renamed),
            });
        }

        let mut changed = table.retarget(owner, &original, &renamed);
        if in_group {
            changed += rename_in_groups(groups, table, &sourced, &renamed);
        }
        tracing::debug!(
            from = %original,
            to = %renamed,
            references = changed,
            "renamed inner class"
        );

        inner.name = renamed.clone();
        inner.original_name = Some(original.clone());
        self.registry.entry(original).or_default().push(Entry {
            enclosing: enclosing.to_string(),
            shape,
            emitted_name: renamed,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AttributeDescriptor, ComplexTypeDescriptor, Provenance, SerializationTag, TypeExpr,
        TypeTarget,
    };

    fn attr(name: &str, ty: TypeExpr) -> AttributeDescriptor {
        AttributeDescriptor::new(name, ty, SerializationTag::element(name))
    }

    fn primitive(name: &str) -> AttributeDescriptor {
        attr(name, TypeExpr::Single(TypeTarget::Primitive("String".into())))
    }

    fn class_with_settings(
        model: &mut ClassModel,
        class: &str,
        fields: &[&str],
        list: bool,
    ) {
        let inner_ids = fields
            .iter()
            .map(|f| model.attributes.push(primitive(f)))
            .collect();
        let target = TypeTarget::Class("Settings".into());
        let ty = if list {
            TypeExpr::List(target)
        } else {
            TypeExpr::Single(target)
        };
        let owner = model.attributes.push(attr("settings", ty));
        model.classes.insert(
            class.to_string(),
            ComplexTypeDescriptor {
                name: class.to_string(),
                xml_name: class.to_uppercase(),
                attributes: vec![owner],
                inner_classes: vec![InnerClassDescriptor {
                    name: "Settings".into(),
                    xml_name: "SETTINGS".into(),
                    attributes: inner_ids,
                    inner_classes: Vec::new(),
                    base_class: None,
                    provenance: Provenance::ComplexType(class.to_uppercase()),
                    original_name: None,
                    suppressed: false,
                    methods: Vec::new(),
                }],
                base_class: None,
                is_attribute: false,
                mixed: false,
                element_mappings: Vec::new(),
                description: None,
                generalizations: Vec::new(),
                methods: Vec::new(),
            },
        );
    }

    #[test]
    fn test_first_occurrence_keeps_name() {
        let mut model = ClassModel::new();
        class_with_settings(&mut model, "First", &["a"], false);
        class_with_settings(&mut model, "Second", &["b"], true);
        Unifier::new().run(&mut model).unwrap();

        assert_eq!(model.classes["First"].inner_classes[0].name, "Settings");
        let second = &model.classes["Second"];
        assert_eq!(second.inner_classes[0].name, "Settings_Second");
        assert_eq!(
            second.inner_classes[0].original_name.as_deref(),
            Some("Settings")
        );
        let owner = model.class_attribute("Second", "settings").unwrap();
        assert_eq!(
            owner.ty,
            TypeExpr::List(TypeTarget::Class("Settings_Second".into()))
        );
    }

    #[test]
    fn test_same_shape_is_suppressed() {
        let mut model = ClassModel::new();
        class_with_settings(&mut model, "First", &["a", "b"], false);
        class_with_settings(&mut model, "Second", &["b", "a"], false);
        Unifier::new().run(&mut model).unwrap();

        let second = &model.classes["Second"].inner_classes[0];
        assert!(second.suppressed);
        assert_eq!(second.name, "Settings");
        assert_eq!(model.emitted_inner_classes().len(), 1);
    }

    #[test]
    fn test_duplicate_of_renamed_is_redirected() {
        let mut model = ClassModel::new();
        class_with_settings(&mut model, "First", &["a"], false);
        class_with_settings(&mut model, "Second", &["b"], false);
        class_with_settings(&mut model, "Third", &["b"], false);
        Unifier::new().run(&mut model).unwrap();

        let third = &model.classes["Third"].inner_classes[0];
        assert!(third.suppressed);
        assert_eq!(third.name, "Settings_Second");
        let owner = model.class_attribute("Third", "settings").unwrap();
        assert_eq!(
            owner.ty.target(),
            &TypeTarget::Class("Settings_Second".into())
        );
    }

    #[test]
    fn test_rename_reaches_contributing_group() {
        let mut model = ClassModel::new();
        class_with_settings(&mut model, "First", &["a"], false);

        // Group SETTINGS-GROUP defines Settings { b }; class Second holds a copy
        let group_inner = vec![model.attributes.push(primitive("b"))];
        let group_owner = model.attributes.push(attr(
            "settings",
            TypeExpr::Single(TypeTarget::Class("Settings".into())),
        ));
        let provenance = Provenance::Group("SETTINGS-GROUP".into());
        let descriptor = InnerClassDescriptor {
            name: "Settings".into(),
            xml_name: "SETTINGS".into(),
            attributes: group_inner,
            inner_classes: Vec::new(),
            base_class: None,
            provenance,
            original_name: None,
            suppressed: false,
            methods: Vec::new(),
        };
        model.groups.insert(
            "SETTINGS-GROUP".into(),
            GroupDefinition {
                name: "SETTINGS-GROUP".into(),
                class_name: "SettingsGroup".into(),
                attributes: vec![group_owner],
                inner_classes: vec![descriptor.clone()],
                description: None,
                mixed: false,
                mixed_elements: Vec::new(),
                implementors: Vec::new(),
            },
        );
        class_with_settings(&mut model, "Second", &["b"], false);
        let copy = &mut model.classes.get_mut("Second").unwrap().inner_classes[0];
        copy.provenance = descriptor.provenance.clone();

        Unifier::new().run(&mut model).unwrap();

        let group = &model.groups["SETTINGS-GROUP"];
        assert_eq!(group.inner_classes[0].name, "Settings_Second");
        assert_eq!(
            group.inner_classes[0].original_name.as_deref(),
            Some("Settings")
        );
        let owner = model.group_attribute("SETTINGS-GROUP", "settings").unwrap();
        assert_eq!(
            owner.ty,
            TypeExpr::Single(TypeTarget::Class("Settings_Second".into()))
        );
    }

    #[test]
    fn test_rename_collision_is_ambiguous() {
        let mut model = ClassModel::new();
        class_with_settings(&mut model, "First", &["a"], false);
        class_with_settings(&mut model, "Second", &["b"], false);
        // A second inline SETTINGS in Second with yet another shape
        let extra = model.attributes.push(primitive("c"));
        let mut duplicate = model.classes["Second"].inner_classes[0].clone();
        duplicate.attributes = vec![extra];
        duplicate.name = "Settings".into();
        duplicate.original_name = None;
        model
            .classes
            .get_mut("Second")
            .unwrap()
            .inner_classes
            .push(duplicate);

        let err = Unifier::new().run(&mut model).unwrap_err();
        assert!(matches!(err, Error::AmbiguousInnerClass { .. }));
    }
}
