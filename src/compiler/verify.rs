//! Final model check
//!
//! Every class, wrapper and enum target named by an attribute must exist in
//! the finished model, and emitted inner classes must have unique names.

use crate::error::{Error, ReferenceKind, Result, SchemaReferenceError};
use crate::model::{AttrId, ClassModel, InnerClassDescriptor, TypeTarget};
use std::collections::HashSet;

struct Known<'m> {
    classes: HashSet<&'m str>,
    enums: HashSet<&'m str>,
}

impl<'m> Known<'m> {
    fn collect(model: &'m ClassModel) -> Self {
        fn walk<'m>(inner: &'m [InnerClassDescriptor], out: &mut HashSet<&'m str>) {
            for ic in inner {
                out.insert(ic.name.as_str());
                walk(&ic.inner_classes, out);
            }
        }

        let mut classes: HashSet<&str> = model.classes.keys().map(String::as_str).collect();
        for class in model.classes.values() {
            walk(&class.inner_classes, &mut classes);
        }
        for group in model.groups.values() {
            walk(&group.inner_classes, &mut classes);
        }

        let enums = model
            .simple_types
            .values()
            .filter(|st| st.is_enumeration())
            .map(|st| st.name.as_str())
            .collect();

        Self { classes, enums }
    }

    fn contains(&self, target: &TypeTarget) -> bool {
        match target {
            TypeTarget::Class(name) | TypeTarget::Wrapper(name) => {
                self.classes.contains(name.as_str())
            }
            TypeTarget::Enum(name) => self.enums.contains(name.as_str()),
            TypeTarget::Primitive(_) | TypeTarget::Content => true,
        }
    }
}

fn check(model: &ClassModel, known: &Known<'_>, owner: &str, ids: &[AttrId]) -> Result<()> {
    for attr in model.attributes_of(ids) {
        let target = attr.ty.target();
        if !known.contains(target) {
            return Err(SchemaReferenceError::new(ReferenceKind::Type, target.to_string())
                .with_referenced_from(owner)
                .into());
        }
    }
    Ok(())
}

fn check_inner(model: &ClassModel, known: &Known<'_>, inner: &[InnerClassDescriptor]) -> Result<()> {
    for ic in inner {
        check(model, known, &ic.name, &ic.attributes)?;
        check_inner(model, known, &ic.inner_classes)?;
    }
    Ok(())
}

/// Check that the finished model is closed under its type references
pub(crate) fn verify(model: &ClassModel) -> Result<()> {
    let known = Known::collect(model);

    for group in model.groups.values() {
        check(model, &known, &group.name, &group.attributes)?;
        check_inner(model, &known, &group.inner_classes)?;
    }
    for class in model.classes.values() {
        check(model, &known, &class.name, &class.attributes)?;
        if let Some(base) = &class.base_class {
            if !known.classes.contains(base.as_str()) {
                return Err(SchemaReferenceError::new(ReferenceKind::BaseType, base.clone())
                    .with_referenced_from(class.name.clone())
                    .into());
            }
        }
        check_inner(model, &known, &class.inner_classes)?;
    }

    let mut emitted = HashSet::new();
    for class in model.classes.values() {
        let mut pending: Vec<&InnerClassDescriptor> = class.inner_classes.iter().collect();
        while let Some(ic) = pending.pop() {
            if ic.is_emitted() && !emitted.insert(ic.name.as_str()) {
                return Err(Error::AmbiguousInnerClass {
                    name: ic.original_name.clone().unwrap_or_else(|| ic.name.clone()),
                    enclosing: class.name.clone(),
                    reason: format!("'{}' is emitted more than once", ic.name),
                });
            }
            pending.extend(ic.inner_classes.iter());
        }
    }

    tracing::debug!(
        classes = known.classes.len(),
        enums = known.enums.len(),
        "verified model"
    );
    Ok(())
}
