//! ComplexType resolver
//!
//! Builds one [`ComplexTypeDescriptor`] per named complex type, merging
//! simple-content values, attribute groups, expanded groups and the type's
//! own elements, then consolidating mixed content.

use super::attribute_groups::attributes_of;
use super::expander::{normalize_occurs, Expander, Expansion};
use super::types::{self, BaseResolution};
use super::{annotations, Session};
use crate::documents::Element;
use crate::error::{ReferenceKind, Result, SchemaReferenceError};
use crate::model::{
    repeating, AttrId, AttributeDescriptor, AttributeTable, ClassModel, ComplexTypeDescriptor,
    ElementMapping, InnerClassDescriptor, Provenance, SerializationTag, TypeExpr, TypeTarget,
};
use crate::names::local_name;
use std::collections::HashSet;

/// A resolved complex type and the groups its mixed content absorbed
#[derive(Debug)]
pub(crate) struct ResolvedComplexType {
    pub class: ComplexTypeDescriptor,
    pub mixed_sources: Vec<String>,
}

/// Resolve every named complex type in document order
pub(crate) fn resolve_all(session: &Session<'_>, model: &mut ClassModel) -> Result<()> {
    for (_, el) in session.index.complex_types() {
        let Some(resolved) = resolve(session, model, el)? else {
            continue;
        };
        for group in &resolved.mixed_sources {
            mark_mixed(model, group);
        }
        model
            .classes
            .insert(resolved.class.name.clone(), resolved.class);
    }
    Ok(())
}

fn is_mixed(el: &Element) -> bool {
    matches!(el.get_attribute("mixed"), Some("true") | Some("1"))
}

/// Resolve one complex type; anonymous types yield `None`
pub(crate) fn resolve(
    session: &Session<'_>,
    model: &mut ClassModel,
    el: &Element,
) -> Result<Option<ResolvedComplexType>> {
    let Some(xml_name) = el.get_attribute("name") else {
        return Ok(None);
    };
    let class_name = session.names.pascal(xml_name);
    let provenance = Provenance::ComplexType(xml_name.to_string());
    let expander = Expander::new(session);

    let mut attributes: Vec<AttrId> = Vec::new();
    let mut inner_classes: Vec<InnerClassDescriptor> = Vec::new();
    let mut base_class = None;
    let mut referenced_groups: Vec<String> = Vec::new();

    let push_all = |table: &mut AttributeTable, ids: &mut Vec<AttrId>, attrs: Vec<AttributeDescriptor>| {
        for attr in attrs {
            let attr = if attr.provenance.is_none() {
                attr.with_provenance(provenance.clone())
            } else {
                attr
            };
            ids.push(table.push(attr));
        }
    };

    let simple_ext = el
        .find_child("simpleContent")
        .and_then(|sc| sc.find_child("extension").or_else(|| sc.find_child("restriction")));
    if let Some(ext) = simple_ext {
        if let Some(base) = ext.get_attribute("base") {
            match types::resolve_base(session, base, ext, xml_name)? {
                BaseResolution::Class(class) => base_class = Some(class),
                BaseResolution::Value(resolved) => {
                    let value = resolved.into_value_attribute(local_name(base), xml_name);
                    attributes.push(model.attributes.push(value));
                }
            }
        }
        let merged = attributes_of(session, ext, xml_name)?;
        push_all(&mut model.attributes, &mut attributes, merged);
    }

    let complex_content = el.find_child("complexContent");
    let complex_ext = complex_content
        .and_then(|cc| cc.find_child("extension").or_else(|| cc.find_child("restriction")));
    if let Some(ext) = complex_ext {
        if let (true, Some(base)) = (ext.is("extension"), ext.get_attribute("base")) {
            if let BaseResolution::Class(class) = types::resolve_base(session, base, ext, xml_name)? {
                base_class = Some(class);
            }
        }
        let merged = attributes_of(session, ext, xml_name)?;
        push_all(&mut model.attributes, &mut attributes, merged);
    }

    let merged = attributes_of(session, el, xml_name)?;
    push_all(&mut model.attributes, &mut attributes, merged);

    for holder in std::iter::once(el).chain(complex_ext) {
        for particle in &holder.children {
            match particle.local_name() {
                "sequence" | "choice" | "all" => {
                    let max = normalize_occurs(particle.get_attribute("maxOccurs").unwrap_or("1"));
                    let choice_depth = usize::from(particle.is("choice"));
                    for child in &particle.children {
                        if let (true, Some(group)) = (child.is("group"), child.get_attribute("ref")) {
                            merge_group(
                                model,
                                group,
                                &max,
                                xml_name,
                                &mut attributes,
                                &mut inner_classes,
                            )?;
                            referenced_groups.push(local_name(group).to_string());
                            continue;
                        }
                        let expansion =
                            expander.expand_particle(xml_name, &provenance, child, &max, choice_depth)?;
                        let expansion = skip_mixed_groups(model, expansion, &mut referenced_groups);
                        let (ids, inner) = expansion.intern(&mut model.attributes, &provenance);
                        attributes.extend(ids);
                        inner_classes.extend(inner);
                    }
                }
                "group" => {
                    if let Some(group) = particle.get_attribute("ref") {
                        merge_group(
                            model,
                            group,
                            "1",
                            xml_name,
                            &mut attributes,
                            &mut inner_classes,
                        )?;
                        referenced_groups.push(local_name(group).to_string());
                    }
                }
                _ => {}
            }
        }
    }

    let mut seen = HashSet::new();
    attributes.retain(|id| {
        model
            .attributes
            .get(*id)
            .map(|a| seen.insert(a.name.clone()))
            .unwrap_or(false)
    });
    let mut seen = HashSet::new();
    inner_classes.retain(|ic| seen.insert(ic.name.clone()));

    let mixed = is_mixed(el) || complex_content.map(is_mixed).unwrap_or(false);
    let mut element_mappings = Vec::new();
    let mut mixed_sources = Vec::new();
    if mixed {
        let consolidated = consolidate_mixed(
            session,
            model,
            &class_name,
            &provenance,
            attributes,
            &referenced_groups,
        );
        attributes = consolidated.attributes;
        element_mappings = consolidated.element_mappings;
        mixed_sources = consolidated.sources;

        let referenced: HashSet<&str> = model
            .attributes_of(&attributes)
            .filter_map(|a| a.ty.target().class_name())
            .collect();
        inner_classes.retain(|ic| referenced.contains(ic.name.as_str()));
    }

    tracing::debug!(
        class = %class_name,
        attributes = attributes.len(),
        inner_classes = inner_classes.len(),
        mixed,
        "resolved complex type"
    );

    Ok(Some(ResolvedComplexType {
        class: ComplexTypeDescriptor {
            name: class_name,
            xml_name: xml_name.to_string(),
            attributes,
            inner_classes,
            base_class,
            is_attribute: annotations::is_attribute_facade(el),
            mixed,
            element_mappings,
            description: annotations::description(el),
            generalizations: Vec::new(),
            methods: Vec::new(),
        },
        mixed_sources,
    }))
}

/// Copy an expanded group's attributes into a class
///
/// Under a repeating particle every merged attribute becomes a collection
/// with the particle's `maxOccurs`.
fn merge_group(
    model: &mut ClassModel,
    group: &str,
    max_occurs: &str,
    referenced_from: &str,
    attributes: &mut Vec<AttrId>,
    inner_classes: &mut Vec<InnerClassDescriptor>,
) -> Result<()> {
    let local = local_name(group);
    let definition = model.groups.get(local).ok_or_else(|| {
        SchemaReferenceError::new(ReferenceKind::Group, local).with_referenced_from(referenced_from)
    })?;
    if definition.mixed {
        return Ok(());
    }

    let source_ids = definition.attributes.clone();
    let source_inner = definition.inner_classes.clone();
    let promote = repeating(max_occurs);

    for id in source_ids {
        let derived = model.attributes.derive(id, |mut attr| {
            if promote {
                attr.ty = attr.ty.into_list();
                attr.max_occurs = max_occurs.to_string();
            }
            attr
        });
        attributes.extend(derived);
    }
    for inner in &source_inner {
        inner_classes.push(copy_inner_class(&mut model.attributes, inner));
    }
    Ok(())
}

/// Drop what groups already sourced into mixed content contribute to an
/// expanded particle
///
/// Groups reached through nested particles are recorded in
/// `referenced_groups`, like direct references.
fn skip_mixed_groups(
    model: &ClassModel,
    mut expansion: Expansion,
    referenced_groups: &mut Vec<String>,
) -> Expansion {
    fn group_of(attr: &AttributeDescriptor) -> Option<&str> {
        attr.provenance.as_ref().and_then(Provenance::group)
    }

    for group in expansion.attributes.iter().filter_map(group_of) {
        if !referenced_groups.iter().any(|g| g == group) {
            referenced_groups.push(group.to_string());
        }
    }

    let before = expansion.attributes.len();
    expansion.attributes.retain(|attr| {
        !group_of(attr)
            .and_then(|g| model.groups.get(g))
            .map(|g| g.mixed)
            .unwrap_or(false)
    });
    if expansion.attributes.len() != before {
        let referenced: HashSet<&str> = expansion
            .attributes
            .iter()
            .filter_map(|a| a.ty.target().class_name())
            .collect();
        let inner_classes = std::mem::take(&mut expansion.inner_classes);
        expansion.inner_classes = inner_classes
            .into_iter()
            .filter(|ic| referenced.contains(ic.name.as_str()))
            .collect();
    }
    expansion
}

/// Deep copy of an inner class with its own attribute rows
fn copy_inner_class(table: &mut AttributeTable, inner: &InnerClassDescriptor) -> InnerClassDescriptor {
    let attributes = inner
        .attributes
        .iter()
        .filter_map(|id| table.derive(*id, |attr| attr))
        .collect();
    let nested = inner
        .inner_classes
        .iter()
        .map(|ic| copy_inner_class(table, ic))
        .collect();
    InnerClassDescriptor {
        attributes,
        inner_classes: nested,
        ..inner.clone()
    }
}

struct MixedContent {
    attributes: Vec<AttrId>,
    element_mappings: Vec<ElementMapping>,
    sources: Vec<String>,
}

/// Replace element attributes with one `content` collection
fn consolidate_mixed(
    session: &Session<'_>,
    model: &mut ClassModel,
    class_name: &str,
    provenance: &Provenance,
    attributes: Vec<AttrId>,
    referenced_groups: &[String],
) -> MixedContent {
    let mut kept = Vec::new();
    let mut element_names: Vec<String> = Vec::new();
    let mut sources: Vec<String> = Vec::new();

    for id in attributes {
        let Some(attr) = model.attributes.get(id) else {
            continue;
        };
        match attr.tag.element_name() {
            Some(element) => {
                if !element_names.iter().any(|n| n == element) {
                    element_names.push(element.to_string());
                }
                if let Some(group) = attr.provenance.as_ref().and_then(Provenance::group) {
                    if !sources.iter().any(|g| g == group) {
                        sources.push(group.to_string());
                    }
                }
            }
            None => kept.push(id),
        }
    }

    for group in referenced_groups {
        if let Some(definition) = model.groups.get(group).filter(|g| g.mixed) {
            for element in &definition.mixed_elements {
                if !element_names.contains(element) {
                    element_names.push(element.clone());
                }
            }
        }
    }

    let element_mappings = element_names
        .iter()
        .map(|element| ElementMapping {
            element_name: element.clone(),
            element_type: session
                .config
                .mixed_element_types
                .get(element)
                .cloned()
                .unwrap_or_else(|| session.names.pascal(element)),
            complex_type: class_name.to_string(),
        })
        .collect();

    let content = AttributeDescriptor::new(
        "content",
        TypeExpr::List(TypeTarget::Content),
        SerializationTag::MixedContent { element_names },
    )
    .with_occurs("0", "unbounded")
    .with_provenance(provenance.clone());
    kept.push(model.attributes.push(content));

    MixedContent {
        attributes: kept,
        element_mappings,
        sources,
    }
}

/// Mark a group as sourced into mixed content
///
/// Later merges of the group contribute no element attributes.
fn mark_mixed(model: &mut ClassModel, group: &str) {
    let ClassModel {
        attributes, groups, ..
    } = model;
    let Some(definition) = groups.get_mut(group) else {
        return;
    };
    if definition.mixed {
        return;
    }

    let mut elements = Vec::new();
    for attr in attributes.resolve(&definition.attributes) {
        if let Some(element) = attr.tag.element_name() {
            if !elements.iter().any(|e: &String| e == element) {
                elements.push(element.to_string());
            }
        }
    }

    definition.mixed = true;
    definition.mixed_elements = elements;
    definition.attributes.clear();
    definition.inner_classes.clear();
    tracing::debug!(group = %group, "group sourced into mixed content");
}
