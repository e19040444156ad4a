//! Reference and wrapper resolver
//!
//! Indirection types (`*Ref`, `*Iref`, `*Tref`) point at other elements. A
//! class holding such an attribute gets a lookup accessor for it, and when
//! the indirection type has a polymorphic `dest` attribute, one typed
//! accessor per legal destination subtype. The accessors live on the owning
//! class because the indirection type alone cannot know its runtime target.
//!
//! After the accessors are built, class targets with a registered wrapper are
//! rewritten to the wrapper type.

use super::Session;
use crate::config::WrapperPolicy;
use crate::error::CompileWarning;
use crate::model::{
    AttrId, AttributeDescriptor, AttributeTable, ClassModel, DynamicMethod, InnerClassDescriptor,
    SerializationTag, TypeTarget,
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

const INDIRECTION_SUFFIXES: [&str; 3] = ["Ref", "Iref", "Tref"];
const DEST_ATTRIBUTE: &str = "dest";
const SUBTYPES_ENUM_SUFFIX: &str = "-SUBTYPES-ENUM";

static CAPITALIZED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][^A-Z]*").unwrap());

/// Class name without a unification suffix (`FooRef_Owner` -> `FooRef`)
fn base_name(class_name: &str) -> &str {
    class_name.split('_').next().unwrap_or(class_name)
}

/// Whether a class name follows the indirection naming convention
pub fn is_indirection(class_name: &str) -> bool {
    let base = base_name(class_name);
    INDIRECTION_SUFFIXES.iter().any(|s| base.ends_with(s))
}

/// Accessor name for a collection of references (`targetRefs` -> `Targets`)
fn list_method_name(attribute: &str) -> String {
    let stripped = INDIRECTION_SUFFIXES
        .iter()
        .fold(attribute.to_string(), |acc, s| acc.replace(s, ""));
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Subtype family of a `dest` attribute's enumeration
fn enum_family(attr: &AttributeDescriptor) -> Option<String> {
    if let Some(schema_type) = &attr.schema_type {
        return Some(
            schema_type
                .strip_suffix(SUBTYPES_ENUM_SUFFIX)
                .unwrap_or(schema_type)
                .to_string(),
        );
    }
    // Identifier form: FooBarSubtypesEnum -> FOO-BAR
    let identifier = attr.ty.target().to_string().replace("SubtypesEnum", "");
    let words: Vec<&str> = CAPITALIZED_WORD
        .find_iter(&identifier)
        .map(|m| m.as_str())
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("-").to_uppercase())
    }
}

/// Legal destinations of one indirection class
#[derive(Debug, Clone)]
struct Destinations {
    subtypes: Vec<String>,
    tag_name: Option<String>,
}

/// Build the wrapper registry, synthesize accessors and apply wrapper types
pub(crate) fn resolve(session: &Session<'_>, model: &mut ClassModel) {
    model.wrappers = wrapper_registry(&session.config.wrappers, model);

    let destinations = destinations(session, model);
    let excluded: HashSet<String> = session
        .indexes
        .complex_refs
        .names()
        .iter()
        .map(|n| session.names.pascal(n))
        .collect();

    let ClassModel {
        attributes,
        classes,
        wrappers,
        ..
    } = model;

    let mut lookups = 0;
    for class in classes.values_mut() {
        if !is_indirection(&class.name) {
            class.methods = owner_methods(
                session,
                attributes,
                &class.attributes,
                &destinations,
                &excluded,
                wrappers,
            );
            lookups += class.methods.len();
        }
        let mut pending: Vec<&mut InnerClassDescriptor> =
            class.inner_classes.iter_mut().collect();
        while let Some(inner) = pending.pop() {
            if inner.is_emitted() && !is_indirection(&inner.name) {
                inner.methods = owner_methods(
                    session,
                    attributes,
                    &inner.attributes,
                    &destinations,
                    &excluded,
                    wrappers,
                );
                lookups += inner.methods.len();
            }
            pending.extend(inner.inner_classes.iter_mut());
        }
    }

    let rewritten = apply_wrappers(attributes, wrappers);
    tracing::debug!(
        wrappers = wrappers.len(),
        lookups,
        rewritten,
        "resolved references"
    );
}

/// Complex types that get a wrapper, fixed before any rewriting
fn wrapper_registry(policy: &WrapperPolicy, model: &ClassModel) -> BTreeSet<String> {
    let known: BTreeSet<String> = model.classes.keys().cloned().collect();

    match policy {
        WrapperPolicy::Disabled => BTreeSet::new(),
        WrapperPolicy::AllClasses => known,
        WrapperPolicy::Only { names } => names.intersection(&known).cloned().collect(),
    }
}

/// Destination subtypes of every indirection class with a `dest` attribute
fn destinations(session: &Session<'_>, model: &ClassModel) -> IndexMap<String, Destinations> {
    let mut out = IndexMap::new();
    for class in model.classes.values() {
        if !is_indirection(&class.name) {
            continue;
        }
        let Some(dest) = model
            .attributes_of(&class.attributes)
            .find(|a| a.name == DEST_ATTRIBUTE)
        else {
            continue;
        };
        let Some(family) = enum_family(dest) else {
            continue;
        };

        let subtypes = match session.indexes.subtypes.subtypes(&family) {
            Some(members) => members.iter().map(|m| session.names.pascal(m)).collect(),
            None => {
                session.warn(CompileWarning::MissingSubtypeFamily {
                    family: family.clone(),
                    class_name: class.name.clone(),
                });
                Vec::new()
            }
        };

        // Last matching record wins
        let dest_type = dest.ty.target().to_string();
        let tag_name = session
            .indexes
            .tags
            .records()
            .iter()
            .filter(|r| {
                session.names.pascal(&r.element_class) == base_name(&class.name)
                    && session.names.pascal(&r.simple_type_name) == dest_type
            })
            .last()
            .map(|r| r.tag_name.clone());

        out.insert(class.name.clone(), Destinations { subtypes, tag_name });
    }
    out
}

/// Element tag of a reference whose tag differs from its type name
///
/// Matches on the indirection class alone; the last matching record wins.
fn reference_tag(session: &Session<'_>, target: &str) -> Option<String> {
    session
        .indexes
        .tags
        .records()
        .iter()
        .filter(|r| session.names.pascal(&r.element_class) == base_name(target))
        .last()
        .map(|r| r.tag_name.clone())
}

/// Accessors for one non-indirection owner
fn owner_methods(
    session: &Session<'_>,
    table: &AttributeTable,
    attribute_ids: &[AttrId],
    destinations: &IndexMap<String, Destinations>,
    excluded: &HashSet<String>,
    wrappers: &BTreeSet<String>,
) -> Vec<DynamicMethod> {
    let mut methods = Vec::new();

    for attr in table.resolve(attribute_ids) {
        if let SerializationTag::MixedContent { element_names } = &attr.tag {
            for element in element_names {
                methods.push(DynamicMethod::ContentAccessor {
                    element_name: element.clone(),
                    returns: session
                        .config
                        .mixed_element_types
                        .get(element)
                        .cloned()
                        .unwrap_or_else(|| session.names.pascal(element)),
                });
            }
            continue;
        }

        let TypeTarget::Class(target) = attr.ty.target() else {
            continue;
        };
        if !is_indirection(target) || excluded.contains(base_name(target)) {
            continue;
        }

        let list = attr.ty.is_list();
        let found = destinations.get(target);
        let tag_name = found
            .and_then(|d| d.tag_name.clone())
            .or_else(|| reference_tag(session, target));
        methods.push(DynamicMethod::ReferenceLookup {
            attribute: attr.name.clone(),
            method: if list {
                list_method_name(&attr.name)
            } else {
                attr.name.clone()
            },
            target: target.clone(),
            list,
            tag_name: tag_name.clone(),
        });

        for subtype in found.map(|d| d.subtypes.as_slice()).unwrap_or_default() {
            let returns = if wrappers.contains(subtype) {
                TypeTarget::Wrapper(subtype.clone())
            } else {
                TypeTarget::Class(subtype.clone())
            };
            methods.push(DynamicMethod::DestinationLookup {
                via_attribute: attr.name.clone(),
                subtype: subtype.clone(),
                returns,
                list,
                tag_name: tag_name.clone(),
            });
        }
    }

    methods
}

/// Rewrite registered class targets to their wrappers; returns the count
fn apply_wrappers(table: &mut AttributeTable, wrappers: &BTreeSet<String>) -> usize {
    let mut rewritten = 0;
    for attr in table.iter_mut() {
        let wrapped = matches!(attr.ty.target(), TypeTarget::Class(name) if wrappers.contains(name));
        if wrapped {
            attr.ty = attr.ty.clone().map_target(|t| match t {
                TypeTarget::Class(name) => TypeTarget::Wrapper(name),
                other => other,
            });
            rewritten += 1;
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeExpr;

    #[test]
    fn test_is_indirection() {
        assert!(is_indirection("FooRef"));
        assert!(is_indirection("FooIref"));
        assert!(is_indirection("FooTref"));
        assert!(is_indirection("FooRef_Owner"));
        assert!(!is_indirection("Owner_FooRef"));
        assert!(!is_indirection("Reference"));
    }

    #[test]
    fn test_list_method_name() {
        assert_eq!(list_method_name("targetRefs"), "Targets");
        assert_eq!(list_method_name("contextIref"), "Context");
    }

    #[test]
    fn test_enum_family() {
        let attr = AttributeDescriptor::new(
            "dest",
            TypeExpr::Single(TypeTarget::Enum("BarSubtypesEnum".into())),
            SerializationTag::Attribute { name: "DEST".into() },
        );
        assert_eq!(enum_family(&attr).as_deref(), Some("BAR"));

        let attr = attr.with_schema_type("PORT-PROTOTYPE-SUBTYPES-ENUM");
        assert_eq!(enum_family(&attr).as_deref(), Some("PORT-PROTOTYPE"));
    }

    #[test]
    fn test_apply_wrappers_keeps_list_shape() {
        let mut table = AttributeTable::new();
        let list = table.push(AttributeDescriptor::new(
            "alphas",
            TypeExpr::List(TypeTarget::Class("Alpha".into())),
            SerializationTag::element("ALPHAS"),
        ));
        let other = table.push(AttributeDescriptor::new(
            "beta",
            TypeExpr::Single(TypeTarget::Class("Beta".into())),
            SerializationTag::element("BETA"),
        ));
        let wrappers = BTreeSet::from(["Alpha".to_string()]);

        assert_eq!(apply_wrappers(&mut table, &wrappers), 1);
        assert_eq!(
            table.get(list).unwrap().ty,
            TypeExpr::List(TypeTarget::Wrapper("Alpha".into()))
        );
        assert_eq!(
            table.get(other).unwrap().ty,
            TypeExpr::Single(TypeTarget::Class("Beta".into()))
        );
    }
}
