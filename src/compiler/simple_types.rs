//! Simple type describer
//!
//! Every named `simpleType` becomes either an enumeration (a model entity that
//! attributes can reference) or a restriction of a primitive, following the
//! derivation chain through local simple types down to an XSD built-in.

use super::annotations;
use super::types::{builtin, is_builtin_reference};
use super::Session;
use crate::documents::Element;
use crate::error::{ReferenceKind, Result, SchemaReferenceError};
use crate::model::{SimpleTypeDescriptor, SimpleTypeKind, TypeTarget};
use crate::names::local_name;
use crate::typemap::PRIMITIVE_STRING;
use indexmap::IndexMap;

fn text_restriction() -> SimpleTypeKind {
    SimpleTypeKind::Restriction {
        primitive: TypeTarget::Primitive(PRIMITIVE_STRING.to_string()),
        pattern: None,
    }
}

/// Describe every named simple type, in document order
pub(crate) fn describe_all(session: &Session<'_>) -> Result<IndexMap<String, SimpleTypeDescriptor>> {
    let mut described = IndexMap::new();
    for (xml_name, el) in session.index.simple_types() {
        let kind = describe(session, el, xml_name, 0)?;
        described.insert(
            xml_name.to_string(),
            SimpleTypeDescriptor {
                name: session.names.pascal(xml_name),
                xml_name: xml_name.to_string(),
                kind,
                description: annotations::description(el),
            },
        );
    }
    tracing::debug!(count = described.len(), "described simple types");
    Ok(described)
}

/// Describe one `simpleType` element
///
/// `owner` names the definition being described, for error context. `depth`
/// counts derivation steps taken so far.
pub(crate) fn describe(
    session: &Session<'_>,
    el: &Element,
    owner: &str,
    depth: usize,
) -> Result<SimpleTypeKind> {
    session.limits.check_derivation_depth(depth, owner)?;

    let Some(restriction) = el.find_child("restriction") else {
        // list, union, or no derivation at all
        return Ok(text_restriction());
    };

    let literals: Vec<String> = restriction
        .find_children("enumeration")
        .filter_map(|e| e.get_attribute("value"))
        .map(str::to_string)
        .collect();
    if !literals.is_empty() {
        return Ok(SimpleTypeKind::Enumeration { literals });
    }

    let pattern = restriction
        .find_child("pattern")
        .and_then(|p| p.get_attribute("value"))
        .map(str::to_string);

    let base = if let Some(base) = restriction.get_attribute("base") {
        describe_base(session, base, restriction, owner, depth)?
    } else if let Some(inline) = restriction.find_child("simpleType") {
        describe(session, inline, owner, depth + 1)?
    } else {
        text_restriction()
    };

    Ok(match base {
        // Restricting an enumeration without new literals keeps the base's literals
        SimpleTypeKind::Enumeration { literals } => SimpleTypeKind::Enumeration { literals },
        SimpleTypeKind::Restriction {
            primitive,
            pattern: inherited,
        } => SimpleTypeKind::Restriction {
            primitive,
            pattern: pattern.or(inherited),
        },
    })
}

fn describe_base(
    session: &Session<'_>,
    base: &str,
    scope: &Element,
    owner: &str,
    depth: usize,
) -> Result<SimpleTypeKind> {
    let local = local_name(base);

    if let Some(primitive) = session.primitives.override_for(local) {
        return Ok(SimpleTypeKind::Restriction {
            primitive,
            pattern: None,
        });
    }
    if is_builtin_reference(session, base, scope) {
        return Ok(SimpleTypeKind::Restriction {
            primitive: builtin(session, local),
            pattern: None,
        });
    }
    if let Some(simple) = session.index.simple_type(local) {
        return describe(session, simple, owner, depth + 1);
    }

    Err(SchemaReferenceError::new(ReferenceKind::BaseType, local)
        .with_referenced_from(owner)
        .into())
}
