//! `attribute` and `attributeGroup` handling

use super::types::{self, ResolvedType};
use super::{annotations, Session};
use crate::documents::Element;
use crate::error::{CompileWarning, Result};
use crate::model::{AttributeDescriptor, Provenance, SerializationTag};
use crate::names::local_name;

/// Attributes declared directly on `holder`, in document order
///
/// Covers `attribute` children and `attributeGroup` references.
pub(crate) fn attributes_of(
    session: &Session<'_>,
    holder: &Element,
    owner: &str,
) -> Result<Vec<AttributeDescriptor>> {
    let mut out = Vec::new();
    let mut stack = Vec::new();
    for child in &holder.children {
        match child.local_name() {
            "attribute" => out.extend(attribute(session, child, owner)?),
            "attributeGroup" => {
                if let Some(name) = child.get_attribute("ref") {
                    out.extend(attribute_group(session, name, owner, &mut stack)?);
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

/// One XML attribute declaration
pub(crate) fn attribute(
    session: &Session<'_>,
    el: &Element,
    owner: &str,
) -> Result<Option<AttributeDescriptor>> {
    let Some(xml_name) = el
        .get_attribute("name")
        .or_else(|| el.get_attribute("ref").map(local_name))
    else {
        return Ok(None);
    };
    let usage = el.get_attribute("use").unwrap_or("optional");
    if usage == "prohibited" {
        return Ok(None);
    }

    let ty = el.get_attribute("type");
    let resolved = if let Some(ty) = ty {
        types::resolve(session, ty, el, owner)?
    } else if let Some(inline) = el.find_child("simpleType") {
        types::resolve_inline(session, inline, owner)?
    } else {
        ResolvedType::string()
    };

    let min_occurs = if usage == "required" { "1" } else { "0" };
    let mut attr = resolved
        .into_attribute(
            session.names.camel(xml_name),
            SerializationTag::Attribute {
                name: xml_name.to_string(),
            },
            min_occurs,
            "1",
        )
        .with_description(annotations::description(el));
    attr.schema_type = ty.map(|t| local_name(t).to_string());
    Ok(Some(attr))
}

/// Attributes of a named attribute group, following nested references
pub(crate) fn attribute_group(
    session: &Session<'_>,
    name: &str,
    referenced_from: &str,
    stack: &mut Vec<String>,
) -> Result<Vec<AttributeDescriptor>> {
    let local = local_name(name).to_string();
    if stack.contains(&local) {
        session.warn(CompileWarning::RecursiveGroup { group: local });
        return Ok(Vec::new());
    }
    let el = session.index.lookup_attribute_group(name, referenced_from)?;

    stack.push(local.clone());
    let mut out = Vec::new();
    for child in &el.children {
        match child.local_name() {
            "attribute" => {
                if let Some(attr) = attribute(session, child, &local)? {
                    out.push(attr.with_provenance(Provenance::AttributeGroup(local.clone())));
                }
            }
            "attributeGroup" => {
                if let Some(nested) = child.get_attribute("ref") {
                    out.extend(attribute_group(session, nested, &local, stack)?);
                }
            }
            _ => {}
        }
    }
    stack.pop();

    Ok(out)
}
