//! Group expander
//!
//! Flattens `group`, `sequence` and `choice` content into an ordered attribute
//! list with resolved cardinalities. The walk is pure: every call returns an
//! [`Expansion`] and the caller merges it, so each nesting level can be
//! examined on its own. Attributes only enter the canonical table when the
//! caller interns the finished expansion.
//!
//! Multiplicity rule: an element without `maxOccurs` takes the value
//! inherited from the enclosing construct. An explicit value is kept unless
//! the inherited value already repeats. A `choice` replaces the inherited
//! value with its own `maxOccurs` (default `1`) for its body.

use super::attribute_groups::attributes_of;
use super::types::{self, BaseResolution, ResolvedType};
use super::{annotations, Session};
use crate::documents::Element;
use crate::error::{CompileWarning, Result};
use crate::model::{
    repeating, AttrId, AttributeDescriptor, AttributeTable, InnerClassDescriptor, Provenance,
    SerializationTag, TypeExpr, TypeTarget,
};
use crate::names::{local_name, pluralize};
use std::collections::HashSet;

/// Normalize a `minOccurs`/`maxOccurs` value
pub(crate) fn normalize_occurs(value: &str) -> String {
    let value = value.trim();
    match value.parse::<u64>() {
        Ok(n) => n.to_string(),
        Err(_) => value.to_string(),
    }
}

/// Effective `maxOccurs` of a particle given the value inherited from its parent
pub(crate) fn effective_max(own: Option<&str>, inherited: &str) -> String {
    match own {
        None => inherited.to_string(),
        Some(_) if repeating(inherited) => inherited.to_string(),
        Some(own) => normalize_occurs(own),
    }
}

/// Result of expanding a piece of content
#[derive(Debug, Clone, Default)]
pub(crate) struct Expansion {
    pub attributes: Vec<AttributeDescriptor>,
    pub inner_classes: Vec<InnerClassDraft>,
}

impl Expansion {
    fn extend(&mut self, other: Expansion) {
        self.attributes.extend(other.attributes);
        self.inner_classes.extend(other.inner_classes);
    }

    /// Drop later entries whose name was already seen
    pub fn dedup(mut self) -> Self {
        let mut seen = HashSet::new();
        self.attributes.retain(|a| seen.insert(a.name.clone()));
        let mut seen = HashSet::new();
        self.inner_classes.retain(|ic| seen.insert(ic.name.clone()));
        self
    }

    /// Move the expansion into the attribute table
    ///
    /// Attributes without a provenance get `provenance`.
    pub fn intern(
        self,
        table: &mut AttributeTable,
        provenance: &Provenance,
    ) -> (Vec<AttrId>, Vec<InnerClassDescriptor>) {
        let ids = intern_attributes(table, self.attributes, provenance);
        let inner = self
            .inner_classes
            .into_iter()
            .map(|draft| draft.intern(table))
            .collect();
        (ids, inner)
    }
}

fn intern_attributes(
    table: &mut AttributeTable,
    attributes: Vec<AttributeDescriptor>,
    provenance: &Provenance,
) -> Vec<AttrId> {
    attributes
        .into_iter()
        .map(|mut attr| {
            if attr.provenance.is_none() {
                attr.provenance = Some(provenance.clone());
            }
            table.push(attr)
        })
        .collect()
}

/// An inner class before its attributes are interned
#[derive(Debug, Clone)]
pub(crate) struct InnerClassDraft {
    pub name: String,
    pub xml_name: String,
    pub attributes: Vec<AttributeDescriptor>,
    pub inner_classes: Vec<InnerClassDraft>,
    pub base_class: Option<String>,
    pub provenance: Provenance,
}

impl InnerClassDraft {
    /// A plain wrapper around exactly one child element
    fn is_flattenable(&self) -> bool {
        self.base_class.is_none()
            && self.attributes.len() == 1
            && matches!(
                self.attributes[0].tag,
                SerializationTag::Element { wrapper: None, .. }
            )
    }

    fn intern(self, table: &mut AttributeTable) -> InnerClassDescriptor {
        let provenance = Provenance::InnerClass(self.xml_name.clone());
        let attributes = intern_attributes(table, self.attributes, &provenance);
        InnerClassDescriptor {
            name: self.name,
            xml_name: self.xml_name,
            attributes,
            inner_classes: self
                .inner_classes
                .into_iter()
                .map(|draft| draft.intern(table))
                .collect(),
            base_class: self.base_class,
            provenance: self.provenance,
            original_name: None,
            suppressed: false,
            methods: Vec::new(),
        }
    }
}

/// State of one walk: the component being compiled and the groups entered
#[derive(Debug, Clone)]
struct Walk {
    owner: String,
    stack: Vec<String>,
    inner_depth: usize,
    provenance: Provenance,
}

impl Walk {
    fn new(owner: &str, provenance: Provenance) -> Self {
        Self {
            owner: owner.to_string(),
            stack: Vec::new(),
            inner_depth: 0,
            provenance,
        }
    }

    /// Innermost definition, for error context
    fn current(&self) -> &str {
        self.stack.last().unwrap_or(&self.owner)
    }
}

/// Recursive content expander bound to one compilation session
pub(crate) struct Expander<'s, 'a> {
    session: &'s Session<'a>,
}

impl<'s, 'a> Expander<'s, 'a> {
    pub fn new(session: &'s Session<'a>) -> Self {
        Self { session }
    }

    /// Expand a named group with an inherited `maxOccurs`
    pub fn expand(&self, group: &str, inherited: &str) -> Result<Expansion> {
        let local = local_name(group);
        let mut walk = Walk::new(local, Provenance::Group(local.to_string()));
        self.group(&mut walk, group, inherited)
    }

    /// Expand one particle of a complex type's content
    pub fn expand_particle(
        &self,
        owner: &str,
        provenance: &Provenance,
        particle: &Element,
        inherited: &str,
        choice_depth: usize,
    ) -> Result<Expansion> {
        let mut walk = Walk::new(owner, provenance.clone());
        self.particle(&mut walk, particle, inherited, choice_depth)
            .map(Expansion::dedup)
    }

    fn group(&self, walk: &mut Walk, name: &str, inherited: &str) -> Result<Expansion> {
        let local = local_name(name).to_string();
        if walk.stack.contains(&local) {
            self.session
                .warn(CompileWarning::RecursiveGroup { group: local });
            return Ok(Expansion::default());
        }
        let el = self.session.index.lookup_group(name, walk.current())?;

        // Attributes belong to the outermost group of a content model, inner
        // classes to the group that defines them
        let outermost = walk.stack.is_empty() && walk.inner_depth == 0;
        let enclosing = std::mem::replace(&mut walk.provenance, Provenance::Group(local.clone()));
        walk.stack.push(local.clone());
        let result = self.particles(walk, el, inherited, 0);
        walk.stack.pop();
        walk.provenance = enclosing;

        let mut expansion = result?.dedup();
        if outermost {
            for attr in &mut expansion.attributes {
                if attr.provenance.is_none() {
                    attr.provenance = Some(Provenance::Group(local.clone()));
                }
            }
        }
        Ok(expansion)
    }

    fn particles(
        &self,
        walk: &mut Walk,
        parent: &Element,
        inherited: &str,
        choice_depth: usize,
    ) -> Result<Expansion> {
        let mut out = Expansion::default();
        for child in &parent.children {
            out.extend(self.particle(walk, child, inherited, choice_depth)?);
        }
        Ok(out)
    }

    fn particle(
        &self,
        walk: &mut Walk,
        child: &Element,
        inherited: &str,
        choice_depth: usize,
    ) -> Result<Expansion> {
        match child.local_name() {
            "sequence" | "all" => {
                let max = effective_max(child.get_attribute("maxOccurs"), inherited);
                self.particles(walk, child, &max, choice_depth)
            }
            "choice" => {
                let depth = choice_depth + 1;
                if self.session.limits.exceeds_choice_nesting(depth) {
                    self.session.warn(CompileWarning::DeepChoiceNesting {
                        component: walk.owner.clone(),
                        depth,
                    });
                }
                let max = normalize_occurs(child.get_attribute("maxOccurs").unwrap_or("1"));
                self.particles(walk, child, &max, depth)
            }
            "group" => match child.get_attribute("ref") {
                Some(name) => self.group(walk, name, inherited),
                None => self.particles(walk, child, inherited, choice_depth),
            },
            "element" => self.element(walk, child, inherited),
            // any, annotation
            _ => Ok(Expansion::default()),
        }
    }

    fn element(&self, walk: &mut Walk, el: &Element, inherited: &str) -> Result<Expansion> {
        let Some(xml_name) = el
            .get_attribute("name")
            .or_else(|| el.get_attribute("ref").map(local_name))
        else {
            return Ok(Expansion::default());
        };
        let names = &self.session.names;
        let max = effective_max(el.get_attribute("maxOccurs"), inherited);
        let min = normalize_occurs(el.get_attribute("minOccurs").unwrap_or("0"));
        let description = annotations::description(el);
        let mut out = Expansion::default();

        if let Some(ct) = el.find_child("complexType") {
            let draft = self.inner_class(walk, xml_name, ct)?;

            if !repeating(&max)
                && self.session.config.flatten_wrapper_elements
                && draft.is_flattenable()
            {
                let InnerClassDraft {
                    attributes,
                    inner_classes,
                    ..
                } = draft;
                for mut hoisted in attributes {
                    let inner_tag = hoisted.tag.schema_name().unwrap_or(xml_name).to_string();
                    hoisted.name = names.camel(xml_name);
                    hoisted.tag = SerializationTag::Element {
                        name: inner_tag,
                        wrapper: Some(xml_name.to_string()),
                    };
                    if hoisted.description.is_none() {
                        hoisted.description = description.clone();
                    }
                    out.attributes.push(hoisted);
                }
                out.inner_classes.extend(inner_classes);
            } else {
                let target = TypeTarget::Class(draft.name.clone());
                let (name, ty) = if repeating(&max) {
                    (pluralize(&names.camel(xml_name)), TypeExpr::List(target))
                } else {
                    (names.camel(xml_name), TypeExpr::Single(target))
                };
                out.attributes.push(
                    AttributeDescriptor::new(name, ty, SerializationTag::element(xml_name))
                        .with_occurs(min, max)
                        .with_description(description),
                );
                out.inner_classes.push(draft);
            }
            return Ok(out);
        }

        let ty = el.get_attribute("type");
        let resolved = if let Some(ty) = ty {
            types::resolve(self.session, ty, el, walk.current())?
        } else if let Some(inline) = el.find_child("simpleType") {
            types::resolve_inline(self.session, inline, walk.current())?
        } else {
            ResolvedType::plain(TypeTarget::Content)
        };

        let mut attr = resolved
            .into_attribute(
                names.camel(xml_name),
                SerializationTag::element(xml_name),
                &min,
                &max,
            )
            .with_description(description);
        attr.schema_type = ty.map(|t| local_name(t).to_string());
        out.attributes.push(attr);
        Ok(out)
    }

    /// Build the anonymous type of an element
    fn inner_class(&self, walk: &Walk, xml_name: &str, ct: &Element) -> Result<InnerClassDraft> {
        let depth = walk.inner_depth + 1;
        self.session
            .limits
            .check_inner_class_depth(depth, xml_name)?;

        let name = self.session.names.pascal(xml_name);
        let mut nested = Walk {
            owner: walk.owner.clone(),
            stack: walk.stack.clone(),
            inner_depth: depth,
            provenance: Provenance::InnerClass(xml_name.to_string()),
        };
        let (body, base_class) = self.class_body(&mut nested, ct, xml_name)?;

        Ok(InnerClassDraft {
            name,
            xml_name: xml_name.to_string(),
            attributes: body.attributes,
            inner_classes: body.inner_classes,
            base_class,
            provenance: walk.provenance.clone(),
        })
    }

    /// Attributes, content and base class of an anonymous complex type
    fn class_body(
        &self,
        walk: &mut Walk,
        ct: &Element,
        owner: &str,
    ) -> Result<(Expansion, Option<String>)> {
        let mut body = Expansion::default();
        let mut base_class = None;

        let simple = ct
            .find_child("simpleContent")
            .and_then(|sc| sc.find_child("extension").or_else(|| sc.find_child("restriction")));
        let complex = ct
            .find_child("complexContent")
            .and_then(|cc| cc.find_child("extension").or_else(|| cc.find_child("restriction")));

        if let Some(ext) = simple {
            if let Some(base) = ext.get_attribute("base") {
                match types::resolve_base(self.session, base, ext, owner)? {
                    BaseResolution::Class(class) => base_class = Some(class),
                    BaseResolution::Value(resolved) => body
                        .attributes
                        .push(resolved.into_value_attribute(local_name(base), owner)),
                }
            }
            body.attributes
                .extend(attributes_of(self.session, ext, owner)?);
        }
        if let Some(ext) = complex {
            if let (true, Some(base)) = (ext.is("extension"), ext.get_attribute("base")) {
                if let BaseResolution::Class(class) =
                    types::resolve_base(self.session, base, ext, owner)?
                {
                    base_class = Some(class);
                }
            }
            body.attributes
                .extend(attributes_of(self.session, ext, owner)?);
        }
        body.attributes
            .extend(attributes_of(self.session, ct, owner)?);

        for holder in std::iter::once(ct).chain(complex) {
            for child in &holder.children {
                if matches!(child.local_name(), "sequence" | "choice" | "all" | "group") {
                    body.extend(self.particle(walk, child, "1", 0)?);
                }
            }
        }

        Ok((body.dedup(), base_class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_occurs() {
        assert_eq!(normalize_occurs(" 01 "), "1");
        assert_eq!(normalize_occurs("unbounded"), "unbounded");
    }

    #[test]
    fn test_effective_max() {
        assert_eq!(effective_max(None, "unbounded"), "unbounded");
        assert_eq!(effective_max(None, "1"), "1");
        assert_eq!(effective_max(Some("unbounded"), "1"), "unbounded");
        assert_eq!(effective_max(Some("1"), "unbounded"), "unbounded");
        assert_eq!(effective_max(Some("3"), "1"), "3");
    }

    #[test]
    fn test_dedup_keeps_first() {
        let attr = |name: &str, ty: &str| {
            AttributeDescriptor::new(
                name,
                TypeExpr::Single(TypeTarget::Primitive(ty.into())),
                SerializationTag::element(name),
            )
        };
        let expansion = Expansion {
            attributes: vec![attr("a", "String"), attr("b", "String"), attr("a", "Integer")],
            inner_classes: Vec::new(),
        }
        .dedup();

        let kept: Vec<_> = expansion
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.ty.to_string()))
            .collect();
        assert_eq!(kept, vec![("a", "String".to_string()), ("b", "String".to_string())]);
    }
}
