//! Type token resolution
//!
//! Turns a `type="..."` or `base="..."` token into a [`TypeTarget`]. Order of
//! precedence: configured overrides, XSD built-ins, local complex types, local
//! simple types. Anything else is a dangling reference.

use super::simple_types;
use super::Session;
use crate::documents::Element;
use crate::error::{CompileWarning, Error, ReferenceKind, Result, SchemaReferenceError};
use crate::model::{AttributeDescriptor, Provenance, SerializationTag, SimpleTypeKind, TypeExpr, TypeTarget};
use crate::names::{local_name, split_qname};
use crate::namespaces::is_xsd_namespace;
use crate::typemap::{is_builtin_name, PRIMITIVE_STRING};

/// A resolved type plus the restriction pattern it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedType {
    pub target: TypeTarget,
    pub pattern: Option<String>,
}

impl ResolvedType {
    pub fn plain(target: TypeTarget) -> Self {
        Self {
            target,
            pattern: None,
        }
    }

    pub fn string() -> Self {
        Self::plain(TypeTarget::Primitive(PRIMITIVE_STRING.to_string()))
    }

    /// Attribute with this type, scalar or list depending on `max_occurs`
    pub fn into_attribute(
        self,
        name: String,
        tag: SerializationTag,
        min_occurs: &str,
        max_occurs: &str,
    ) -> AttributeDescriptor {
        let ty = if crate::model::repeating(max_occurs) {
            TypeExpr::List(self.target)
        } else {
            TypeExpr::Single(self.target)
        };
        let mut attr = AttributeDescriptor::new(name, ty, tag).with_occurs(min_occurs, max_occurs);
        attr.pattern = self.pattern;
        attr
    }

    /// The synthetic `value` attribute of a simple-content type
    pub fn into_value_attribute(self, schema_type: &str, owner: &str) -> AttributeDescriptor {
        let is_primitive = self.target.is_primitive();
        let mut attr = self
            .into_attribute("value".to_string(), SerializationTag::Value, "1", "1")
            .with_schema_type(schema_type)
            .with_provenance(Provenance::SimpleContent(owner.to_string()));
        attr.is_primitive = is_primitive;
        attr
    }
}

/// Outcome of resolving an extension base
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BaseResolution {
    /// The base is a complex type: single inheritance
    Class(String),
    /// The base is simple: the content is a value of this type
    Value(ResolvedType),
}

/// Whether `token`, as written inside `scope`, names an XSD built-in type
pub(crate) fn is_builtin_reference(session: &Session<'_>, token: &str, scope: &Element) -> bool {
    let (prefix, local) = split_qname(token);
    let locally_defined = session.index.defines_type(local);
    match prefix {
        Some(prefix) => match scope.namespaces.get_namespace(prefix) {
            Some(ns) => is_xsd_namespace(ns),
            None => !locally_defined && is_builtin_name(local),
        },
        None => {
            !locally_defined
                && (is_builtin_name(local)
                    || scope
                        .namespaces
                        .get_default_namespace()
                        .map(is_xsd_namespace)
                        .unwrap_or(false))
        }
    }
}

/// Model type of an XSD built-in; unmapped built-ins fall back with a warning
pub(crate) fn builtin(session: &Session<'_>, local: &str) -> TypeTarget {
    session.primitives.builtin(local).unwrap_or_else(|| {
        let fallback = session.names.pascal(local);
        session.warn(CompileWarning::UnmappedPrimitive {
            type_name: local.to_string(),
            fallback: fallback.clone(),
        });
        TypeTarget::Primitive(fallback)
    })
}

/// Resolve a type token
pub(crate) fn resolve(
    session: &Session<'_>,
    token: &str,
    scope: &Element,
    referenced_from: &str,
) -> Result<ResolvedType> {
    let local = local_name(token);

    if let Some(target) = session.primitives.override_for(local) {
        return Ok(ResolvedType::plain(target));
    }
    if is_builtin_reference(session, token, scope) {
        return Ok(ResolvedType::plain(builtin(session, local)));
    }
    if session.index.complex_type(local).is_some() {
        return Ok(ResolvedType::plain(TypeTarget::Class(
            session.names.pascal(local),
        )));
    }
    if let Some(simple) = session.simple_types.get(local) {
        return Ok(match &simple.kind {
            SimpleTypeKind::Enumeration { .. } => {
                ResolvedType::plain(TypeTarget::Enum(simple.name.clone()))
            }
            SimpleTypeKind::Restriction { primitive, pattern } => ResolvedType {
                target: primitive.clone(),
                pattern: pattern.clone(),
            },
        });
    }

    Err(SchemaReferenceError::new(ReferenceKind::Type, local)
        .with_referenced_from(referenced_from)
        .into())
}

/// Resolve an anonymous `simpleType` child
///
/// Anonymous enumerations have no model entity and resolve to text.
pub(crate) fn resolve_inline(
    session: &Session<'_>,
    simple_type: &Element,
    referenced_from: &str,
) -> Result<ResolvedType> {
    Ok(
        match simple_types::describe(session, simple_type, referenced_from, 0)? {
            SimpleTypeKind::Enumeration { .. } => ResolvedType::string(),
            SimpleTypeKind::Restriction { primitive, pattern } => ResolvedType {
                target: primitive,
                pattern,
            },
        },
    )
}

/// Resolve the `base` of a simple- or complex-content derivation
pub(crate) fn resolve_base(
    session: &Session<'_>,
    base: &str,
    scope: &Element,
    referenced_from: &str,
) -> Result<BaseResolution> {
    let local = local_name(base);
    if session.index.complex_type(local).is_some() && !is_builtin_reference(session, base, scope) {
        return Ok(BaseResolution::Class(session.names.pascal(local)));
    }

    match resolve(session, base, scope, referenced_from) {
        Ok(resolved) => Ok(BaseResolution::Value(resolved)),
        Err(Error::SchemaReference(err)) if err.kind == ReferenceKind::Type => {
            Err(SchemaReferenceError::new(ReferenceKind::BaseType, err.name)
                .with_referenced_from(referenced_from)
                .into())
        }
        Err(e) => Err(e),
    }
}
