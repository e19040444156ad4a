//! Schema-to-class-model compiler
//!
//! A compilation runs these stages over one schema document, in order:
//!
//! 1. index the top-level definitions ([`SchemaIndex`])
//! 2. describe named simple types
//! 3. expand every named group in document order
//! 4. resolve every named complex type in document order
//! 5. unify inner classes across the whole model
//! 6. synthesize reference lookups and apply wrapper types
//! 7. attach interfaces and generalizations
//! 8. verify the finished model
//!
//! All state lives in a [`Session`] created per compilation, and every stage
//! walks definitions in document order, so the result is deterministic.

mod annotations;
mod attribute_groups;
mod complex_types;
mod expander;
mod indexer;
mod interfaces;
mod references;
mod simple_types;
mod types;
mod unifier;
mod verify;

pub use indexer::SchemaIndex;
pub use references::is_indirection;

use crate::config::CompilerConfig;
use crate::documents::Document;
use crate::error::{CompileWarning, Result};
use crate::indexes::ExternalIndexes;
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::locations::Location;
use crate::model::{ClassModel, GroupDefinition, Provenance, SimpleTypeDescriptor};
use crate::names::NameMapper;
use crate::typemap::PrimitiveTable;
use indexmap::IndexMap;
use std::cell::RefCell;

/// Per-compilation state shared by every stage
pub(crate) struct Session<'a> {
    pub index: SchemaIndex<'a>,
    pub config: &'a CompilerConfig,
    pub indexes: &'a ExternalIndexes,
    pub limits: &'a Limits,
    pub names: NameMapper,
    pub primitives: PrimitiveTable,
    pub simple_types: IndexMap<String, SimpleTypeDescriptor>,
    warnings: RefCell<Vec<CompileWarning>>,
}

impl<'a> Session<'a> {
    fn new(index: SchemaIndex<'a>, compiler: &'a Compiler) -> Self {
        Self {
            index,
            config: &compiler.config,
            indexes: &compiler.indexes,
            limits: &compiler.limits,
            names: NameMapper::default().with_exceptions(&compiler.config.name_exceptions),
            primitives: PrimitiveTable::new().with_overrides(&compiler.config.primitive_overrides),
            simple_types: IndexMap::new(),
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Record a recoverable issue; repeats are kept once
    pub fn warn(&self, warning: CompileWarning) {
        let mut warnings = self.warnings.borrow_mut();
        if !warnings.contains(&warning) {
            tracing::warn!("{}", warning);
            warnings.push(warning);
        }
    }

    fn into_warnings(self) -> Vec<CompileWarning> {
        self.warnings.into_inner()
    }
}

/// Schema compiler
///
/// # Example
///
/// ```rust
/// use xsd_classmodel::{Compiler, TypeTarget};
///
/// let schema = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
///     <xsd:group name="G">
///         <xsd:sequence><xsd:element name="FOO" type="xsd:string"/></xsd:sequence>
///     </xsd:group>
/// </xsd:schema>"#;
///
/// let model = Compiler::new().compile_str(schema)?;
/// let foo = model.group_attribute("G", "foo").unwrap();
/// assert_eq!(foo.ty.target(), &TypeTarget::Primitive("String".into()));
/// # Ok::<(), xsd_classmodel::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
    indexes: ExternalIndexes,
    limits: Limits,
}

impl Compiler {
    /// Compiler with default configuration and empty external tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the external index tables
    pub fn with_indexes(mut self, indexes: ExternalIndexes) -> Self {
        self.indexes = indexes;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The configuration in use
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile schema text
    pub fn compile_str(&self, xml: &str) -> Result<ClassModel> {
        let doc = Document::parse_with_limits(xml.as_bytes(), &self.limits)?;
        self.compile(&doc)
    }

    /// Compile a schema file or inline schema
    pub fn compile_location(&self, location: &Location) -> Result<ClassModel> {
        let loader = Loader::new().with_limits(self.limits.clone());
        let doc = loader.load_document(location)?;
        self.compile(&doc)
    }

    /// Compile a parsed schema document
    ///
    /// Either the whole document compiles or the first fatal error is
    /// returned; no partial model escapes.
    pub fn compile(&self, doc: &Document) -> Result<ClassModel> {
        let index = SchemaIndex::build(doc)?;
        let mut session = Session::new(index, self);
        session.simple_types = simple_types::describe_all(&session)?;

        let mut model = ClassModel::new();
        model.simple_types = session.simple_types.clone();

        for (name, el) in session.index.groups() {
            let expansion = expander::Expander::new(&session).expand(name, "1")?;
            let (attributes, inner_classes) =
                expansion.intern(&mut model.attributes, &Provenance::Group(name.to_string()));
            model.groups.insert(
                name.to_string(),
                GroupDefinition {
                    name: name.to_string(),
                    class_name: session.names.pascal(name),
                    attributes,
                    inner_classes,
                    description: annotations::description(el),
                    mixed: false,
                    mixed_elements: Vec::new(),
                    implementors: Vec::new(),
                },
            );
        }
        tracing::debug!(groups = model.groups.len(), "expanded groups");

        complex_types::resolve_all(&session, &mut model)?;
        tracing::debug!(classes = model.classes.len(), "resolved complex types");

        unifier::Unifier::new().run(&mut model)?;
        references::resolve(&session, &mut model);
        interfaces::resolve(&session, &mut model);
        verify::verify(&model)?;

        model.warnings = session.into_warnings();
        tracing::info!(
            groups = model.groups.len(),
            classes = model.classes.len(),
            inner_classes = model.emitted_inner_classes().len(),
            attributes = model.attributes.len(),
            warnings = model.warnings.len(),
            "compiled schema"
        );

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{TypeExpr, TypeTarget};

    fn schema(body: &str) -> String {
        format!(
            r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:AR="urn:ar">{}</xsd:schema>"#,
            body
        )
    }

    #[test]
    fn test_enum_simple_type_is_entity() {
        let model = Compiler::new()
            .compile_str(&schema(
                r#"<xsd:simpleType name="COLOR-ENUM">
                    <xsd:restriction base="xsd:string">
                        <xsd:enumeration value="RED"/><xsd:enumeration value="GREEN"/>
                    </xsd:restriction>
                </xsd:simpleType>
                <xsd:group name="G">
                    <xsd:sequence><xsd:element name="COLOR" type="AR:COLOR-ENUM"/></xsd:sequence>
                </xsd:group>"#,
            ))
            .unwrap();

        let color = model.group_attribute("G", "color").unwrap();
        assert_eq!(color.ty, TypeExpr::Single(TypeTarget::Enum("ColorEnum".into())));
        assert_eq!(color.schema_type.as_deref(), Some("COLOR-ENUM"));
        assert!(model.simple_types["COLOR-ENUM"].is_enumeration());
    }

    #[test]
    fn test_restriction_chain_carries_pattern() {
        let model = Compiler::new()
            .compile_str(&schema(
                r#"<xsd:simpleType name="IDENTIFIER--SIMPLE">
                    <xsd:restriction base="xsd:string"><xsd:pattern value="[a-zA-Z]+"/></xsd:restriction>
                </xsd:simpleType>
                <xsd:simpleType name="SHORT-IDENTIFIER--SIMPLE">
                    <xsd:restriction base="AR:IDENTIFIER--SIMPLE"/>
                </xsd:simpleType>
                <xsd:complexType name="IDENTIFIER">
                    <xsd:simpleContent>
                        <xsd:extension base="AR:SHORT-IDENTIFIER--SIMPLE"/>
                    </xsd:simpleContent>
                </xsd:complexType>"#,
            ))
            .unwrap();

        let value = model.class_attribute("Identifier", "value").unwrap();
        assert_eq!(value.ty, TypeExpr::Single(TypeTarget::Primitive("String".into())));
        assert_eq!(value.pattern.as_deref(), Some("[a-zA-Z]+"));
        assert!(value.is_primitive);
    }

    #[test]
    fn test_unmapped_builtin_warns_once() {
        let model = Compiler::new()
            .compile_str(&schema(
                r#"<xsd:group name="G">
                    <xsd:sequence>
                        <xsd:element name="A" type="xsd:hexBinary"/>
                        <xsd:element name="B" type="xsd:hexBinary"/>
                    </xsd:sequence>
                </xsd:group>"#,
            ))
            .unwrap();

        assert_eq!(
            model.warnings,
            vec![CompileWarning::UnmappedPrimitive {
                type_name: "hexBinary".into(),
                fallback: "Hexbinary".into(),
            }]
        );
        let a = model.group_attribute("G", "a").unwrap();
        assert_eq!(a.ty.target(), &TypeTarget::Primitive("Hexbinary".into()));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let result = Compiler::new().compile_str(&schema(
            r#"<xsd:group name="G">
                <xsd:sequence><xsd:element name="A" type="AR:NOWHERE"/></xsd:sequence>
            </xsd:group>"#,
        ));
        match result {
            Err(Error::SchemaReference(err)) => {
                assert_eq!(err.name, "NOWHERE");
                assert_eq!(err.referenced_from.as_deref(), Some("G"));
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_derivation_cycle_is_limited() {
        let result = Compiler::new().compile_str(&schema(
            r#"<xsd:simpleType name="A"><xsd:restriction base="AR:B"/></xsd:simpleType>
               <xsd:simpleType name="B"><xsd:restriction base="AR:A"/></xsd:simpleType>"#,
        ));
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_primitive_override() {
        let config = CompilerConfig::new().with_primitive_override("NUMERICAL-VALUE--SIMPLE", "Double");
        let model = Compiler::new()
            .with_config(config)
            .compile_str(&schema(
                r#"<xsd:group name="G">
                    <xsd:sequence><xsd:element name="V" type="AR:NUMERICAL-VALUE--SIMPLE"/></xsd:sequence>
                </xsd:group>"#,
            ))
            .unwrap();
        let v = model.group_attribute("G", "v").unwrap();
        assert_eq!(v.ty.target(), &TypeTarget::Primitive("Double".into()));
    }
}
