//! # xsd-classmodel
//!
//! Compiles the group, complexType and attributeGroup grammar of a large
//! industrial XML Schema into a normalized, name-resolved class model that a
//! code generator can render without further schema knowledge.
//!
//! ## Features
//!
//! - Group expansion with choice and sequence cardinality propagation
//! - Inner-class synthesis, flattening and cross-class unification
//! - Simple-type, restriction and enumeration resolution
//! - Mixed-content consolidation
//! - Reference lookups over `*Ref` indirection types with polymorphic targets
//! - Wrapper types and interface/generalization attachment
//! - Deterministic JSON dump of the finished model
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsd_classmodel::{Compiler, ExternalIndexes, Location};
//!
//! let model = Compiler::new()
//!     .with_indexes(ExternalIndexes::new())
//!     .compile_location(&Location::parse("AUTOSAR_00052.xsd"))?;
//!
//! println!("{}", model.to_json_pretty()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;
pub mod locations;

// Resource loading
pub mod loaders;
pub mod documents;

// Inputs
pub mod config;
pub mod indexes;
pub mod typemap;

// Output model and compiler
pub mod compiler;
pub mod model;

// Re-exports for convenience
pub use compiler::Compiler;
pub use config::{CompilerConfig, WrapperPolicy};
pub use error::{CompileWarning, Error, Result};
pub use indexes::ExternalIndexes;
pub use locations::Location;
pub use model::{
    AttributeDescriptor, ClassModel, ComplexTypeDescriptor, DynamicMethod, GroupDefinition,
    InnerClassDescriptor, SerializationTag, TypeExpr, TypeTarget,
};

/// Version of the xsd-classmodel library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
