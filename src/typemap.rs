//! Primitive type table
//!
//! Maps XSD built-in types (and configured schema-level simple types) to the
//! primitive names of the class model.

use crate::model::TypeTarget;
use indexmap::IndexMap;

/// Model primitive for text values
pub const PRIMITIVE_STRING: &str = "String";
/// Model primitive for integral values
pub const PRIMITIVE_INTEGER: &str = "Integer";
/// Model primitive for floating point values
pub const PRIMITIVE_DOUBLE: &str = "Double";
/// Model primitive for arbitrary precision decimals
pub const PRIMITIVE_DECIMAL: &str = "Decimal";
/// Model primitive for truth values
pub const PRIMITIVE_BOOLEAN: &str = "Boolean";

/// Lookup table from schema type tokens to model primitives
#[derive(Debug, Clone, Default)]
pub struct PrimitiveTable {
    /// Schema type token -> primitive name, consulted before the built-ins
    overrides: IndexMap<String, String>,
}

impl PrimitiveTable {
    /// Table with only the built-in mappings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add configured overrides
    pub fn with_overrides(mut self, overrides: &IndexMap<String, String>) -> Self {
        for (token, primitive) in overrides {
            self.overrides.insert(token.clone(), primitive.clone());
        }
        self
    }

    /// Configured mapping for a schema type token, if any
    pub fn override_for(&self, token: &str) -> Option<TypeTarget> {
        self.overrides
            .get(token)
            .map(|p| TypeTarget::Primitive(p.clone()))
    }

    /// Model type for an XSD built-in, or `None` if the built-in is unmapped
    pub fn builtin(&self, local_name: &str) -> Option<TypeTarget> {
        if let Some(target) = self.override_for(local_name) {
            return Some(target);
        }

        let primitive = match local_name {
            "string" | "normalizedString" | "token" | "language" | "Name" | "NCName" | "ID"
            | "IDREF" | "IDREFS" | "NMTOKEN" | "NMTOKENS" | "anyURI" | "QName" | "date"
            | "dateTime" | "time" | "duration" => PRIMITIVE_STRING,
            "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "nonPositiveInteger" | "negativeInteger" | "unsignedLong"
            | "unsignedInt" | "unsignedShort" | "unsignedByte" => PRIMITIVE_INTEGER,
            "double" | "float" => PRIMITIVE_DOUBLE,
            "decimal" => PRIMITIVE_DECIMAL,
            "boolean" => PRIMITIVE_BOOLEAN,
            "anyType" => return Some(TypeTarget::Content),
            _ => return None,
        };
        Some(TypeTarget::Primitive(primitive.to_string()))
    }
}

/// Whether a local name is one of the XSD 1.0/1.1 built-in types
pub fn is_builtin_name(local_name: &str) -> bool {
    matches!(
        local_name,
        "anyType"
            | "anySimpleType"
            | "anyAtomicType"
            | "string"
            | "normalizedString"
            | "token"
            | "language"
            | "Name"
            | "NCName"
            | "ID"
            | "IDREF"
            | "IDREFS"
            | "ENTITY"
            | "ENTITIES"
            | "NMTOKEN"
            | "NMTOKENS"
            | "boolean"
            | "decimal"
            | "integer"
            | "long"
            | "int"
            | "short"
            | "byte"
            | "nonNegativeInteger"
            | "positiveInteger"
            | "unsignedLong"
            | "unsignedInt"
            | "unsignedShort"
            | "unsignedByte"
            | "nonPositiveInteger"
            | "negativeInteger"
            | "float"
            | "double"
            | "duration"
            | "dateTime"
            | "time"
            | "date"
            | "gYearMonth"
            | "gYear"
            | "gMonthDay"
            | "gDay"
            | "gMonth"
            | "hexBinary"
            | "base64Binary"
            | "anyURI"
            | "QName"
            | "NOTATION"
            | "dateTimeStamp"
            | "dayTimeDuration"
            | "yearMonthDuration"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_mappings() {
        let table = PrimitiveTable::new();
        assert_eq!(
            table.builtin("string"),
            Some(TypeTarget::Primitive("String".into()))
        );
        assert_eq!(
            table.builtin("unsignedInt"),
            Some(TypeTarget::Primitive("Integer".into()))
        );
        assert_eq!(
            table.builtin("double"),
            Some(TypeTarget::Primitive("Double".into()))
        );
        assert_eq!(table.builtin("anyType"), Some(TypeTarget::Content));
    }

    #[test]
    fn test_unmapped_builtin() {
        let table = PrimitiveTable::new();
        assert!(is_builtin_name("hexBinary"));
        assert_eq!(table.builtin("hexBinary"), None);
    }

    #[test]
    fn test_overrides_win() {
        let mut overrides = IndexMap::new();
        overrides.insert("hexBinary".to_string(), "Bytes".to_string());
        overrides.insert("STRING--SIMPLE".to_string(), "String".to_string());
        let table = PrimitiveTable::new().with_overrides(&overrides);

        assert_eq!(
            table.builtin("hexBinary"),
            Some(TypeTarget::Primitive("Bytes".into()))
        );
        assert_eq!(
            table.override_for("STRING--SIMPLE"),
            Some(TypeTarget::Primitive("String".into()))
        );
        assert_eq!(table.override_for("FOO"), None);
    }
}
