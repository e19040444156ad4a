//! Schema token to identifier mapping
//!
//! Schema names are upper-case tokens joined by `-` or `_`
//! (`SW-COMPONENT-TYPE`). Generated classes use Pascal case (`SwComponentType`)
//! and attributes use camel case (`swComponentType`). A small set of tokens
//! embed acronyms that the generic split would break apart (`ECU-MAPPING`
//! must become `ECUMapping`, not `EcuMapping`); those come from an exception
//! table that always wins over the generic rule.
//!
//! Every stage of the compiler must map names through the same [`NameMapper`]
//! so that names compared during inner-class unification agree with the names
//! emitted earlier.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static TOKEN_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_]").unwrap());

/// Identifier casing variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Casing {
    /// `SwComponentType` - class and type names
    Pascal,
    /// `swComponentType` - attribute and variable names
    Camel,
}

/// Schema tokens whose identifier keeps an embedded acronym fused
static DEFAULT_EXCEPTIONS: Lazy<IndexMap<&'static str, &'static str>> = Lazy::new(|| {
    IndexMap::from([
        ("AR-ELEMENT", "ARElement"),
        ("AR-OBJECT", "ARObject"),
        ("AR-PACKAGE", "ARPackage"),
        ("AUTOSAR", "AUTOSAR"),
        ("DIAGNOSTIC-CONTROL-DTC-SETTING", "DiagnosticControlDTCSetting"),
        ("DIAGNOSTIC-CONTROL-DTC-SETTING-CLASS", "DiagnosticControlDTCSettingClass"),
        ("DIAGNOSTIC-IO-CONTROL", "DiagnosticIOControl"),
        ("DIAGNOSTIC-READ-DTC-INFORMATION", "DiagnosticReadDTCInformation"),
        ("DIAGNOSTIC-READ-DTC-INFORMATION-CLASS", "DiagnosticReadDTCInformationClass"),
        ("DIAGNOSTIC-READ-DATA-BY-PERIODIC-ID", "DiagnosticReadDataByPeriodicID"),
        ("DIAGNOSTIC-READ-DATA-BY-PERIODIC-ID-CLASS", "DiagnosticReadDataByPeriodicIDClass"),
        ("ECU-MAPPING", "ECUMapping"),
        ("EOC-EVENT-REF", "EOCEventRef"),
        ("EOC-EXECUTABLE-ENTITY-REF", "EOCExecutableEntityRef"),
        ("EOC-EXECUTABLE-ENTITY-REF-ABSTRACT", "EOCExecutableEntityRefAbstract"),
        ("EOC-EXECUTABLE-ENTITY-REF-GROUP", "EOCExecutableEntityRefGroup"),
        ("FM-ATTRIBUTE-DEF", "FMAttributeDef"),
        ("FM-ATTRIBUTE-VALUE", "FMAttributeValue"),
        ("FM-CONDITION-BY-FEATURES-AND-ATTRIBUTES", "FMConditionByFeaturesAndAttributes"),
        ("FM-CONDITION-BY-FEATURES-AND-SW-SYSTEMCONSTS", "FMConditionByFeaturesAndSwSystemconsts"),
        ("FM-FEATURE", "FMFeature"),
        ("FM-FEATURE-DECOMPOSITION", "FMFeatureDecomposition"),
        ("FM-FEATURE-MAP", "FMFeatureMap"),
        ("FM-FEATURE-MAP-ASSERTION", "FMFeatureMapAssertion"),
        ("FM-FEATURE-MAP-CONDITION", "FMFeatureMapCondition"),
        ("FM-FEATURE-MAP-ELEMENT", "FMFeatureMapElement"),
        ("FM-FEATURE-MODEL", "FMFeatureModel"),
        ("FM-FEATURE-RELATION", "FMFeatureRelation"),
        ("FM-FEATURE-RESTRICTION", "FMFeatureRestriction"),
        ("FM-FEATURE-SELECTION", "FMFeatureSelection"),
        ("FM-FEATURE-SELECTION-SET", "FMFeatureSelectionSet"),
        ("FM-FORMULA-BY-FEATURES-AND-ATTRIBUTES", "FMFormulaByFeaturesAndAttributes"),
        ("FM-FORMULA-BY-FEATURES-AND-SW-SYSTEMCONSTS", "FMFormulaByFeaturesAndSwSystemconsts"),
        ("INSTANTIATION-RTE-EVENT-PROPS", "InstantiationRTEEventProps"),
        ("PR-PORT-PROTOTYPE", "PRPortPrototype"),
        ("PARAMETER-IN-ATOMIC-SWC-TYPE-INSTANCE-REF", "ParameterInAtomicSWCTypeInstanceRef"),
        ("PORT-API-OPTION", "PortAPIOption"),
        ("R-MODE-GROUP-IN-ATOMIC-SWC-INSTANCE-REF", "RModeGroupInAtomicSWCInstanceRef"),
        ("RTE-EVENT", "RTEEvent"),
        ("SOMEIP-TRANSFORMATION-DESCRIPTION", "SOMEIPTransformationDescription"),
        ("SOMEIP-TRANSFORMATION-I-SIGNAL-PROPS", "SOMEIPTransformationISignalProps"),
        ("SOMEIP-TRANSFORMATION-I-SIGNAL-PROPS-CONDITIONAL", "SOMEIPTransformationISignalPropsConditional"),
        ("SOMEIP-TRANSFORMATION-I-SIGNAL-PROPS-CONTENT", "SOMEIPTransformationISignalPropsContent"),
        ("TD-EVENT-BSW", "TDEventBsw"),
        ("TD-EVENT-BSW-INTERNAL-BEHAVIOR", "TDEventBswInternalBehavior"),
        ("TD-EVENT-BSW-MODE-DECLARATION", "TDEventBswModeDeclaration"),
        ("TD-EVENT-BSW-MODULE", "TDEventBswModule"),
        ("TD-EVENT-COM", "TDEventCom"),
        ("TD-EVENT-COMPLEX", "TDEventComplex"),
        ("TD-EVENT-CYCLE-START", "TDEventCycleStart"),
        ("TD-EVENT-FR-CLUSTER-CYCLE-START", "TDEventFrClusterCycleStart"),
        ("TD-EVENT-FRAME", "TDEventFrame"),
        ("TD-EVENT-I-PDU", "TDEventIPdu"),
        ("TD-EVENT-I-SIGNAL", "TDEventISignal"),
        ("TD-EVENT-MODE-DECLARATION", "TDEventModeDeclaration"),
        ("TD-EVENT-OCCURRENCE-EXPRESSION", "TDEventOccurrenceExpression"),
        ("TD-EVENT-OCCURRENCE-EXPRESSION-FORMULA", "TDEventOccurrenceExpressionFormula"),
        ("TD-EVENT-OPERATION", "TDEventOperation"),
        ("TD-EVENT-SWC", "TDEventSwc"),
        ("TD-EVENT-SWC-INTERNAL-BEHAVIOR", "TDEventSwcInternalBehavior"),
        ("TD-EVENT-SWC-INTERNAL-BEHAVIOR-REFERENCE", "TDEventSwcInternalBehaviorReference"),
        ("TD-EVENT-TT-CAN-CYCLE-START", "TDEventTTCanCycleStart"),
        ("TD-EVENT-TRIGGER", "TDEventTrigger"),
        ("TD-EVENT-VARIABLE-DATA-PROTOTYPE", "TDEventVariableDataPrototype"),
        ("TD-EVENT-VFB", "TDEventVfb"),
        ("TD-EVENT-VFB-PORT", "TDEventVfbPort"),
        ("TD-EVENT-VFB-REFERENCE", "TDEventVfbReference"),
        ("VARIABLE-IN-ATOMIC-SWC-TYPE-INSTANCE-REF", "VariableInAtomicSWCTypeInstanceRef"),
    ])
});

static DEFAULT_MAPPER: Lazy<NameMapper> = Lazy::new(NameMapper::default);

/// Token-to-identifier converter with an exception table
#[derive(Debug, Clone)]
pub struct NameMapper {
    /// Schema token -> Pascal-case identifier
    exceptions: HashMap<String, String>,
}

impl Default for NameMapper {
    fn default() -> Self {
        Self {
            exceptions: DEFAULT_EXCEPTIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl NameMapper {
    /// Mapper without any exceptions
    pub fn empty() -> Self {
        Self {
            exceptions: HashMap::new(),
        }
    }

    /// Add (or replace) an exception, given as its Pascal-case identifier
    pub fn with_exception(mut self, token: impl Into<String>, pascal: impl Into<String>) -> Self {
        self.exceptions.insert(token.into(), pascal.into());
        self
    }

    /// Add several exceptions
    pub fn with_exceptions<'a>(
        mut self,
        exceptions: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (token, pascal) in exceptions {
            self.exceptions.insert(token.clone(), pascal.clone());
        }
        self
    }

    /// Whether the token has an exception entry
    pub fn has_exception(&self, token: &str) -> bool {
        self.exceptions.contains_key(token)
    }

    /// Convert a schema token to an identifier
    pub fn to_identifier(&self, token: &str, casing: Casing) -> String {
        if let Some(pascal) = self.exceptions.get(token) {
            return match casing {
                Casing::Pascal => pascal.clone(),
                Casing::Camel => lower_first(pascal),
            };
        }

        let mut components = TOKEN_SEPARATOR.split(token);
        match casing {
            Casing::Pascal => components.map(capitalize).collect(),
            Casing::Camel => {
                let head = components.next().unwrap_or_default().to_lowercase();
                components.fold(head, |mut acc, c| {
                    acc.push_str(&title(c));
                    acc
                })
            }
        }
    }

    /// Pascal-case identifier for class and type names
    pub fn pascal(&self, token: &str) -> String {
        self.to_identifier(token, Casing::Pascal)
    }

    /// Camel-case identifier for attribute names
    pub fn camel(&self, token: &str) -> String {
        self.to_identifier(token, Casing::Camel)
    }
}

/// Convert a schema token with the built-in exception table
pub fn to_identifier(token: &str, casing: Casing) -> String {
    DEFAULT_MAPPER.to_identifier(token, casing)
}

/// Pascal-case a schema token with the built-in exception table
pub fn to_pascal_case(token: &str) -> String {
    to_identifier(token, Casing::Pascal)
}

/// Camel-case a schema token with the built-in exception table
pub fn to_camel_case(token: &str) -> String {
    to_identifier(token, Casing::Camel)
}

/// Collection-valued attribute name for an element with an anonymous type
pub fn pluralize(identifier: &str) -> String {
    format!("{}s", identifier)
}

/// Strip a namespace prefix from a type or reference token (`AR:FOO` -> `FOO`)
pub fn local_name(token: &str) -> &str {
    token.rsplit(':').next().unwrap_or(token)
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// First character upper-case, the rest lower-case
fn capitalize(component: &str) -> String {
    let mut chars = component.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Upper-case every letter that follows a non-letter, lower-case the others
fn title(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut prev_cased = false;
    for c in component.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_alphabetic();
    }
    out
}

fn lower_first(identifier: &str) -> String {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generic_pascal_case() {
        assert_eq!(to_pascal_case("SW-COMPONENT-TYPE"), "SwComponentType");
        assert_eq!(to_pascal_case("FOO_BAR"), "FooBar");
        assert_eq!(to_pascal_case("FOO"), "Foo");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_generic_camel_case() {
        assert_eq!(to_camel_case("SHORT-NAME"), "shortName");
        assert_eq!(to_camel_case("DEST"), "dest");
        assert_eq!(to_camel_case("I-SIGNAL-2D"), "iSignal2D");
    }

    #[test]
    fn test_exception_table_wins() {
        assert_eq!(to_pascal_case("ECU-MAPPING"), "ECUMapping");
        assert_eq!(to_camel_case("ECU-MAPPING"), "eCUMapping");
        assert_eq!(to_pascal_case("AUTOSAR"), "AUTOSAR");
        assert_eq!(to_camel_case("AUTOSAR"), "aUTOSAR");
        assert_eq!(to_pascal_case("PORT-API-OPTION"), "PortAPIOption");
    }

    #[test]
    fn test_custom_exception() {
        let mapper = NameMapper::empty().with_exception("CAN-ID", "CANId");
        assert_eq!(mapper.pascal("CAN-ID"), "CANId");
        assert_eq!(mapper.camel("CAN-ID"), "cANId");
        assert_eq!(mapper.pascal("ECU-MAPPING"), "EcuMapping");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("AR:FOO"), "FOO");
        assert_eq!(local_name("FOO"), "FOO");
        assert_eq!(split_qname("xsd:string"), (Some("xsd"), "string"));
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("element"), "elements");
    }

    proptest! {
        #[test]
        fn prop_identifier_is_deterministic(token in "[A-Z0-9]{1,6}(-[A-Z0-9]{1,6}){0,4}") {
            let mapper = NameMapper::default();
            prop_assert_eq!(mapper.pascal(&token), mapper.pascal(&token));
            prop_assert_eq!(mapper.camel(&token), mapper.camel(&token));
        }

        #[test]
        fn prop_generic_identifiers_drop_separators(token in "[A-Z]{1,6}([-_][A-Z]{1,6}){0,4}") {
            let mapper = NameMapper::empty();
            let pascal = mapper.pascal(&token);
            prop_assert!(!pascal.contains('-') && !pascal.contains('_'));
            prop_assert_eq!(pascal.len(), token.len() - token.matches(['-', '_']).count());
        }

        #[test]
        fn prop_exceptions_always_win(idx in 0usize..DEFAULT_EXCEPTIONS.len()) {
            let (token, pascal) = DEFAULT_EXCEPTIONS.get_index(idx).unwrap();
            prop_assert_eq!(to_pascal_case(token), pascal.to_string());
            prop_assert_eq!(to_camel_case(token), lower_first(pascal));
        }
    }
}
