//! Interface resolver
//!
//! Every group becomes an abstract interface. Parent edges come from the
//! generalization table exported from the UML model, and implementors from the
//! subtype index.

use super::Session;
use crate::indexes::GeneralizationTable;
use crate::model::{ClassModel, InterfaceDescriptor};

/// Parents of a type, looked up by identifier first and schema name second
fn parents(table: &GeneralizationTable, identifier: &str, xml_name: &str) -> Vec<String> {
    let by_identifier = table.parents_of(identifier);
    if by_identifier.is_empty() {
        table.parents_of(xml_name).to_vec()
    } else {
        by_identifier.to_vec()
    }
}

/// Attach interfaces to groups and generalizations to classes
pub(crate) fn resolve(session: &Session<'_>, model: &mut ClassModel) {
    let generalizations = &session.indexes.generalizations;

    for group in model.groups.values_mut() {
        group.implementors = session
            .indexes
            .subtypes
            .subtypes(&group.name)
            .unwrap_or_default()
            .iter()
            .map(|t| session.names.pascal(t))
            .collect();

        let interface = InterfaceDescriptor {
            name: group.class_name.clone(),
            group: group.name.clone(),
            parents: parents(generalizations, &group.class_name, &group.name),
            implementors: group.implementors.clone(),
        };
        model.interfaces.insert(interface.name.clone(), interface);
    }

    let mut edges = 0;
    for class in model.classes.values_mut() {
        class.generalizations = parents(generalizations, &class.name, &class.xml_name);
        edges += class.generalizations.len();
    }

    tracing::debug!(
        interfaces = model.interfaces.len(),
        class_generalizations = edges,
        "resolved interfaces"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_prefers_identifier() {
        let table = GeneralizationTable::new()
            .with_parent("Identifiable", "Referrable")
            .with_parent("IDENTIFIABLE", "Other");
        assert_eq!(parents(&table, "Identifiable", "IDENTIFIABLE"), vec!["Referrable"]);
        assert_eq!(parents(&table, "Missing", "IDENTIFIABLE"), vec!["Other"]);
        assert!(parents(&table, "Missing", "MISSING").is_empty());
    }
}
