//! `xsd:annotation` readers

use crate::documents::Element;

/// Free-text description built from documentation, tags and stereotypes
///
/// Produces `note:<documentation> tag:<tags> stereotype:<stereotypes>`, with
/// absent parts left out.
pub(crate) fn description(el: &Element) -> Option<String> {
    let annotation = el.find_child("annotation")?;
    let mut parts = Vec::new();

    if let Some(doc) = annotation.find_child("documentation").and_then(Element::text) {
        parts.push(format!("note:{}", doc));
    }
    for appinfo in annotation.find_children("appinfo") {
        let Some(text) = appinfo.text() else {
            continue;
        };
        match appinfo.get_attribute("source") {
            Some("tags") => parts.push(format!("tag:{}", text)),
            Some("stereotypes") => parts.push(format!("stereotype:{}", text)),
            _ => {}
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Whether the stereotype annotation marks a primitive or enumeration facade
pub(crate) fn is_attribute_facade(el: &Element) -> bool {
    el.find_child("annotation")
        .into_iter()
        .flat_map(|a| a.find_children("appinfo"))
        .filter(|appinfo| appinfo.get_attribute("source") == Some("stereotypes"))
        .filter_map(Element::text)
        .any(|text| text.contains("primitive") || text.contains("enumeration"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    fn parse(xml: &str) -> Element {
        Document::from_string(xml).unwrap().root.unwrap()
    }

    #[test]
    fn test_description_parts() {
        let el = parse(
            r#"<complexType name="X">
                <annotation>
                    <documentation> A thing. </documentation>
                    <appinfo source="tags">mmt.qualifiedName="X"</appinfo>
                    <appinfo source="stereotypes">atpObject</appinfo>
                    <appinfo source="other">ignored</appinfo>
                </annotation>
            </complexType>"#,
        );
        assert_eq!(
            description(&el).as_deref(),
            Some("note:A thing. tag:mmt.qualifiedName=\"X\" stereotype:atpObject")
        );
    }

    #[test]
    fn test_no_annotation() {
        let el = parse(r#"<complexType name="X"/>"#);
        assert_eq!(description(&el), None);
        assert!(!is_attribute_facade(&el));
    }

    #[test]
    fn test_attribute_facade() {
        let el = parse(
            r#"<complexType name="X">
                <annotation><appinfo source="stereotypes">primitive</appinfo></annotation>
            </complexType>"#,
        );
        assert!(is_attribute_facade(&el));
    }
}
