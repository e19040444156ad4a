//! External index tables
//!
//! Read-only side inputs consumed by the reference and interface stages. They
//! are produced outside this crate (by schema preprocessing and by the UML
//! model exporter) and are loaded fully before compilation starts.
//!
//! All names are kept exactly as they appear in the tables. Casing is applied
//! by the compiler through its name mapper, so configured exceptions apply to
//! table entries too.

use crate::documents::{Document, Element};
use crate::error::{ParseError, Result};
use crate::loaders::Loader;
use crate::locations::Location;
use indexmap::IndexMap;

fn root_of<'a>(doc: &'a Document, table: &str) -> Result<&'a Element> {
    doc.root()
        .ok_or_else(|| ParseError::new(format!("{} document has no root element", table)).into())
}

/// Enum family -> concrete complex types legal for that family
///
/// Loaded from `<group name="FAMILY" complexTypes="//A//B"/>` records.
#[derive(Debug, Clone, Default)]
pub struct SubtypeIndex {
    families: IndexMap<String, Vec<String>>,
}

impl SubtypeIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a family from its `//`-delimited member list
    pub fn with_family(mut self, family: impl Into<String>, complex_types: &str) -> Self {
        self.insert(family.into(), complex_types);
        self
    }

    fn insert(&mut self, family: String, complex_types: &str) {
        let members = complex_types
            .split("//")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        // First record for a family wins
        self.families.entry(family).or_insert(members);
    }

    /// Build from a parsed index document
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut index = Self::new();
        for el in root_of(doc, "subtype index")?.descendants() {
            if !el.is("group") {
                continue;
            }
            if let (Some(name), Some(types)) =
                (el.get_attribute("name"), el.get_attribute("complexTypes"))
            {
                index.insert(name.to_string(), types);
            }
        }
        Ok(index)
    }

    /// Load from a file or inline document
    pub fn load(loader: &Loader, location: &Location) -> Result<Self> {
        Self::from_document(&loader.load_document(location)?)
    }

    /// Raw member names of a family, in table order
    pub fn subtypes(&self, family: &str) -> Option<&[String]> {
        self.families.get(family).map(Vec::as_slice)
    }

    /// Number of families
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether the index has no families
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Indirection types that never receive a synthesized lookup
#[derive(Debug, Clone, Default)]
pub struct ComplexRefList {
    names: Vec<String>,
}

impl ComplexRefList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw complex type name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Build from every `complexType/@name` in a schema fragment
    pub fn from_document(doc: &Document) -> Result<Self> {
        let names = root_of(doc, "complex reference list")?
            .descendants()
            .into_iter()
            .filter(|el| el.is("complexType"))
            .filter_map(|el| el.get_attribute("name"))
            .map(str::to_string)
            .collect();
        Ok(Self { names })
    }

    /// Load from a file or inline document
    pub fn load(loader: &Loader, location: &Location) -> Result<Self> {
        Self::from_document(&loader.load_document(location)?)
    }

    /// Raw names, in document order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A reference whose serialized tag differs from its bound type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDisambiguation {
    /// Indirection class holding the reference (raw schema name)
    pub element_class: String,
    /// Enum simple type of its `dest` attribute (raw schema name)
    pub simple_type_name: String,
    /// Element tag the lookup must match
    pub tag_name: String,
    /// Type bound to that tag
    pub tag_type: String,
}

/// Records of references whose tag name differs from the type name
#[derive(Debug, Clone, Default)]
pub struct DisambiguationTable {
    records: Vec<TagDisambiguation>,
}

impl DisambiguationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record
    pub fn with_record(mut self, record: TagDisambiguation) -> Self {
        self.records.push(record);
        self
    }

    /// Build from `<element name type simpleTypeName elementClass/>` records
    pub fn from_document(doc: &Document) -> Result<Self> {
        let records = root_of(doc, "tag disambiguation table")?
            .descendants()
            .into_iter()
            .filter(|el| el.is("element"))
            .map(|el| {
                let attr = |name: &str| el.get_attribute(name).unwrap_or_default().to_string();
                TagDisambiguation {
                    element_class: attr("elementClass"),
                    simple_type_name: attr("simpleTypeName"),
                    tag_name: attr("name"),
                    tag_type: attr("type"),
                }
            })
            .collect();
        Ok(Self { records })
    }

    /// Load from a file or inline document
    pub fn load(loader: &Loader, location: &Location) -> Result<Self> {
        Self::from_document(&loader.load_document(location)?)
    }

    /// All records, in table order
    pub fn records(&self) -> &[TagDisambiguation] {
        &self.records
    }
}

/// Child type -> parent types, exported from the UML model
#[derive(Debug, Clone, Default)]
pub struct GeneralizationTable {
    parents: IndexMap<String, Vec<String>>,
}

impl GeneralizationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parent edge
    pub fn with_parent(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        let parents = self.parents.entry(child.into()).or_default();
        let parent = parent.into();
        if !parents.contains(&parent) {
            parents.push(parent);
        }
        self
    }

    /// Build from `<Element name><Generalization fatherName/></Element>` records
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut table = Self::new();
        for el in root_of(doc, "generalization table")?.descendants() {
            if !el.is("Element") {
                continue;
            }
            let Some(child) = el.get_attribute("name") else {
                continue;
            };
            let entry = table.parents.entry(child.to_string()).or_default();
            for parent in el
                .find_children("Generalization")
                .filter_map(|g| g.get_attribute("fatherName"))
            {
                if !entry.iter().any(|p| p == parent) {
                    entry.push(parent.to_string());
                }
            }
        }
        Ok(table)
    }

    /// Load from a file or inline document
    pub fn load(loader: &Loader, location: &Location) -> Result<Self> {
        Self::from_document(&loader.load_document(location)?)
    }

    /// Parent names of a child, in table order
    pub fn parents_of(&self, child: &str) -> &[String] {
        self.parents.get(child).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// All external tables consumed by one compilation
#[derive(Debug, Clone, Default)]
pub struct ExternalIndexes {
    /// Enum family -> legal subtypes
    pub subtypes: SubtypeIndex,
    /// Indirection types excluded from lookups
    pub complex_refs: ComplexRefList,
    /// Tag name disambiguation records
    pub tags: DisambiguationTable,
    /// Interface generalizations
    pub generalizations: GeneralizationTable,
}

impl ExternalIndexes {
    /// Empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subtype index
    pub fn with_subtypes(mut self, subtypes: SubtypeIndex) -> Self {
        self.subtypes = subtypes;
        self
    }

    /// Set the complex-reference exclusion list
    pub fn with_complex_refs(mut self, complex_refs: ComplexRefList) -> Self {
        self.complex_refs = complex_refs;
        self
    }

    /// Set the tag disambiguation table
    pub fn with_tags(mut self, tags: DisambiguationTable) -> Self {
        self.tags = tags;
        self
    }

    /// Set the generalization table
    pub fn with_generalizations(mut self, generalizations: GeneralizationTable) -> Self {
        self.generalizations = generalizations;
        self
    }
}
