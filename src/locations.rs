//! Resource location resolution
//!
//! A compilation reads the schema and the external index tables either from
//! disk or from in-memory text.

use std::path::PathBuf;

/// Resource location - a file path or inline document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// In-memory document content
    String(String),
}

impl Location {
    /// Create a location from a string (auto-detect type)
    ///
    /// Text that starts with `<` is taken as an inline document, anything else
    /// as a path.
    pub fn parse(s: &str) -> Self {
        if s.trim_start().starts_with('<') {
            Location::String(s.to_string())
        } else {
            Location::Path(PathBuf::from(s))
        }
    }

    /// Get the location as a display string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::String(_) => "<inline>".to_string(),
        }
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::Path(path)
    }
}

impl From<&std::path::Path> for Location {
    fn from(path: &std::path::Path) -> Self {
        Location::Path(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_path() {
        let loc = Location::parse("/tmp/schema.xsd");
        assert!(matches!(loc, Location::Path(_)));
        assert!(loc.is_file());
    }

    #[test]
    fn test_location_from_inline() {
        let loc = Location::parse("  <xsd:schema/>");
        assert!(matches!(loc, Location::String(_)));
        assert_eq!(loc.as_str(), "<inline>");
    }
}
