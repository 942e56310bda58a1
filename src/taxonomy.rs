//! Closed category sets, loaded from TOML and rendered into prompts.
//!
//! The taxonomy is configuration, never hardcoded. Without one, prompts
//! leave the category fields open and the model chooses its own labels.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TaxonomyError, TaxonomyResult};

/// One permitted request category with its permitted sub-categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestType {
    pub name: String,
    #[serde(default)]
    pub sub_types: Vec<String>,
}

/// Permitted categories and attribute labels, order-preserving.
///
/// TOML shape: repeated `[[request]]` tables plus a top-level
/// `key_attributes` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(rename = "request", default)]
    pub requests: Vec<RequestType>,
    #[serde(default)]
    pub key_attributes: Vec<String>,
}

impl Taxonomy {
    pub fn load(path: &Path) -> TaxonomyResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let taxonomy: Self = toml::from_str(&raw).map_err(|source| TaxonomyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            requests = taxonomy.requests.len(),
            attributes = taxonomy.key_attributes.len(),
            path = %path.display(),
            "loaded taxonomy"
        );
        Ok(taxonomy)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
key_attributes = ["Deal Name", "Amount", "Expiration Date"]

[[request]]
name = "Money Movement - Inbound"
sub_types = ["Principal", "Interest", "Principal + Interest"]

[[request]]
name = "Fee Payment"
sub_types = ["Ongoing Fee", "Letter of Credit Fee"]
"#;

    #[test]
    fn loads_requests_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taxonomy.toml");
        fs::write(&path, SAMPLE).unwrap();

        let taxonomy = Taxonomy::load(&path).unwrap();
        assert_eq!(taxonomy.requests.len(), 2);
        assert_eq!(taxonomy.requests[0].name, "Money Movement - Inbound");
        assert_eq!(taxonomy.requests[0].sub_types.len(), 3);
        assert_eq!(taxonomy.requests[1].name, "Fee Payment");
        assert_eq!(
            taxonomy.key_attributes,
            vec!["Deal Name", "Amount", "Expiration Date"]
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taxonomy.toml");
        fs::write(&path, "key_attributes = []\n").unwrap();

        let taxonomy = Taxonomy::load(&path).unwrap();
        assert!(taxonomy.requests.is_empty());
        assert!(taxonomy.key_attributes.is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = Taxonomy::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TaxonomyError::Read { .. }));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taxonomy.toml");
        fs::write(&path, "[[request]]\nname = ").unwrap();

        let err = Taxonomy::load(&path).unwrap_err();
        assert!(matches!(err, TaxonomyError::Parse { .. }));
    }
}
