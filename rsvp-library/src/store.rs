//! In-memory store of preloaded texts
//!
//! Loaded once at startup from a JSON array of `{id, title, content}` records.
//! The store is read-only: there are no write, update or delete operations.

use rsvp_common::{Error, Result, TextRecord};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct LibraryStore {
    texts: Vec<TextRecord>,
}

impl LibraryStore {
    pub fn new(texts: Vec<TextRecord>) -> Self {
        let mut seen = HashSet::new();
        for text in &texts {
            if !seen.insert(text.id) {
                // Lookups return the first record with a given id
                warn!("Duplicate library id {} ({})", text.id, text.title);
            }
        }
        Self { texts }
    }

    /// Load texts from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read library file {}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&content)?;
        info!("Loaded {} texts from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let texts: Vec<TextRecord> = serde_json::from_str(json)?;
        Ok(Self::new(texts))
    }

    /// All texts in file order
    pub fn list(&self) -> &[TextRecord] {
        &self.texts
    }

    pub fn get(&self, id: i64) -> Option<&TextRecord> {
        self.texts.iter().find(|text| text.id == id)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 1, "title": "First", "content": "alpha beta"},
        {"id": 2, "title": "Second", "content": "gamma"},
        {"id": 2, "title": "Shadowed", "content": "delta"}
    ]"#;

    #[test]
    fn test_from_json_keeps_order() {
        let store = LibraryStore::from_json(SAMPLE).unwrap();
        let titles: Vec<&str> = store.list().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Shadowed"]);
    }

    #[test]
    fn test_get_returns_first_match() {
        let store = LibraryStore::from_json(SAMPLE).unwrap();
        assert_eq!(store.get(2).unwrap().title, "Second");
        assert!(store.get(99).is_none());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            LibraryStore::from_json("{\"id\": 1}"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = LibraryStore::load(Path::new("/nonexistent/texts.json"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
