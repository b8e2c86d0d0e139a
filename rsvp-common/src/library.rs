//! Library text records
//!
//! Wire format shared by the library service (producer) and the reader's
//! library client (consumer).

use serde::{Deserialize, Serialize};

/// One preloaded text available to the reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_record_wire_format() {
        let json = r#"{"id": 3, "title": "Ozymandias", "content": "I met a traveller"}"#;
        let record: TextRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, 3);
        assert_eq!(record.title, "Ozymandias");
        assert_eq!(record.content, "I met a traveller");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["title"], "Ozymandias");
    }
}
