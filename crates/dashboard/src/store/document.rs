//! Raw documents and collection snapshots as delivered by the store.

use grocify_core::Fields;
use serde::{Deserialize, Serialize};

/// One stored document: its ID plus an untyped field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Full contents of a collection at one point in store time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Store-assigned, non-decreasing revision. Stores without revisions
    /// send 0.
    #[serde(default)]
    pub sequence: u64,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Snapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_snapshot_wire_format() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "sequence": 4,
            "documents": [
                { "id": "a", "fields": { "name": "Milk" } },
                { "id": "b" }
            ]
        }))
        .unwrap();

        assert_eq!(snapshot.sequence, 4);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.documents[0].fields["name"], json!("Milk"));
        assert!(snapshot.documents[1].fields.is_empty());
    }

    #[test]
    fn test_snapshot_defaults() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.sequence, 0);
        assert!(snapshot.is_empty());
    }
}
