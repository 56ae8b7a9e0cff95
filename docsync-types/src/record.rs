use crate::{DocumentId, FieldMap};
use serde::{Deserialize, Serialize};

/// Key under which a record's id is written to the index.
pub const OBJECT_ID_KEY: &str = "objectID";

/// Key under which a record's type is written to the index.
pub const TYPE_KEY: &str = "type";

/// A single object written to a search index.
///
/// `id` and `record_type` are structural: the id always mirrors the source
/// document id and the type decides which index receives the record. The
/// remaining fields are a flat map that never contains the two reserved keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(rename = "objectID")]
    pub id: DocumentId,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl IndexRecord {
    /// Creates a record with no fields beyond id and type.
    pub fn new(id: impl Into<DocumentId>, record_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            record_type: record_type.into(),
            fields: FieldMap::new(),
        }
    }

    /// Merges `fields` into the record, later values replacing earlier ones.
    ///
    /// Reserved keys are skipped and returned so the caller can report them.
    pub fn merge_fields(&mut self, fields: FieldMap) -> Vec<String> {
        let mut skipped = Vec::new();
        for (key, value) in fields {
            if key == OBJECT_ID_KEY || key == TYPE_KEY {
                skipped.push(key);
                continue;
            }
            self.fields.insert(key, value);
        }
        skipped
    }

    /// Returns a field value by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}
