use crate::{DocumentId, Error, Result};
use serde::{Deserialize, Serialize};

/// Flat JSON object used for type-specific document fields and for index
/// record fields.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// An id plus the type tag that decides which index it routes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub doc_type: String,
}

/// A document as returned by the store.
///
/// The store's reserved keys (`_id`, `_type`, `_rev`) are lifted into typed
/// fields; every other key lands in `fields` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Document {
    /// Creates a document with no type-specific fields.
    pub fn new(id: impl Into<DocumentId>, doc_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc_type: doc_type.into(),
            rev: None,
            fields: FieldMap::new(),
        }
    }

    /// Adds a field, replacing any previous value under the same key.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the store revision.
    #[must_use]
    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }

    /// Decodes a raw store document. Fails when `_id` or `_type` is missing.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidDocument("expected a JSON object".to_string()));
        }
        for key in ["_id", "_type"] {
            if value.get(key).and_then(|v| v.as_str()).is_none() {
                return Err(Error::InvalidDocument(format!("missing string field `{key}`")));
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The id/type pair of this document.
    pub fn doc_ref(&self) -> DocumentRef {
        DocumentRef {
            id: self.id.clone(),
            doc_type: self.doc_type.clone(),
        }
    }

    /// Looks up a field by JSON pointer (e.g. `/slug/current`).
    ///
    /// The first pointer segment addresses `fields`; the rest walks into the
    /// nested value.
    pub fn get(&self, pointer: &str) -> Option<&serde_json::Value> {
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let key = head.replace("~1", "/").replace("~0", "~");
        let value = self.fields.get(&key)?;
        match rest {
            Some(rest) => value.pointer(&format!("/{rest}")),
            None => Some(value),
        }
    }

    /// Extract a string value using a JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.get(pointer).and_then(|v| v.as_str())
    }

    /// Extract a boolean value using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.get(pointer).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.get(pointer).and_then(|v| v.as_f64())
    }
}
