//! Record transformation - turns fetched documents into index records.
//!
//! Each record starts from the baseline fields every document has (id, type,
//! revision) and is then overlaid with the fields the deployment's
//! serializer produces. Serializer fields win on key collision, except for
//! `objectID` and `type`, which always come from the document itself.

use crate::error::{IndexerError, IndexerResult};
use docsync_types::{Document, FieldMap, IndexRecord, OBJECT_ID_KEY, TYPE_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Produces the type-specific fields of an index record.
///
/// One serializer covers every registered type and branches on
/// `document.doc_type` internally.
pub trait RecordSerializer: Send + Sync {
    /// Returns the fields to overlay on the baseline record.
    fn serialize(&self, document: &Document) -> Result<FieldMap, String>;

    /// Whether this serializer knows how to handle `doc_type`.
    ///
    /// Checked against every registered type when an indexer is built.
    fn handles(&self, _doc_type: &str) -> bool {
        true
    }
}

/// Baseline fields derived from any document: `objectID`, `type`, and `rev`
/// when the store reported a revision.
pub fn standard_values(document: &Document) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(OBJECT_ID_KEY.to_string(), Value::from(document.id.as_str()));
    fields.insert(TYPE_KEY.to_string(), Value::from(document.doc_type.as_str()));
    fields.extend(baseline_fields(document));
    fields
}

/// The non-structural part of [`standard_values`]. `objectID` and `type`
/// live on the record itself.
fn baseline_fields(document: &Document) -> FieldMap {
    let mut fields = FieldMap::new();
    if let Some(rev) = &document.rev {
        fields.insert("rev".to_string(), Value::from(rev.as_str()));
    }
    fields
}

/// Flattens a portable-text block array into plain text.
///
/// Span texts inside a block are concatenated; blocks are joined with a
/// single space. Entries that are not text blocks (images, embeds) are
/// skipped. Anything other than an array flattens to an empty string.
pub fn flatten_blocks(blocks: &Value) -> String {
    let Some(blocks) = blocks.as_array() else {
        return String::new();
    };

    blocks
        .iter()
        .filter(|block| block.get("_type").and_then(Value::as_str) == Some("block"))
        .map(|block| {
            block
                .get("children")
                .and_then(Value::as_array)
                .map(|children| {
                    children
                        .iter()
                        .filter_map(|child| child.get("text").and_then(Value::as_str))
                        .collect::<String>()
                })
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Applies baseline + serializer to documents, preserving order.
#[derive(Clone)]
pub struct RecordTransformer {
    serializer: Arc<dyn RecordSerializer>,
}

impl RecordTransformer {
    pub fn new(serializer: Arc<dyn RecordSerializer>) -> Self {
        Self { serializer }
    }

    /// Returns the serializer this transformer applies.
    pub fn serializer(&self) -> &Arc<dyn RecordSerializer> {
        &self.serializer
    }

    /// Transforms every document. Output order matches input order; the
    /// first serializer error fails the whole batch.
    pub fn transform(&self, documents: &[Document]) -> IndexerResult<Vec<IndexRecord>> {
        documents.iter().map(|doc| self.transform_one(doc)).collect()
    }

    /// Transforms a single document.
    pub fn transform_one(&self, document: &Document) -> IndexerResult<IndexRecord> {
        let fields = self
            .serializer
            .serialize(document)
            .map_err(|reason| IndexerError::Serialization {
                id: document.id.clone(),
                doc_type: document.doc_type.clone(),
                reason,
            })?;

        let mut record = IndexRecord::new(document.id.clone(), document.doc_type.clone());
        record.fields = baseline_fields(document);
        // Only serializer output can collide with the reserved keys.
        let skipped = record.merge_fields(fields);
        if !skipped.is_empty() {
            debug!(
                "Ignoring reserved keys {:?} from serializer for {}",
                skipped, document.id
            );
        }
        Ok(record)
    }
}

/// Wraps a closure as a serializer.
///
/// Handles every type unless restricted with [`FnSerializer::for_types`].
pub struct FnSerializer<F> {
    func: F,
    types: Option<BTreeSet<String>>,
}

impl<F> FnSerializer<F>
where
    F: Fn(&Document) -> FieldMap + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func, types: None }
    }

    /// Restricts the serializer to the given types.
    #[must_use]
    pub fn for_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

impl<F> RecordSerializer for FnSerializer<F>
where
    F: Fn(&Document) -> FieldMap + Send + Sync,
{
    fn serialize(&self, document: &Document) -> Result<FieldMap, String> {
        if !self.handles(&document.doc_type) {
            return Err(format!("unhandled document type `{}`", document.doc_type));
        }
        Ok((self.func)(document))
    }

    fn handles(&self, doc_type: &str) -> bool {
        self.types.as_ref().is_none_or(|types| types.contains(doc_type))
    }
}

/// Which fields of one document type end up in its records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeProjection {
    /// Top-level fields copied as-is. Absent fields are left out.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Portable-text fields flattened to plain text.
    #[serde(default)]
    pub blocks: Vec<String>,
}

/// Config-driven serializer: a [`TypeProjection`] per document type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectionSerializer {
    projections: BTreeMap<String, TypeProjection>,
}

impl ProjectionSerializer {
    pub fn new(projections: BTreeMap<String, TypeProjection>) -> Self {
        Self { projections }
    }

    /// Adds or replaces the projection for `doc_type`.
    #[must_use]
    pub fn with_type(mut self, doc_type: impl Into<String>, projection: TypeProjection) -> Self {
        self.projections.insert(doc_type.into(), projection);
        self
    }
}

impl RecordSerializer for ProjectionSerializer {
    fn serialize(&self, document: &Document) -> Result<FieldMap, String> {
        let projection = self
            .projections
            .get(&document.doc_type)
            .ok_or_else(|| format!("no projection for type `{}`", document.doc_type))?;

        let mut fields = FieldMap::new();
        for name in &projection.fields {
            if let Some(value) = document.fields.get(name) {
                fields.insert(name.clone(), value.clone());
            }
        }
        for name in &projection.blocks {
            if let Some(value) = document.fields.get(name) {
                fields.insert(name.clone(), Value::String(flatten_blocks(value)));
            }
        }
        Ok(fields)
    }

    fn handles(&self, doc_type: &str) -> bool {
        self.projections.contains_key(doc_type)
    }
}
