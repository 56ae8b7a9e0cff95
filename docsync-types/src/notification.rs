//! Change notifications delivered by the document store.
//!
//! A notification only carries ids. Created and updated ids must be resolved
//! against the store before anything is written; deleted ids are never
//! resolved because the document may already be gone.

use crate::DocumentId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The three id lists of a notification. Missing lists decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeIds {
    #[serde(default)]
    pub created: Vec<DocumentId>,
    #[serde(default)]
    pub updated: Vec<DocumentId>,
    #[serde(default)]
    pub deleted: Vec<DocumentId>,
}

/// Inbound notification body: `{ "ids": { "created", "updated", "deleted" } }`.
///
/// Sender metadata is accepted so real webhook payloads decode, but nothing
/// downstream depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    pub ids: ChangeIds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
}

impl ChangeNotification {
    /// Builds a notification from the three id lists.
    pub fn new<I>(created: I, updated: I, deleted: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DocumentId>,
    {
        Self {
            ids: ChangeIds {
                created: created.into_iter().map(Into::into).collect(),
                updated: updated.into_iter().map(Into::into).collect(),
                deleted: deleted.into_iter().map(Into::into).collect(),
            },
            ..Default::default()
        }
    }

    /// `created ∪ updated` in first-occurrence order, duplicates collapsed.
    pub fn requested_ids(&self) -> Vec<DocumentId> {
        let mut seen = HashSet::new();
        self.ids
            .created
            .iter()
            .chain(&self.ids.updated)
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    /// Whether all three id lists are empty.
    pub fn is_empty(&self) -> bool {
        self.ids.created.is_empty() && self.ids.updated.is_empty() && self.ids.deleted.is_empty()
    }
}
