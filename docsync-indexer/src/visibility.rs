//! Visibility policies - decide whether a fetched document belongs in the
//! index set.
//!
//! A policy runs once per fetched document per run. It must be deterministic
//! for a given document state and must not have side effects. Returning
//! `Err` marks a defect in the policy and fails the whole run.

use docsync_types::Document;
use serde::{Deserialize, Serialize};

/// Decides whether a document should be discoverable through search.
pub trait VisibilityPolicy: Send + Sync {
    fn is_visible(&self, document: &Document) -> Result<bool, String>;
}

/// Default policy: every fetched document is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl VisibilityPolicy for AlwaysVisible {
    fn is_visible(&self, _document: &Document) -> Result<bool, String> {
        Ok(true)
    }
}

impl<F> VisibilityPolicy for F
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn is_visible(&self, document: &Document) -> Result<bool, String> {
        Ok(self(document))
    }
}

/// Visibility driven by a boolean flag on the document.
///
/// The document is visible when the flag equals `visible_when`. An absent
/// flag yields `when_missing`; a flag of any other JSON type is an error.
///
/// ```
/// use docsync_indexer::{FieldFlagVisibility, VisibilityPolicy};
/// use docsync_types::Document;
///
/// let policy = FieldFlagVisibility::hidden_when_true("/isHidden");
/// let doc = Document::new("a", "post").with_field("isHidden", true);
/// assert_eq!(policy.is_visible(&doc), Ok(false));
/// ```
///
/// `pointer` must be a JSON pointer. A bare key such as `isHidden` is
/// rejected when deserializing and fails every check at run time, so a
/// mistyped flag never silently falls back to `when_missing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FlagSettings")]
pub struct FieldFlagVisibility {
    /// JSON pointer to the flag (e.g. `/isHidden`).
    pub pointer: String,
    /// Flag value that makes the document visible.
    pub visible_when: bool,
    /// Visibility of documents that do not carry the flag.
    pub when_missing: bool,
}

/// Unvalidated config form of [`FieldFlagVisibility`].
#[derive(Deserialize)]
struct FlagSettings {
    pointer: String,
    #[serde(default = "default_true")]
    visible_when: bool,
    #[serde(default = "default_true")]
    when_missing: bool,
}

fn default_true() -> bool {
    true
}

impl TryFrom<FlagSettings> for FieldFlagVisibility {
    type Error = String;

    fn try_from(settings: FlagSettings) -> Result<Self, Self::Error> {
        check_pointer(&settings.pointer)?;
        Ok(Self {
            pointer: settings.pointer,
            visible_when: settings.visible_when,
            when_missing: settings.when_missing,
        })
    }
}

fn check_pointer(pointer: &str) -> Result<(), String> {
    if pointer.starts_with('/') {
        Ok(())
    } else {
        Err(format!(
            "flag pointer `{pointer}` must be a JSON pointer starting with `/` (e.g. `/{pointer}`)"
        ))
    }
}

impl FieldFlagVisibility {
    /// Visible only when the flag is present and `true` (e.g. `/published`).
    pub fn visible_when_true(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            visible_when: true,
            when_missing: false,
        }
    }

    /// Hidden only when the flag is present and `true` (e.g. `/isHidden`).
    pub fn hidden_when_true(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            visible_when: false,
            when_missing: true,
        }
    }
}

impl VisibilityPolicy for FieldFlagVisibility {
    fn is_visible(&self, document: &Document) -> Result<bool, String> {
        check_pointer(&self.pointer)?;
        match document.get(&self.pointer) {
            None | Some(serde_json::Value::Null) => Ok(self.when_missing),
            Some(serde_json::Value::Bool(flag)) => Ok(*flag == self.visible_when),
            Some(other) => Err(format!(
                "field {} is not a boolean (found {other})",
                self.pointer
            )),
        }
    }
}
