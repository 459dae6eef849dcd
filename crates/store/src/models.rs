//! Record shapes shared with the HTTP layer.

use serde::{Deserialize, Serialize};

/// A canned reply shown to the wizard, ranked within its task classification.
///
/// `task_classification` is a plain string key, not a reference to a
/// [`TaskClassification`] id. Renaming a classification does not update the
/// responses filed under the old name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequentResponse {
    /// Opaque unique id (UUID v4).
    pub id: String,
    /// Name of the owning group.
    pub task_classification: String,
    /// Reply text.
    pub content: String,
    /// Zero-based rank within the group.
    ///
    /// Files written before ranks existed carry no `order`; those records
    /// load as 0 and are renumbered on open.
    #[serde(default)]
    pub order: u32,
}

/// Body of a create or update request for a [`FrequentResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequentResponseInput {
    pub task_classification: String,
    pub content: String,
    /// Requested rank. Omitted means "append" on create and "keep" on update.
    #[serde(default)]
    pub order: Option<u32>,
}

impl FrequentResponseInput {
    /// Input without an explicit rank.
    pub fn new(task_classification: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            task_classification: task_classification.into(),
            content: content.into(),
            order: None,
        }
    }

    /// Same input with an explicit rank.
    pub fn at(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }
}

/// A named task classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskClassification {
    pub id: String,
    pub name: String,
}

/// Body of a create or update request for a [`TaskClassification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskClassificationInput {
    pub name: String,
}

/// Acknowledgment returned by deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub status: String,
    pub id: String,
}

impl Deleted {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            status: "deleted".to_string(),
            id: id.into(),
        }
    }
}

/// One transcript line of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    /// Sender role, e.g. "user", "wizard" or "assistant".
    pub role: String,
    pub text: String,
    /// Local ISO-8601 time the message was recorded.
    pub timestamp: String,
}
