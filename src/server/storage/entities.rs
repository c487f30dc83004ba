use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::entry::TimeEntry;

/// Fields a client may store. None of them is required, mirroring a schema that only casts
/// types. Unknown fields are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl From<TimeEntry> for TimeEntryFields {
    fn from(
        TimeEntry {
            id,
            category,
            description,
            start_time,
            end_time,
            duration,
        }: TimeEntry,
    ) -> Self {
        Self {
            id: Some(id),
            category: Some(category),
            description: Some(description),
            start_time: Some(start_time),
            end_time,
            duration,
        }
    }
}

/// A stored entry as it is written to disk and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryDocument {
    #[serde(rename = "_id")]
    pub document_id: Arc<str>,
    #[serde(flatten)]
    pub fields: TimeEntryFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntryDocument {
    /// Rebuilds the tracked entry. Documents missing any of the required entry fields yield `None`.
    pub fn to_entry(&self) -> Option<TimeEntry> {
        let fields = &self.fields;
        Some(TimeEntry {
            id: fields.id.clone()?,
            category: fields.category.clone()?,
            description: fields.description.clone()?,
            start_time: fields.start_time?,
            end_time: fields.end_time,
            duration: fields.duration,
        })
    }
}
