use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One tracked interval. An entry without `end_time` is the active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Arc<str>,
    pub category: Arc<str>,
    pub description: Arc<str>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds between start and end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl TimeEntry {
    pub fn begin(category: Arc<str>, description: Arc<str>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string().into(),
            category,
            description,
            start_time,
            end_time: None,
            duration: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Closes the entry at `end_time`. The duration is always derived from the two timestamps.
    pub fn complete(self, end_time: DateTime<Utc>) -> Self {
        let duration = (end_time - self.start_time).num_milliseconds();
        Self {
            end_time: Some(end_time),
            duration: Some(duration),
            ..self
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.start_time
    }
}
