use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use tracing::{info, info_span, warn, Instrument};

use crate::{
    client::{EntryApi, SummaryApi},
    server::storage::entities::TimeEntryDocument,
    utils::clock::Clock,
};

use super::{
    category::CategorySelection,
    entry::TimeEntry,
    summary::{summary_prompt, SummaryBook},
    Tracker,
};

/// What happened when an entry was stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    pub entry: TimeEntry,
    /// `None` when persisting failed.
    pub stored: Option<TimeEntryDocument>,
    /// `None` when generating the summary failed; the previous summary is kept then.
    pub summary: Option<Arc<str>>,
}

/// A [Tracker] wired to the persistence API and the generation endpoint.
pub struct TrackingSession<E, S> {
    tracker: Tracker,
    summaries: SummaryBook,
    entries_api: E,
    summary_api: S,
    clock: Arc<dyn Clock>,
}

impl<E: EntryApi, S: SummaryApi> TrackingSession<E, S> {
    pub fn new(entries_api: E, summary_api: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            tracker: Tracker::new(),
            summaries: SummaryBook::default(),
            entries_api,
            summary_api,
            clock,
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn summaries(&self) -> &SummaryBook {
        &self.summaries
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.tracker.elapsed(self.clock.time())
    }

    pub fn start(&mut self, selection: &CategorySelection, description: &str) -> Option<TimeEntry> {
        let now = self.clock.time();
        self.tracker
            .start(&selection.resolve(), description, now)
            .cloned()
    }

    /// Stops the active entry, persists it and then refreshes the summary of its category. The
    /// summary request only starts once persisting has finished. Failures of either call are
    /// logged and leave the local state as it is after the stop.
    pub async fn stop(&mut self) -> Option<StopReport> {
        let entry = self.tracker.stop(self.clock.time())?;
        info!("Stopped {} after {:?}ms", entry.id, entry.duration);

        let stored = match self
            .entries_api
            .save_entry(&entry)
            .instrument(info_span!("Persisting entry"))
            .await
        {
            Ok(document) => Some(document),
            Err(e) => {
                warn!("Failed to persist entry {}: {e:?}", entry.id);
                None
            }
        };

        let summary = match self
            .refresh_summary(entry.category.clone())
            .instrument(info_span!("Summarizing category"))
            .await
        {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Failed to summarize {}: {e:?}", entry.category);
                None
            }
        };

        Some(StopReport {
            entry,
            stored,
            summary,
        })
    }

    async fn refresh_summary(&mut self, category: Arc<str>) -> Result<Arc<str>> {
        let entries = self.tracker.entries_for(&category);
        let prompt = summary_prompt(&category, &entries)?;
        let summary: Arc<str> = self.summary_api.generate(&prompt).await?.into();
        self.summaries.insert(category, summary.clone());
        Ok(summary)
    }
}
