//! The timer state machine. A [Tracker] is either idle or tracking exactly one active
//! [TimeEntry]; stopping completes the entry and moves it to the completed list.
//!
//! Nothing in here performs IO. Persisting entries and asking for summaries is layered on top in
//! [session].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

pub mod category;
pub mod entry;
pub mod session;
pub mod summary;
pub mod ticker;

use entry::TimeEntry;
use summary::{category_summaries, CategorySummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState<'a> {
    Idle,
    Tracking(&'a TimeEntry),
}

#[derive(Debug, Default)]
pub struct Tracker {
    active: Option<TimeEntry>,
    completed: Vec<TimeEntry>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackerState<'_> {
        match &self.active {
            Some(entry) => TrackerState::Tracking(entry),
            None => TrackerState::Idle,
        }
    }

    pub fn active(&self) -> Option<&TimeEntry> {
        self.active.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    /// Completed entries in the order they were stopped.
    pub fn entries(&self) -> &[TimeEntry] {
        &self.completed
    }

    /// Starts tracking a new entry. Does nothing when already tracking or when either the category
    /// or the description is blank.
    /// Both values are stored trimmed.
    pub fn start(
        &mut self,
        category: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Option<&TimeEntry> {
        let category = category.trim();
        let description = description.trim();
        if self.active.is_some() || category.is_empty() || description.is_empty() {
            debug!("Ignoring start request for {category:?} {description:?}");
            return None;
        }

        let entry = TimeEntry::begin(Arc::from(category), Arc::from(description), now);
        debug!("Started entry {:?}", entry);
        self.active = Some(entry);
        self.active.as_ref()
    }

    /// Stops the active entry and returns it completed. Does nothing when idle.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<TimeEntry> {
        let completed = self.active.take()?.complete(now);
        debug!("Completed entry {:?}", completed);
        self.completed.push(completed.clone());
        Some(completed)
    }

    /// Time spent on the active entry so far.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.active
            .as_ref()
            .map(|entry| entry.elapsed(now))
            .unwrap_or_else(Duration::zero)
    }

    pub fn entries_for(&self, category: &str) -> Vec<TimeEntry> {
        self.completed
            .iter()
            .filter(|entry| &*entry.category == category)
            .cloned()
            .collect()
    }

    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        category_summaries(&self.completed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{Tracker, TrackerState};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn start_requires_category_and_description() {
        let mut tracker = Tracker::new();

        assert!(tracker.start("", "flight research", t0()).is_none());
        assert!(tracker.start("Qantas", "", t0()).is_none());
        assert!(tracker.start("Qantas", "   ", t0()).is_none());
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert!(tracker.entries().is_empty());
    }

    #[test]
    fn start_stores_trimmed_values() {
        let mut tracker = Tracker::new();
        let entry = tracker.start("  Bear ", " review ", t0()).cloned().unwrap();

        assert_eq!(&*entry.category, "Bear");
        assert_eq!(&*entry.description, "review");
    }

    #[test]
    fn start_while_tracking_is_ignored() {
        let mut tracker = Tracker::new();
        let first = tracker.start("Qantas", "flight research", t0()).cloned().unwrap();

        assert!(tracker.start("Todd", "other", t0() + Duration::seconds(1)).is_none());
        assert_eq!(tracker.active(), Some(&first));
    }

    #[test]
    fn stop_when_idle_is_ignored() {
        let mut tracker = Tracker::new();
        assert!(tracker.stop(t0()).is_none());
        assert!(tracker.entries().is_empty());
    }

    #[test]
    fn qantas_example() {
        let mut tracker = Tracker::new();
        tracker.start("Qantas", "flight research", t0());
        assert!(tracker.is_tracking());
        assert_eq!(tracker.elapsed(t0() + Duration::seconds(3)), Duration::seconds(3));

        let completed = tracker.stop(t0() + Duration::milliseconds(65_000)).unwrap();

        assert_eq!(completed.duration, Some(65_000));
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert_eq!(tracker.elapsed(t0() + Duration::hours(1)), Duration::zero());

        let summaries = tracker.category_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(&*summaries[0].category, "Qantas");
        assert_eq!(summaries[0].total_duration, 65_000);
    }

    #[test]
    fn durations_match_timestamps_over_many_sessions() {
        let mut tracker = Tracker::new();
        let mut now = t0();
        let categories = ["Qantas", "TfNSW", "Qantas", "Bear", "TfNSW", "Qantas"];

        for (i, category) in categories.iter().enumerate() {
            tracker.start(category, "task", now);
            now += Duration::milliseconds(1_234 * (i as i64 + 1));
            tracker.stop(now);
            now += Duration::seconds(5);
        }

        for entry in tracker.entries() {
            let end = entry.end_time.unwrap();
            assert_eq!(entry.duration, Some((end - entry.start_time).num_milliseconds()));
        }

        for summary in tracker.category_summaries() {
            let expected: i64 = tracker
                .entries_for(&summary.category)
                .iter()
                .filter_map(|e| e.duration)
                .sum();
            assert_eq!(summary.total_duration, expected);
        }
        assert_eq!(tracker.entries_for("Qantas").len(), 3);
    }
}
