use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::entry::TimeEntry;

/// Completed entries of one category with their summed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: Arc<str>,
    /// Milliseconds.
    pub total_duration: i64,
    pub entries: Vec<TimeEntry>,
}

/// Groups entries by category in order of first appearance. Entries without a duration, or with a
/// zero one, don't contribute.
pub fn category_summaries<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();

    for entry in entries {
        let Some(duration) = entry.duration.filter(|v| *v != 0) else {
            continue;
        };

        match summaries.iter_mut().find(|s| s.category == entry.category) {
            Some(existing) => {
                existing.total_duration += duration;
                existing.entries.push(entry.clone());
            }
            None => summaries.push(CategorySummary {
                category: entry.category.clone(),
                total_duration: duration,
                entries: vec![entry.clone()],
            }),
        }
    }

    summaries
}

/// Prompt sent to the generation endpoint for one category.
pub fn summary_prompt(category: &str, entries: &[TimeEntry]) -> Result<String> {
    Ok(format!(
        "Summarize the following time entries for category \"{category}\": {}",
        serde_json::to_string(entries)?
    ))
}

/// Generated summaries keyed by category. Keeps the order categories were first summarized in.
#[derive(Debug, Default, Clone)]
pub struct SummaryBook {
    summaries: Vec<(Arc<str>, Arc<str>)>,
}

impl SummaryBook {
    /// Stores `summary` for `category`, replacing the previous one in place.
    pub fn insert(&mut self, category: Arc<str>, summary: Arc<str>) {
        match self.summaries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => *existing = summary,
            None => self.summaries.push((category, summary)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.summaries
            .iter()
            .find(|(c, _)| &**c == category)
            .map(|(_, s)| &**s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.summaries.iter().map(|(c, s)| (&**c, &**s))
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::tracker::entry::TimeEntry;

    use super::{category_summaries, summary_prompt, SummaryBook};

    fn completed(category: &str, ms: i64) -> TimeEntry {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        TimeEntry::begin(category.into(), "work".into(), start)
            .complete(start + Duration::milliseconds(ms))
    }

    #[test]
    fn totals_are_summed_per_category_in_first_seen_order() {
        let entries = vec![
            completed("Todd", 1_000),
            completed("Qantas", 65_000),
            completed("Todd", 2_500),
        ];

        let summaries = category_summaries(&entries);

        assert_eq!(summaries.len(), 2);
        assert_eq!(&*summaries[0].category, "Todd");
        assert_eq!(summaries[0].total_duration, 3_500);
        assert_eq!(summaries[0].entries.len(), 2);
        assert_eq!(&*summaries[1].category, "Qantas");
        assert_eq!(summaries[1].total_duration, 65_000);
    }

    #[test]
    fn entries_without_duration_are_skipped() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let active = TimeEntry::begin("Bear".into(), "open".into(), start);
        let entries = vec![active, completed("Bear", 0), completed("TikTok", 10)];

        let summaries = category_summaries(&entries);

        assert_eq!(summaries.len(), 1);
        assert_eq!(&*summaries[0].category, "TikTok");
    }

    #[test]
    fn prompt_embeds_category_and_entries() {
        let entries = vec![completed("Qantas", 65_000)];
        let prompt = summary_prompt("Qantas", &entries).unwrap();

        assert!(prompt.starts_with("Summarize the following time entries for category \"Qantas\": ["));
        assert!(prompt.contains("\"duration\":65000"));
        assert!(prompt.contains(&*entries[0].id));
    }

    #[test]
    fn summaries_overwrite_in_place() {
        let mut book = SummaryBook::default();
        book.insert("Qantas".into(), "first".into());
        book.insert("Todd".into(), "other".into());
        book.insert("Qantas".into(), "second".into());

        assert_eq!(book.get("Qantas"), Some("second"));
        assert_eq!(
            book.iter().collect::<Vec<_>>(),
            vec![("Qantas", "second"), ("Todd", "other")]
        );
    }
}
