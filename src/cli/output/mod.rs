pub mod distribution;

use ansi_term::{Colour, Style};
use chrono::{Duration, Local};

use crate::{
    server::storage::entities::TimeEntryDocument,
    tracker::{
        category::{CategorySelection, OTHER_CATEGORY, PREDEFINED_CATEGORIES},
        entry::TimeEntry,
        summary::SummaryBook,
    },
    utils::time::{format_duration, format_elapsed},
};

const TIMER_COLOUR: Colour = Colour::RGB(0x15, 0x80, 0x3D);

/// Panel shown while an entry is being tracked.
pub fn render_active(entry: &TimeEntry, elapsed: Duration) -> String {
    let label = Style::new().bold();
    format!(
        "{}\n{}\n{} {}\n{} {}\n{} {}\n",
        label.paint("Currently Tracking:"),
        TIMER_COLOUR.bold().paint(format_elapsed(elapsed)),
        label.paint("Category:"),
        entry.category,
        label.paint("Description:"),
        entry.description,
        label.paint("Started:"),
        entry.start_time.with_timezone(&Local).format("%X"),
    )
}

/// The once-per-second timer line. Rewrites the current terminal line.
pub fn render_elapsed(elapsed: Duration) -> String {
    format!("\r\x1b[2K{}", TIMER_COLOUR.bold().paint(format_elapsed(elapsed)))
}

pub fn render_stopped(entry: &TimeEntry) -> String {
    format!(
        "\r\x1b[2KStopped {} after {}\n",
        entry.category,
        format_duration(Duration::milliseconds(entry.duration.unwrap_or_default()))
    )
}

/// One card per generated summary.
pub fn render_summaries(summaries: &SummaryBook) -> String {
    if summaries.is_empty() {
        return "No summaries yet.\n".into();
    }
    let mut output = String::new();
    for (category, summary) in summaries.iter() {
        output += &format!("{}\n{}\n\n", Style::new().bold().paint(category), summary.trim());
    }
    output
}

pub fn render_categories(selected: Option<&CategorySelection>) -> String {
    let mut output = String::new();
    for name in PREDEFINED_CATEGORIES {
        let marker = match selected {
            Some(CategorySelection::Predefined(v)) if *v == name => "*",
            _ => " ",
        };
        output += &format!("{marker} {name}\n");
    }
    let marker = if selected.is_some_and(CategorySelection::is_other) {
        "*"
    } else {
        " "
    };
    output += &format!("{marker} {OTHER_CATEGORY} (any other name)\n");
    output
}

/// One line per stored entry: start, duration, category, description.
pub fn render_documents(documents: &[TimeEntryDocument]) -> String {
    let mut output = String::new();
    for document in documents {
        let fields = &document.fields;
        let start = fields
            .start_time
            .map(|v| v.with_timezone(&Local).format("%x %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());
        let duration = fields
            .duration
            .map(|v| format_duration(Duration::milliseconds(v)))
            .unwrap_or_else(|| "-".into());
        output += &format!(
            "{}\t{}\t{}\t{}\n",
            start,
            duration,
            fields.category.as_deref().unwrap_or("-"),
            fields.description.as_deref().unwrap_or("-"),
        );
    }
    output
}
