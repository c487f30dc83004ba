use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use now::DateTimeNow;
use tracing::{info, warn};

use crate::{
    client::{ApiClient, EntryApi, SummaryApi},
    server::storage::entities::TimeEntryDocument,
    tracker::{
        entry::TimeEntry,
        summary::{category_summaries, summary_prompt},
    },
    utils::time::next_day_start,
};

use super::{
    output::{
        distribution::{render_distribution, DEFAULT_CHART_WIDTH},
        render_documents,
    },
    Args, ClientArgs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[command(flatten)]
    client: ClientArgs,
    #[arg(
        long = "start",
        short,
        help = "Start of the range. Examples are \"yesterday\", \"1 hour ago\", \"15/03/2025\", \"12:00 16/03/2025\". Defaults to today"
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "End of the range, same formats as start. Defaults to now"
    )]
    end_date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long = "days",
        default_value_t = false,
        help = "Take inputs as whole days. For example if start and end are both 15/03/2025 this option covers the whole day"
    )]
    treat_as_days: bool,
    #[arg(long, help = "Ask the generation service for a summary of every category in range")]
    summaries: bool,
}

/// Half-open range of entry start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl ReportRange {
    pub fn contains(&self, entry: &TimeEntry) -> bool {
        let start: DateTime<Utc> = self.start.into();
        let end: DateTime<Utc> = self.end.into();
        entry.start_time >= start && entry.start_time < end
    }
}

/// Provides the defaults for `report`: from the beginning of today until now.
fn parse_range(
    start_date: Option<String>,
    end_date: Option<String>,
    date_style: DateStyle,
    treat_as_days: bool,
    now: DateTime<Local>,
) -> Result<ReportRange> {
    let dialect: chrono_english::Dialect = date_style.into();
    let mut start = match start_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => v.with_timezone(&Local),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate start date {e}"),
                )
                .into());
        }
        None => now.beginning_of_day(),
    };
    let mut end = match end_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => v.with_timezone(&Local),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate end date {e}"),
                )
                .into());
        }
        None => now,
    };
    if treat_as_days {
        start = start.beginning_of_day();
        end = next_day_start(end);
    }

    Ok(ReportRange { start, end })
}

/// Completed entries of `documents` that started inside `range`.
pub fn entries_in_range(documents: &[TimeEntryDocument], range: &ReportRange) -> Vec<TimeEntry> {
    documents
        .iter()
        .filter_map(TimeEntryDocument::to_entry)
        .filter(|entry| range.contains(entry))
        .collect()
}

/// Every entry of `category`, zero-length ones included, as the tracking session sends them.
pub fn entries_for_category(entries: &[TimeEntry], category: &str) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| &*entry.category == category)
        .cloned()
        .collect()
}

/// Command to process `report`. Prints the distribution of entries between `start` and `end`.
pub async fn process_report_command(
    ReportCommand {
        client,
        start_date,
        end_date,
        date_style,
        treat_as_days,
        summaries,
    }: ReportCommand,
) -> Result<()> {
    let range = parse_range(start_date, end_date, date_style, treat_as_days, Local::now())?;
    let api = ApiClient::new(&client.server, &client.model);

    let documents = api.list_entries().await?;
    let entries = entries_in_range(&documents, &range);
    info!(
        "{} of {} entries between {} and {}",
        entries.len(),
        documents.len(),
        range.start,
        range.end
    );

    println!(
        "{} - {}",
        range.start.format("%x %H:%M"),
        range.end.format("%x %H:%M")
    );
    let category_totals = category_summaries(&entries);
    print!("{}", render_distribution(&category_totals, DEFAULT_CHART_WIDTH));

    if summaries {
        for summary in &category_totals {
            let category_entries = entries_for_category(&entries, &summary.category);
            let prompt = summary_prompt(&summary.category, &category_entries)?;
            match api.generate(&prompt).await {
                Ok(text) => println!("\n{}\n{}", summary.category, text.trim()),
                Err(e) => warn!("Failed to summarize {}: {e:?}", summary.category),
            }
        }
    }
    Ok(())
}

/// Command to process `list`. Prints every stored entry.
pub async fn process_list_command(client: ClientArgs) -> Result<()> {
    let api = ApiClient::new(&client.server, &client.model);
    let documents = api.list_entries().await?;
    print!("{}", render_documents(&documents));
    Ok(())
}
