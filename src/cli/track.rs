use std::{io::Write, str::FromStr, sync::Arc};

use anyhow::{anyhow, Result};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    client::{ApiClient, EntryApi, SummaryApi},
    tracker::{
        category::{CategorySelection, OTHER_CATEGORY},
        session::TrackingSession,
        ticker::{ElapsedTick, ElapsedTicker},
    },
    utils::clock::{Clock, DefaultClock},
};

use super::{
    output::{
        distribution::{render_distribution, DEFAULT_CHART_WIDTH},
        render_active, render_categories, render_elapsed, render_stopped, render_summaries,
    },
    ClientArgs,
};

const HELP: &str = "\
Commands:
  start <category> <description>   start tracking; unknown categories count as Other
  start other <category> <description>
  stop                             stop tracking, save the entry and summarize its category
  status                           show the active entry
  chart                            time distribution of completed entries
  summaries                        generated summaries per category
  categories                       list predefined categories
  help
  quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start {
        category: CategorySelection,
        description: String,
    },
    Stop,
    Status,
    Chart,
    Summaries,
    Categories,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match command.to_ascii_lowercase().as_str() {
            "start" => {
                let (category, description) = parse_start(rest.trim());
                Ok(SessionCommand::Start {
                    category,
                    description,
                })
            }
            "stop" => Ok(SessionCommand::Stop),
            "status" => Ok(SessionCommand::Status),
            "chart" => Ok(SessionCommand::Chart),
            "summaries" => Ok(SessionCommand::Summaries),
            "categories" => Ok(SessionCommand::Categories),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(anyhow!("Unknown command {other:?}, type help")),
        }
    }
}

/// Splits `<category> <description>`. The category may be quoted to contain spaces, and
/// `other <category>` picks a custom category explicitly.
fn parse_start(rest: &str) -> (CategorySelection, String) {
    let (category, description) = take_token(rest);
    if category.eq_ignore_ascii_case(OTHER_CATEGORY) {
        let (custom, description) = take_token(description);
        return (
            CategorySelection::Other(custom.to_owned()),
            description.trim().to_owned(),
        );
    }
    let selection = category
        .parse::<CategorySelection>()
        .unwrap_or_else(|e| match e {});
    (selection, description.trim().to_owned())
}

fn take_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    if let Some(quoted) = input.strip_prefix('"') {
        if let Some((token, rest)) = quoted.split_once('"') {
            return (token, rest);
        }
    }
    input.split_once(char::is_whitespace).unwrap_or((input, ""))
}

/// Starting point for `track`. Reads commands from stdin until quit, end of input or Ctrl-C.
pub async fn process_track_command(args: ClientArgs) -> Result<()> {
    let client = ApiClient::new(&args.server, &args.model);
    let session = TrackingSession::new(client.clone(), client, Arc::new(DefaultClock));

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let input = LinesStream::new(tokio::io::AsyncBufReadExt::lines(stdin));

    println!("Tracking against {}. Type help for commands.", args.server);
    run_session(session, input, std::io::stdout(), shutdown).await
}

/// The session event loop. Commands come from `input`; while an entry is active its ticker
/// feeds the elapsed line once per second.
pub async fn run_session<E, S, I, W>(
    mut session: TrackingSession<E, S>,
    mut input: I,
    mut out: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    E: EntryApi,
    S: SummaryApi,
    I: Stream<Item = std::io::Result<String>> + Unpin,
    W: Write,
{
    let (tick_sender, mut tick_receiver) = mpsc::channel::<ElapsedTick>(4);
    let mut ticker: Option<ElapsedTicker> = None;
    let clock: Arc<dyn Clock> = session.clock();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Session interrupted");
                break;
            }
            Some(tick) = tick_receiver.recv() => {
                let is_current = session
                    .tracker()
                    .active()
                    .is_some_and(|entry| entry.id == tick.entry_id);
                if is_current {
                    write!(out, "{}", render_elapsed(tick.elapsed))?;
                    out.flush()?;
                }
            }
            line = input.next() => {
                let Some(line) = line else {
                    debug!("Input closed");
                    break;
                };
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }

                let command = match line.parse::<SessionCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                };
                debug!("Session command {:?}", command);

                match command {
                    SessionCommand::Start { category, description } => {
                        if session.tracker().is_tracking() {
                            writeln!(out, "Already tracking, stop first.")?;
                            continue;
                        }
                        match session.start(&category, &description) {
                            Some(entry) => {
                                ticker = Some(ElapsedTicker::spawn(
                                    entry.id.clone(),
                                    entry.start_time,
                                    clock.clone(),
                                    tick_sender.clone(),
                                    &shutdown,
                                ));
                                write!(out, "{}", render_active(&entry, session.elapsed()))?;
                            }
                            None => writeln!(out, "A category and a description are required.")?,
                        }
                    }
                    SessionCommand::Stop => {
                        // Cancelling first so no tick lands after the stop message.
                        if let Some(ticker) = ticker.take() {
                            ticker.cancel();
                        }
                        match session.stop().await {
                            Some(report) => {
                                write!(out, "{}", render_stopped(&report.entry))?;
                                if report.stored.is_none() {
                                    writeln!(out, "The entry could not be saved.")?;
                                }
                                if let Some(summary) = report.summary {
                                    writeln!(out, "{}\n{}", report.entry.category, summary.trim())?;
                                }
                            }
                            None => writeln!(out, "Nothing is being tracked.")?,
                        }
                    }
                    SessionCommand::Status => match session.tracker().active() {
                        Some(entry) => write!(out, "{}", render_active(entry, session.elapsed()))?,
                        None => writeln!(out, "Idle.")?,
                    },
                    SessionCommand::Chart => write!(
                        out,
                        "{}",
                        render_distribution(&session.tracker().category_summaries(), DEFAULT_CHART_WIDTH)
                    )?,
                    SessionCommand::Summaries => {
                        write!(out, "{}", render_summaries(session.summaries()))?
                    }
                    SessionCommand::Categories => write!(out, "{}", render_categories(None))?,
                    SessionCommand::Help => write!(out, "{HELP}")?,
                    SessionCommand::Quit => break,
                }
                out.flush()?;
            }
        }
    }

    drop(ticker);
    if let Some(entry) = session.tracker().active() {
        warn!("Session ended while tracking {}, entry discarded", entry.id);
        writeln!(out, "\nDiscarded active entry for {}.", entry.category)?;
    }
    Ok(())
}
