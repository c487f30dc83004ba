pub mod output;
pub mod report;
pub mod track;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use report::{process_list_command, process_report_command, ReportCommand};
use tracing::{error, level_filters::LevelFilter};
use track::process_track_command;

use crate::{
    client::{DEFAULT_MODEL, DEFAULT_SERVER_URL},
    server::{args::ServerArgs, start_server},
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, CLI_PREFIX, SERVER_PREFIX},
        runtime::{multi_thread_runtime, single_thread_runtime},
    },
};

#[derive(Parser, Debug)]
#[command(name = "tracktime", version, long_about = None)]
#[command(about = "Track time per category, store entries and get generated summaries", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        env = "TRACKTIME_DIR",
        help = "Application directory. By default $XDG_STATE_HOME/tracktime or $HOME/.local/state/tracktime"
    )]
    dir: Option<PathBuf>,
    #[arg(long = "log-filter", global = true, help = "Log level, overrides RUST_LOG")]
    log: Option<LevelFilter>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console", global = true)]
    log_console: bool,
}

/// Where the client commands find the API and which model summaries are generated with.
#[derive(clap::Args, Debug, Clone)]
pub struct ClientArgs {
    #[arg(long, env = "TRACKTIME_SERVER", default_value = DEFAULT_SERVER_URL, help = "Base url of a running `tracktime serve`")]
    pub server: String,
    #[arg(long, env = "TRACKTIME_MODEL", default_value = DEFAULT_MODEL, help = "Model used for category summaries")]
    pub model: String,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Run the entry API and the generation proxy")]
    Serve {
        #[command(flatten)]
        args: ServerArgs,
    },
    #[command(about = "Interactive timer. Start and stop entries, see the distribution and summaries")]
    Track {
        #[command(flatten)]
        client: ClientArgs,
    },
    #[command(about = "List every stored entry")]
    List {
        #[command(flatten)]
        client: ClientArgs,
    },
    #[command(about = "Distribution of stored entries over a date range")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();
    let app_dir = resolve_application_path(args.dir)?;

    match args.commands {
        Commands::Serve { args: server_args } => {
            enable_logging(SERVER_PREFIX, &app_dir, args.log, args.log_console)?;
            multi_thread_runtime()?
                .block_on(start_server(server_args, app_dir))
                .inspect_err(|e| error!("Server failed {e:?}"))
        }
        Commands::Track { client } => {
            enable_logging(CLI_PREFIX, &app_dir, args.log, args.log_console)?;
            single_thread_runtime()?.block_on(process_track_command(client))
        }
        Commands::List { client } => {
            enable_logging(CLI_PREFIX, &app_dir, args.log, args.log_console)?;
            single_thread_runtime()?.block_on(process_list_command(client))
        }
        Commands::Report { command } => {
            enable_logging(CLI_PREFIX, &app_dir, args.log, args.log_console)?;
            single_thread_runtime()?.block_on(process_report_command(command))
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Args, Commands};

    #[test]
    fn arguments_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let args = Args::try_parse_from(["tracktime", "serve"]).unwrap();
        let Commands::Serve { args } = args.commands else {
            panic!("expected serve");
        };
        assert_eq!(args.listen.to_string(), "127.0.0.1:3000");
        assert_eq!(args.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn track_takes_server_and_model() {
        let args = Args::try_parse_from([
            "tracktime",
            "track",
            "--server",
            "http://10.0.0.2:3000",
            "--model",
            "mistral",
        ])
        .unwrap();
        let Commands::Track { client } = args.commands else {
            panic!("expected track");
        };
        assert_eq!(client.server, "http://10.0.0.2:3000");
        assert_eq!(client.model, "mistral");
    }
}
