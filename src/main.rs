use anyhow::Result;
use tracktime::cli::run_cli;

fn main() -> Result<()> {
    run_cli()
}
