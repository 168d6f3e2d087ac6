use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.global.verbose);
    commands::run_command(cli)
}

/// `RUST_LOG` wins; otherwise `--verbose` picks debug for the cask crates.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,cask_store=debug,cask_server=debug,tower_http=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
