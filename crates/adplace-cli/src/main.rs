mod cli;
mod commands;
mod fixture;

use adplace_config::Config;
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // Logs go to stderr so rendered output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        cli::Commands::Placements => commands::placements::handle(&config),
        cli::Commands::Check {
            fixture,
            session_dir,
        } => commands::check::handle(&config, &fixture, session_dir),
        cli::Commands::Simulate {
            fixture,
            seed,
            session_dir,
            json,
        } => commands::simulate::handle(&config, &fixture, seed, session_dir, json),
    }
}
