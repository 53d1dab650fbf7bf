use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "adplace")]
#[command(about = "Rule-driven ad decision and placement engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List placements by category with availability and settings
    Placements,

    /// Explain which fixture ads are eligible for the fixture request
    Check {
        /// Fixture file (TOML)
        fixture: PathBuf,

        /// Directory for visitor session files (default: platform data directory)
        #[arg(long)]
        session_dir: Option<PathBuf>,
    },

    /// Render one full page against a fixture
    Simulate {
        /// Fixture file (TOML)
        fixture: PathBuf,

        /// Seed for weighted picks (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for visitor session files (default: platform data directory)
        #[arg(long)]
        session_dir: Option<PathBuf>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
}
