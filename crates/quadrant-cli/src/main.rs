//! Quadrant CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use quadrant_cli::cli::Cli;
use quadrant_cli::commands;
use quadrant_priority::EngineConfig;

fn main() {
    // Load .env.local if it exists (for QUADRANT_USER etc.)
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::new().with_data_dir(cli.data_dir());

    if let Err(e) = commands::execute(cli.command, &config, cli.format) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
