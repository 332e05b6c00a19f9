//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "basic-timer")]
#[command(about = "A countdown timer that survives restarts")]
#[command(version = "1.0.0")]
pub struct Config {
    /// File the expiry timestamp is persisted to
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Print view states as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Store path, defaulting to the platform data directory
    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(|| {
            let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            data_dir.join("basic-timer").join("store.json")
        })
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
