//! TUI Dashboard Viewer
//!
//! Interactive terminal dashboard for the hosted instances of the logged-in
//! account. Uses the session persisted by `deckctl login`.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use instance_deck::Config;
#[cfg(feature = "dashboard")]
use instance_deck::viewer::App;

#[derive(Parser, Debug)]
#[command(name = "deck-viewer")]
#[command(about = "Terminal UI dashboard for hosted instances", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API base URL (overrides config file and API_BASE_URL)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Session state file (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    state: Option<PathBuf>,
}

/// Log to a file so the terminal stays clean while the TUI is up
fn init_logging(debug: bool) {
    let log_path = Config::log_dir().join("viewer.log");

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(file)
                .init();
        }
        Err(_) => {
            // No log file: only errors, on stderr
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .with_max_level(tracing::Level::ERROR)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;

    // Override with CLI args if provided
    let config = Config {
        api_url: args.url.unwrap_or(config.api_url),
        state_file: args.state.or(config.state_file),
        ..config
    };

    init_logging(config.debug);
    tracing::info!("starting viewer against {}", config.base_url());

    #[cfg(feature = "dashboard")]
    {
        let mut app = App::new(config)?;
        app.run().await?;
    }

    #[cfg(not(feature = "dashboard"))]
    {
        let _ = config;
        eprintln!("Error: This binary was compiled without dashboard support.");
        eprintln!("Please rebuild with: cargo build --features dashboard");
        std::process::exit(1);
    }

    Ok(())
}
