//! Duino-Coin Monitor - live terminal dashboard
//!
//! Polls the Duino-Coin REST API on a fixed interval and redraws balance,
//! price, trust score and per-miner hash rate statistics.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

mod api;
mod commands;
mod config;
mod credentials;
mod dashboard;
mod models;
mod stats;

use commands::{monitor, reset};

/// Duino-Coin CLI Monitor
#[derive(Parser)]
#[command(name = "duco")]
#[command(author = "SudoHash LLC")]
#[command(version)]
#[command(about = "Duino-Coin CLI Monitor", long_about = None)]
struct Cli {
    /// Refresh interval in seconds [default: 60, or interval_secs from config]
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Reset saved username
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; warnings only by default so logs don't tear the dashboard
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let config = config::load_config()?;

    print_banner(&config.api_url);

    if cli.reset {
        reset::execute(&config.username_path()?)?;
    }

    let interval = cli.interval.unwrap_or(config.interval_secs).max(1);
    monitor::execute(&config, interval).await?;

    Ok(())
}

fn print_banner(api_url: &str) {
    let banner = r#"
    ____  __  ________  ____
   / __ \/ / / / ____/ / __ \
  / / / / / / / /     / / / /
 / /_/ / /_/ / /___  / /_/ /
/_____/\____/\____/  \____/
                             "#;

    println!("{}", banner.cyan());
    println!("{}", "  Duino-Coin Monitor".bright_black());
    println!("{}", format!("  {}", api_url).bright_black());
    println!();
}
