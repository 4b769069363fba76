//! Monitor command - resolve the account, then refresh the dashboard every interval

use anyhow::{Context, Result};
use colored::Colorize;
use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tokio::time::MissedTickBehavior;

use crate::api::{DucoApi, DucoClient};
use crate::config::Config;
use crate::credentials::{CredentialResolver, TerminalPrompt};
use crate::dashboard::{Render, TerminalDashboard};
use crate::stats::StatsEngine;

/// Counts reported when the monitor stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub failed: u64,
}

pub async fn execute(config: &Config, interval_secs: u64) -> Result<()> {
    let cache_path = config.username_path()?;
    let api = DucoClient::from_config(config).context("Failed to build HTTP client")?;

    let username = CredentialResolver::new(&api, cache_path)
        .resolve(&mut TerminalPrompt)
        .await?;

    let Some(username) = username else {
        println!();
        println!("{}", "Monitor stopped by user".yellow().bold());
        return Ok(());
    };

    let mut engine = StatsEngine::new(api, username);

    println!("{}", "Starting Duino-Coin Monitor...".green().bold());
    tracing::info!("Monitoring {} every {}s", engine.username(), interval_secs);
    let mut dashboard = TerminalDashboard::new();

    let summary = run(
        &mut engine,
        &mut dashboard,
        Duration::from_secs(interval_secs),
        interrupted(),
    )
    .await?;

    println!();
    println!("{}", "Monitor stopped by user".yellow().bold());
    println!(
        "  {} {}  {} {}",
        "Updates:".bright_black(),
        summary.ticks,
        "Failed:".bright_black(),
        summary.failed
    );

    Ok(())
}

async fn interrupted() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Tick and render until `shutdown` resolves.
///
/// The first tick fires immediately. A tick always finishes (or is
/// abandoned on shutdown) before the next one is scheduled.
pub async fn run<A, R, S>(
    engine: &mut StatsEngine<A>,
    renderer: &mut R,
    period: Duration,
    shutdown: S,
) -> Result<SessionSummary>
where
    A: DucoApi,
    R: Render,
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut summary = SessionSummary::default();

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            result = engine.tick() => match result {
                Ok(snapshot) => {
                    renderer.render(&snapshot)?;
                    summary.ticks += 1;
                }
                Err(e) => {
                    summary.failed += 1;
                    renderer.render_failure(&e.to_string())?;
                }
            }
        }
    }

    Ok(summary)
}
