//! Stats engine - fetch account and price, derive metrics, emit a snapshot

use std::collections::VecDeque;

use crate::api::DucoApi;
use crate::models::{Miner, MinerRow, MiningTotals, Snapshot, UserData};

/// Number of balance samples kept for the earnings estimate
pub const WINDOW_SIZE: usize = 10;

const HASHRATE_UNITS: [&str; 5] = ["H/s", "KH/s", "MH/s", "GH/s", "TH/s"];

/// Format a raw H/s value with the largest fitting unit, capped at TH/s.
///
/// Scales only while the value is strictly above 1000, so `1000` stays
/// `"1000.00 H/s"`.
pub fn format_hashrate(hashrate: f64) -> String {
    let mut value = hashrate;
    let mut unit = 0;

    while value > 1000.0 && unit < HASHRATE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    format!("{:.2} {}", value, HASHRATE_UNITS[unit])
}

/// Last [`WINDOW_SIZE`] balances, oldest first
#[derive(Debug, Clone, Default)]
pub struct BalanceWindow {
    samples: VecDeque<f64>,
}

impl BalanceWindow {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW_SIZE + 1),
        }
    }

    pub fn push(&mut self, balance: f64) {
        self.samples.push_back(balance);
        while self.samples.len() > WINDOW_SIZE {
            self.samples.pop_front();
        }
    }

    /// Newest minus oldest sample; 0 with fewer than two samples
    pub fn earnings(&self) -> f64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(oldest), Some(newest)) if self.samples.len() > 1 => newest - oldest,
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[cfg(test)]
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

/// Accepted share percentage over all miners; 0 when nothing was submitted
pub fn acceptance_rate(accepted: u64, rejected: u64) -> f64 {
    let total = accepted.saturating_add(rejected);
    if total == 0 {
        0.0
    } else {
        accepted as f64 / total as f64 * 100.0
    }
}

/// Build table rows and the running totals for a miner listing
pub fn summarize_miners(miners: &[Miner]) -> (Vec<MinerRow>, MiningTotals) {
    let mut total_hashrate = 0.0;
    let mut total_accepted: u64 = 0;
    let mut total_rejected: u64 = 0;

    let rows = miners
        .iter()
        .enumerate()
        .map(|(i, miner)| {
            total_hashrate += miner.hashrate;
            total_accepted = u64::saturating_add(total_accepted, miner.accepted);
            total_rejected = u64::saturating_add(total_rejected, miner.rejected);

            MinerRow {
                id: i + 1,
                software: miner.software.clone(),
                identifier: miner.identifier.clone(),
                hashrate_display: format_hashrate(miner.hashrate),
                accepted: miner.accepted,
                rejected: miner.rejected,
                pool: miner.pool.clone(),
            }
        })
        .collect();

    let totals = MiningTotals {
        total_hashrate,
        total_hashrate_display: format_hashrate(total_hashrate),
        total_accepted,
        total_rejected,
        acceptance_rate: acceptance_rate(total_accepted, total_rejected),
        active_miners: miners.len(),
    };

    (rows, totals)
}

/// Owns the rolling balance window for one account
pub struct StatsEngine<A> {
    api: A,
    username: String,
    window: BalanceWindow,
}

impl<A: DucoApi> StatsEngine<A> {
    pub fn new(api: A, username: String) -> Self {
        Self {
            api,
            username,
            window: BalanceWindow::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    #[cfg(test)]
    pub fn window(&self) -> &BalanceWindow {
        &self.window
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Account detail, `None` on any failure
    pub async fn fetch_account(&self) -> Option<UserData> {
        match self.api.fetch_user(&self.username).await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!("Error fetching user data for {}: {}", self.username, e);
                None
            }
        }
    }

    /// USD price, 0 on any failure
    pub async fn fetch_price(&self) -> f64 {
        match self.api.fetch_price().await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!("Error fetching price: {}", e);
                0.0
            }
        }
    }

    /// One fetch-compute cycle. A failed account fetch aborts the tick
    /// before the window is touched.
    pub async fn tick(&mut self) -> Result<Snapshot, TickError> {
        let user = self.fetch_account().await.ok_or(TickError::AccountUnavailable)?;
        let price_usd = self.fetch_price().await;

        let balance = user.balance.balance;
        self.window.push(balance);
        let daily_earnings = self.window.earnings();

        let (miners, mining) = summarize_miners(&user.miners);

        tracing::debug!(
            balance,
            price_usd,
            samples = self.window.len(),
            miners = mining.active_miners,
            total_hashrate = mining.total_hashrate,
            accepted = mining.total_accepted,
            rejected = mining.total_rejected,
            "tick complete"
        );

        Ok(Snapshot {
            username: self.username.clone(),
            updated_at: chrono::Local::now(),
            balance,
            balance_usd: balance * price_usd,
            price_usd,
            verified: user.balance.is_verified(),
            trust_score: user.balance.trust_score,
            daily_earnings,
            daily_earnings_usd: daily_earnings * price_usd,
            miners,
            mining,
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TickError {
    #[error("Failed to fetch user data")]
    AccountUnavailable,
}
