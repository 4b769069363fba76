//! Terminal dashboard - draws a snapshot as panels and a miners table

use anyhow::Result;
use colored::Colorize;
use console::{measure_text_width, pad_str, Alignment, Term};

use crate::models::{Snapshot, DUCO};

/// Receives one snapshot per successful tick
pub trait Render {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Called when a tick produced nothing; the previous frame stays
    fn render_failure(&mut self, reason: &str) -> Result<()>;
}

pub struct TerminalDashboard {
    term: Term,
}

impl TerminalDashboard {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Render for TerminalDashboard {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        let frame = draw(snapshot);
        if self.term.is_term() {
            self.term.clear_screen()?;
        }
        self.term.write_line(&frame)?;
        Ok(())
    }

    fn render_failure(&mut self, reason: &str) -> Result<()> {
        self.term.write_line(&reason.red().to_string())?;
        Ok(())
    }
}

/// Full frame as a single string
pub fn draw(snapshot: &Snapshot) -> String {
    let mut out = Vec::new();

    out.push(panel(
        None,
        &[format!("{}", "Duino-Coin Monitor".cyan().bold())],
        |s| s.cyan().to_string(),
    ));
    out.push(format!(
        "Last update: {}\n",
        snapshot.updated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    let verification = if snapshot.verified {
        "Verified"
    } else {
        "Not Verified"
    };

    out.push(panel(
        Some("Duino-Coin Statistics"),
        &[
            format!("{} {}", "User:".cyan().bold(), snapshot.username),
            format!(
                "{} {} {:.4} (${:.2})",
                "Balance:".green().bold(),
                DUCO,
                snapshot.balance,
                snapshot.balance_usd
            ),
            format!("{} ${:.8}", "DUCO Price:".yellow().bold(), snapshot.price_usd),
            format!("{} {}", "Verification:".blue().bold(), verification),
            format!("{} {}", "Trust Score:".magenta().bold(), snapshot.trust_score),
            format!(
                "{} {} {:.4} (${:.2})",
                "Daily Earnings:".green().bold(),
                DUCO,
                snapshot.daily_earnings,
                snapshot.daily_earnings_usd
            ),
        ],
        |s| s.green().to_string(),
    ));

    if !snapshot.miners.is_empty() {
        out.push(miners_table(snapshot));

        let mining = &snapshot.mining;
        out.push(panel(
            Some("Mining Statistics"),
            &[
                format!(
                    "{} {}",
                    "Total Hashrate:".cyan().bold(),
                    mining.total_hashrate_display
                ),
                format!(
                    "{} {:.2}%",
                    "Acceptance Rate:".green().bold(),
                    mining.acceptance_rate
                ),
                format!("{} {}", "Active Miners:".yellow().bold(), mining.active_miners),
            ],
            |s| s.blue().to_string(),
        ));
    }

    out.join("\n")
}

fn panel(title: Option<&str>, lines: &[String], border: impl Fn(&str) -> String) -> String {
    let title_width = title.map(|t| measure_text_width(t) + 2).unwrap_or(0);
    let inner = lines
        .iter()
        .map(|l| measure_text_width(l))
        .max()
        .unwrap_or(0)
        .max(title_width)
        + 2;

    let top = match title {
        Some(t) => {
            let left = (inner - title_width) / 2;
            let right = inner - title_width - left;
            format!(
                "{}{}{}",
                border(&format!("╭{}", "─".repeat(left))),
                format!(" {} ", t).bold(),
                border(&format!("{}╮", "─".repeat(right)))
            )
        }
        None => border(&format!("╭{}╮", "─".repeat(inner))),
    };

    let mut rows = vec![top];
    for line in lines {
        rows.push(format!(
            "{} {} {}",
            border("│"),
            pad_str(line, inner - 2, Alignment::Left, None),
            border("│")
        ));
    }
    rows.push(border(&format!("╰{}╯", "─".repeat(inner))));
    rows.join("\n")
}

fn miners_table(snapshot: &Snapshot) -> String {
    let headers = [
        "ID", "Software", "Identifier", "Hashrate", "Accepted", "Rejected", "Pool",
    ];
    let right_aligned = [true, false, false, true, true, true, false];

    let cells: Vec<[String; 7]> = snapshot
        .miners
        .iter()
        .map(|m| {
            [
                m.id.to_string(),
                m.software.clone(),
                m.identifier.clone(),
                m.hashrate_display.clone(),
                m.accepted.to_string(),
                m.rejected.to_string(),
                m.pool.clone(),
            ]
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            cells
                .iter()
                .map(|row| measure_text_width(&row[col]))
                .chain(std::iter::once(headers[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |l: &str, m: &str, r: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", l, segments.join(m), r)
    };

    let line = |values: Vec<String>| {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .zip(right_aligned)
            .map(|((v, w), right)| {
                let align = if right { Alignment::Right } else { Alignment::Left };
                format!(" {} ", pad_str(v, *w, align, None))
            })
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut out = vec![format!("{}", "Active Miners".italic())];
    out.push(rule("╭", "┬", "╮"));
    out.push(line(headers.iter().map(|h| h.bold().to_string()).collect()));
    out.push(rule("├", "┼", "┤"));
    for row in cells {
        let styled = vec![
            row[0].cyan().to_string(),
            row[1].magenta().to_string(),
            row[2].green().to_string(),
            row[3].yellow().to_string(),
            row[4].green().to_string(),
            row[5].red().to_string(),
            row[6].blue().to_string(),
        ];
        out.push(line(styled));
    }
    out.push(rule("╰", "┴", "╯"));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MinerRow, MiningTotals};

    fn snapshot(miners: Vec<MinerRow>) -> Snapshot {
        Snapshot {
            username: "alice".to_string(),
            updated_at: chrono::Local::now(),
            balance: 12.5,
            balance_usd: 0.05,
            price_usd: 0.004,
            verified: true,
            trust_score: 90.0,
            daily_earnings: 0.0,
            daily_earnings_usd: 0.0,
            mining: MiningTotals {
                total_hashrate: 2500.0,
                total_hashrate_display: "2.50 KH/s".to_string(),
                total_accepted: 10,
                total_rejected: 0,
                acceptance_rate: 100.0,
                active_miners: miners.len(),
            },
            miners,
        }
    }

    fn row() -> MinerRow {
        MinerRow {
            id: 1,
            software: "Official AVR Miner".to_string(),
            identifier: "uno-1".to_string(),
            hashrate_display: "2.50 KH/s".to_string(),
            accepted: 10,
            rejected: 0,
            pool: "pool-1".to_string(),
        }
    }

    #[test]
    fn test_frame_contains_statistics() {
        colored::control::set_override(false);
        let frame = draw(&snapshot(vec![row()]));

        assert!(frame.contains("User: alice"));
        assert!(frame.contains("Balance: ᕲ 12.5000 ($0.05)"));
        assert!(frame.contains("DUCO Price: $0.00400000"));
        assert!(frame.contains("Verification: Verified"));
        assert!(frame.contains("Trust Score: 90"));
        assert!(frame.contains("Active Miners"));
        assert!(frame.contains("uno-1"));
        assert!(frame.contains("Total Hashrate: 2.50 KH/s"));
        assert!(frame.contains("Acceptance Rate: 100.00%"));
    }

    #[test]
    fn test_no_miners_hides_mining_sections() {
        colored::control::set_override(false);
        let frame = draw(&snapshot(vec![]));

        assert!(frame.contains("Duino-Coin Statistics"));
        assert!(!frame.contains("Mining Statistics"));
        assert!(!frame.contains("Hashrate"));
    }
}
