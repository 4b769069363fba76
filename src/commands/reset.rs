//! Reset command - forget the saved username

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::credentials;

pub fn execute(cache_path: &Path) -> Result<()> {
    if credentials::reset(cache_path)? {
        println!("{}", "Saved username has been reset.".yellow());
    } else {
        tracing::debug!("No saved username at {}", cache_path.display());
    }

    Ok(())
}
