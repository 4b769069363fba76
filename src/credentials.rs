//! Credential resolver - cached username or interactive, API-validated entry

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{ApiError, DucoApi};

/// Source of candidate usernames
pub trait Prompt {
    /// Next candidate, `None` when the user cancelled
    fn ask(&mut self) -> Result<Option<String>>;
}

/// Interactive terminal prompt
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self) -> Result<Option<String>> {
        let answer = dialoguer::Input::<String>::new()
            .with_prompt("Please enter your Duino-Coin username".cyan().bold().to_string())
            .interact_text();
        cancelled_as_none(answer)
    }
}

/// Ctrl+C in raw mode surfaces as `Interrupted` rather than a signal
fn cancelled_as_none(answer: std::result::Result<String, dialoguer::Error>) -> Result<Option<String>> {
    match answer {
        Ok(username) => Ok(Some(username)),
        Err(dialoguer::Error::IO(e)) if e.kind() == ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e).context("Failed to read username"),
    }
}

pub struct CredentialResolver<'a, A> {
    api: &'a A,
    cache_path: PathBuf,
}

impl<'a, A: DucoApi> CredentialResolver<'a, A> {
    pub fn new(api: &'a A, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            cache_path: cache_path.into(),
        }
    }

    /// Cached username if present, otherwise prompt until the API accepts one.
    ///
    /// Cache I/O errors and prompt failures are returned; validation
    /// failures only re-prompt. `None` means the user cancelled the prompt.
    pub async fn resolve<P: Prompt>(&self, prompt: &mut P) -> Result<Option<String>> {
        if let Some(username) = load_cached(&self.cache_path)? {
            tracing::debug!("Using cached username from {}", self.cache_path.display());
            return Ok(Some(username));
        }

        println!("{}", "No saved username found.".yellow());

        loop {
            let Some(answer) = prompt.ask()? else {
                return Ok(None);
            };
            let candidate = answer.trim().to_string();
            if candidate.is_empty() {
                println!("{}", "Invalid username. Please try again.".red());
                continue;
            }

            match self.validate(&candidate).await {
                Ok(()) => {
                    save_cached(&self.cache_path, &candidate)?;
                    println!("{}", "Username saved successfully!".green());
                    return Ok(Some(candidate));
                }
                Err(ApiError::Status(_)) | Err(ApiError::Rejected(_)) => {
                    println!("{}", "Invalid username. Please try again.".red());
                }
                Err(e) => {
                    println!("{}", format!("Error validating username: {}", e).red());
                }
            }
        }
    }

    async fn validate(&self, username: &str) -> std::result::Result<(), ApiError> {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Validating {}...", username));
        pb.enable_steady_tick(Duration::from_millis(100));

        let result = self.api.fetch_user(username).await.map(|_| ());
        pb.finish_and_clear();

        if let Err(e) = &result {
            tracing::debug!("Validation of {} failed: {}", username, e);
        }
        result
    }
}

/// Read the cached username; `None` when missing or blank
pub fn load_cached(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let username = content.trim();
            Ok((!username.is_empty()).then(|| username.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read {}", path.display()))
        }
    }
}

fn save_cached(path: &Path, username: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(path, username)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Delete the cached username. Returns whether a file was removed.
pub fn reset(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
