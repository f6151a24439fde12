// UI layer: the few interactive bits of the importer, built on the same
// `dialoguer` prompt and `indicatif` spinner style as the rest of the CLI.

use anyhow::{Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};

/// Ask for the account password without echoing it.
pub fn prompt_password(username: &str) -> Result<String> {
    Password::new()
        .with_prompt(format!("Password for {}", username))
        .interact()
        .context("Failed to read password")
}

/// Spinner shown while feeds are being replayed. indicatif only draws it
/// when stderr is a terminal.
pub fn import_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}] {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Importing subscriptions...");
    spinner
}
