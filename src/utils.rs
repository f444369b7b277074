use std::{future::Future, time::Duration};

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TICK_CHARS: &str = "⠁⠂⠄⡀⢀⠠⠐⠈";
const SPINNER_TICK_MS: u64 = 120;

/// Shows a spinner with `message` while `operation` runs.
pub async fn spin_progress<Op, Fut, Res>(message: &str, operation: Op) -> Result<Res>
where
    Op: FnOnce() -> Fut,
    Fut: Future<Output = Result<Res>>,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(SPINNER_TICK_CHARS)
            .template("{spinner} {msg}")?,
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));

    let outcome = operation().await;
    spinner.finish_and_clear();
    outcome
}

pub fn shine_success(message: &str) {
    println!("{} {}", "✓".bright_green(), message.bold().green());
}

/// First line of a commit message, for headings.
pub fn summary_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default().trim()
}
