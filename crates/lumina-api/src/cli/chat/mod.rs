//! Interactive CLI chat experience for Lumina.
//!
//! Implements the chat loop: markdown rendering of replies, a thinking
//! spinner, a welcome banner, and slash commands. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a turn is in flight.
pub fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
