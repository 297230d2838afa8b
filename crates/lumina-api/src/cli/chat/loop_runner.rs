//! Main chat loop orchestration.
//!
//! Reads lines, dispatches slash commands, and runs every other line as one
//! turn of the shared chat session.

use std::time::Instant;

use console::style;
use tracing::debug;

use lumina_core::llm::generator::ResponseGenerator;
use lumina_types::error::{ChatError, TurnFailure};

use crate::cli::history::print_messages;
use crate::state::AppState;

use super::banner::{BannerInfo, print_welcome_banner};
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;
use super::thinking_spinner;

/// Run the interactive chat loop until `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let session = &state.session;
    let model = session.generator().model().to_string();

    print_welcome_banner(&BannerInfo {
        model: &model,
        context: session.context_provider().is_some(),
        durable: session.store().is_durable(),
        restored: session.get_state().len(),
    });

    let renderer = ChatRenderer::new();
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => text,
        };

        if text.is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::History => {
                    let snapshot = session.get_state();
                    if snapshot.is_empty() {
                        println!("\n  {}\n", style("No messages yet.").dim());
                    } else {
                        print_messages(&snapshot.messages);
                    }
                }
                ChatCommand::Unknown(cmd_name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(cmd_name).dim()
                    );
                }
            }
            continue;
        }

        let spinner = thinking_spinner();
        let start_time = Instant::now();
        let result = session.send_message(&text).await;
        spinner.finish_and_clear();

        match result {
            Ok(snapshot) => {
                let reply = snapshot.last().map(|m| m.content.as_str()).unwrap_or_default();
                println!("\n  {}", style("Lumina").cyan().bold());
                println!("{}", renderer.render_final(reply).trim_end());
                renderer.print_stats_footer(start_time.elapsed().as_millis() as u64, &model);
                println!();
                debug!(messages = snapshot.len(), "Turn rendered");
            }
            Err(failure) => print_turn_failure(&failure),
        }
    }

    chat_input.flush();
    println!("\n  {}", style("Session ended.").dim());
    Ok(())
}

/// Explain a failed turn, including whether the message was kept.
fn print_turn_failure(failure: &TurnFailure) {
    eprintln!("\n  {} {}", style("!").red().bold(), failure.error);

    eprintln!("  {}\n", style(failure_hint(&failure.error)).dim());
}

/// What the user can do next. A message already in the log must not be resent.
fn failure_hint(error: &ChatError) -> &'static str {
    if error.recorded_user_message() {
        "Your message was kept in the history; the reply failed. Continue with a follow-up."
    } else {
        "Nothing was recorded. Send the message again to retry."
    }
}
