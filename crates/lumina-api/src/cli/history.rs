//! Conversation history display.

use console::style;

use lumina_types::chat::{ChatState, Message, MessageRole};

use crate::state::AppState;

/// Longest preview shown per message, in characters.
const PREVIEW_CHARS: usize = 100;

/// `lumina history`: print the conversation the session was restored with.
pub fn show_history(state: &AppState, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let snapshot = state.session.get_state();

    if json {
        let shown = ChatState {
            messages: tail(&snapshot.messages, limit).to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if snapshot.is_empty() {
        println!();
        println!("  {}", style("No messages yet.").dim());
        println!();
        return Ok(());
    }

    print_messages(tail(&snapshot.messages, limit));
    Ok(())
}

/// Print messages as a compact, styled transcript.
pub fn print_messages(messages: &[Message]) {
    println!();
    for message in messages {
        let label = match message.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Assistant => style("Lumina").cyan().bold(),
        };
        println!("  {label} {}", preview(&message.content));
    }
    println!();
}

/// Last `limit` messages, or all of them.
fn tail(messages: &[Message], limit: Option<usize>) -> &[Message] {
    match limit {
        Some(n) if n < messages.len() => &messages[messages.len() - n..],
        _ => messages,
    }
}

/// Single-line preview, truncated on a character boundary.
fn preview(content: &str) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
