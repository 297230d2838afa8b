//! One-shot `lumina ask`.

use crate::cli::chat::renderer::ChatRenderer;
use crate::state::AppState;

/// Run a single turn and print the reply (or the whole state with `--json`).
pub async fn ask(state: &AppState, message: &str, json: bool) -> anyhow::Result<()> {
    let spinner = (!json).then(super::chat::thinking_spinner);
    let result = state.session.send_message(message).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match result {
        Ok(snapshot) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else if let Some(reply) = snapshot.last() {
                let renderer = ChatRenderer::new();
                println!();
                println!("{}", renderer.render_final(&reply.content).trim_end());
                println!();
            }
            Ok(())
        }
        Err(failure) => {
            if json {
                let body = serde_json::json!({
                    "error": failure.error.to_string(),
                    "messages": failure.state.messages,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            // Reported by main with a non-zero exit.
            Err(failure.into())
        }
    }
}
