//! Lumina CLI and REST API entry point.
//!
//! Binary name: `lumina`
//!
//! Parses CLI arguments, wires the chat session, then dispatches to the
//! appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing::{error, info};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    lumina_observe::tracing_setup::init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "lumina", &mut std::io::stdout());
        return Ok(());
    }

    lumina_infra::config::load_env_file(std::path::Path::new(lumina_infra::config::ENV_FILE));
    let state = AppState::init(cli.no_context).await;

    let result = run(cli, state).await;
    lumina_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await?,

        Commands::Ask { message } => cli::ask::ask(&state, &message, cli.json).await?,

        Commands::History { limit } => cli::history::show_history(&state, limit, cli.json)?,

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let shutdown = state.shutdown.clone();
            let router = http::router::build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            info!(%addr, "REST API listening");
            if !cli.quiet {
                println!();
                println!(
                    "  {} Lumina API running at {}",
                    console::style("*").cyan().bold(),
                    console::style(format!("http://{addr}/api/v1")).underlined()
                );
                println!();
            }

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_signal().await;
                    shutdown.cancel();
                })
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
