//! codechat - terminal client for a chat and code generation backend
//!
//! Keeps the conversation locally, renders replies with their code blocks
//! pulled out, and drives each turn through a small state machine.

mod backend;
mod codegen;
mod commands;
mod config;
mod display;
mod render;
mod runtime;
mod session;
mod state_machine;
mod system_prompt;

use backend::{ChatBackend, HttpBackend, LoggingBackend};
use commands::{Command, Response};
use config::ClientConfig;
use display::{DisplaySurface, TerminalSurface};
use runtime::ChatRuntime;
use session::Session;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codechat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(backend = %config.backend_url, timeout_secs = config.timeout.as_secs(), "Starting");

    let http = HttpBackend::new(&config.backend_url, config.timeout)?;
    let backend: Arc<dyn ChatBackend> = Arc::new(LoggingBackend::new(Arc::new(http)));

    check_health(backend.as_ref()).await;

    let session = Session::new(config.system_prompt.clone());
    let mut runtime = ChatRuntime::new(session, backend, TerminalSurface::stdout())
        .with_codegen_temperature(config.codegen_temperature);

    println!("codechat connected to {}. Type /help for commands.", config.backend_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Input closed (e.g. piped): let the last reply land
                    runtime.wait_idle().await;
                    break;
                };
                let response = match Command::parse(&line) {
                    Ok(command) => commands::execute(&mut runtime, &config, command).await,
                    Err(e) => Err(e),
                };
                match response {
                    Ok(Response::Continue) => {}
                    Ok(Response::Message(message)) => runtime.display_mut().show_status(&message),
                    Ok(Response::Quit) => break,
                    Err(e) => runtime.display_mut().show_status(&e.to_string()),
                }
            }
            Some(event) = runtime.next_event() => runtime.handle_event(event),
        }
    }

    tracing::info!(
        session_id = %runtime.session().id(),
        turns = runtime.session().store().len(),
        last_outcome = ?runtime.last_outcome(),
        "Exiting"
    );
    Ok(())
}

/// Warn early when the backend is down or has no model credentials
async fn check_health(backend: &dyn ChatBackend) {
    match backend.health().await {
        Ok(health) if !health.api_configured => {
            println!("Warning: the backend reports no API key configured; replies will fail.");
        }
        Ok(health) => {
            tracing::info!(
                status = %health.status,
                model = health.model.as_deref().unwrap_or("unknown"),
                "Backend healthy"
            );
        }
        Err(e) => {
            println!("Warning: backend at {} is not reachable ({e}).", backend.endpoint());
        }
    }
}
