//! LAISer entry point.
//!
//! `laiser --query "..."` answers one question in the terminal;
//! `laiser --server` serves the chat page.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_fields_in_debug)]

use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use laiser::AppState;
use laiser::config::{AppConfig, Cli};
use laiser::llm::Orchestrator;
use laiser::server::start_server;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Structured logs on stderr; `RUST_LOG` wins over `status.silent`.
fn init_tracing(config: &AppConfig) {
    let default_level = if config.status.silent { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

async fn answer_in_terminal(
    orchestrator: &Orchestrator,
    query: &str,
    silent: bool,
) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Enter a search query enclosed in quotes.");
    }

    let started = Instant::now();
    let answer = orchestrator.answer(query).await;

    if !silent {
        println!("━━━━━━━━┫ ANSWER");
    }
    println!("{}", answer.text);
    println!("\nSOURCES:");
    println!("{}", answer.to_plain());

    if !silent {
        println!("Completed in {:.2} seconds.", started.elapsed().as_secs_f64());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli).context("Failed to load configuration")?;
    init_tracing(&config);

    info!(
        name: "llm.config.loaded",
        backend = %config.backend.api,
        "Using {}",
        config.backend.api
    );

    let orchestrator =
        Orchestrator::from_config(&config).context("Failed to set up the search pipeline")?;

    match cli.query {
        Some(query) => answer_in_terminal(&orchestrator, &query, config.status.silent).await,
        None => start_server(AppState::new(orchestrator, config)).await,
    }
}
