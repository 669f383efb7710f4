//! LiteLLM MCP Agent
//!
//! Entry point: single-shot mode with `-p/--prompt`, interactive otherwise.

use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use litellm_mcp_agent::cli::{Repl, run_single, say_goodbye};
use litellm_mcp_agent::config::{AppConfig, Cli, LogFormat, LoggingSettings};
use litellm_mcp_agent::llm::Orchestrator;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr; stdout carries results.
fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match settings.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    let cli = Cli::parse();
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);
    info!(
        name: "agent.config.loaded",
        gateway = %config.gateway.base_url,
        mcp_server = %config.mcp.server_url,
        model = %config.agent.default_model,
        "Configuration loaded"
    );

    let orchestrator = match Orchestrator::from_config(&config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Startup error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = tokio::select! {
        r = run(&cli, &config, &orchestrator) => r,
        _ = tokio::signal::ctrl_c() => {
            if cli.prompt.is_some() {
                eprintln!("\nInterrupted");
                Ok(false)
            } else {
                let _ = say_goodbye(&mut tokio::io::stdout()).await;
                Ok(true)
            }
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Unexpected error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &AppConfig, orchestrator: &Orchestrator) -> anyhow::Result<bool> {
    let model = config.agent.default_model.as_str();

    if let Some(prompt) = &cli.prompt {
        let mut stdout = tokio::io::stdout();
        return run_single(orchestrator, prompt, model, &mut stdout).await;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut repl = Repl::new(
        orchestrator,
        model,
        &config.providers,
        stdin,
        tokio::io::stdout(),
    );
    repl.run().await?;
    Ok(true)
}
