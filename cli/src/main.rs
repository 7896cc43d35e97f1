use clap::Parser;
use colored::*;
use dotenvy::dotenv;
use louis_core::config::{get_default_config_file, AssistantConfig, APP_NAME};
use louis_core::FallbackOrchestrator;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod output;

use crate::cli::Args;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn load_config(args: &Args) -> anyhow::Result<AssistantConfig> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => get_default_config_file(APP_NAME)?,
    };
    let config = AssistantConfig::load_from_file(&path)?.with_env_overrides();
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Main function - Builds the provider chain and dispatches on arguments
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys may live in a local .env file
    dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let orchestrator = FallbackOrchestrator::from_config(&config)?;

    if args.status {
        app::show_status(&orchestrator, args.json)?;
    } else if args.knowledge_test {
        let all_passed = app::run_knowledge_test(&orchestrator, args.json).await?;
        if !all_passed {
            std::process::exit(1);
        }
    } else if args.interactive {
        let mut input = std::io::stdin().lock();
        if let Err(e) = app::run_interactive_chat(
            &orchestrator,
            &mut input,
            args.context.as_deref(),
            args.thinking,
        )
        .await
        {
            error!("Error in interactive chat: {}", e);
            eprintln!("{}", format!("Interactive chat failed: {}", e).red());
            std::process::exit(1);
        }
    } else if let Some(prompt) = args.prompt.as_deref() {
        if let Err(e) = app::run_single_query(
            &orchestrator,
            prompt,
            args.context.as_deref(),
            args.thinking,
            args.json,
        )
        .await
        {
            error!("Error processing prompt: {}", e);
            // The friendly message is already printed by run_single_query
            std::process::exit(1);
        }
    } else {
        output::print_usage_instructions();
    }

    Ok(())
}
