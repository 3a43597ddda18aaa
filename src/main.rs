//! DocuMental - snarky print-queue watching agent
//!
//! Run with `documental` or `documental daemon` to start watching.
//! Use `documental printers` to list queues, `documental test <event>` to
//! exercise the LLM gateway and sinks without a real print job.

use clap::Parser;
use documental::brain::Brain;
use documental::cli::{Cli, Commands};
use documental::{config, daemon, dispatch, printer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("documental={},warn", log_level))),
        )
        .with_target(false)
        .init();

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref());

    // Apply CLI overrides
    if let Some(endpoint) = cli.endpoint {
        config.llm.lm_studio_endpoint = endpoint;
    }

    // Run the appropriate command
    match cli.command.unwrap_or(Commands::Daemon) {
        Commands::Daemon => {
            let mut daemon = daemon::Daemon::new(config);
            daemon.run(&cli.queue).await?;
        }

        Commands::Printers => {
            list_printers(&config)?;
        }

        Commands::Test { event } => {
            run_test_event(&config, event).await?;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}

/// List available queues with their selection indices
fn list_printers(config: &config::Config) -> anyhow::Result<()> {
    let backend = printer::create_backend(&config.monitor);
    let printers = backend.enumerate()?;

    if printers.is_empty() {
        println!("No print queues found on this system.");
        return Ok(());
    }

    println!("Available print queues:");
    for (index, name) in printers.iter().enumerate() {
        println!("  [{}] {}", index, name);
    }
    println!("\nWatch a subset with: documental --queue <name-or-index>");

    Ok(())
}

/// Drive the gateway and the sinks with a synthetic event description
async fn run_test_event(config: &config::Config, event: String) -> anyhow::Result<()> {
    println!("Testing with event: '{}'", event);

    let brain = Arc::new(Brain::new(&config.llm));
    let prompt = event.clone();
    let message = tokio::task::spawn_blocking(move || brain.generate(&prompt)).await??;

    println!("LLM response: \"{}\"", message);

    if config.notification.desktop {
        dispatch::notify("Printer Alert (test)", &message).await;
    }
    if config.notification.speech {
        if let Some(speech) = dispatch::Speech::resolve() {
            speech.speak(&message).await;
        }
    }

    Ok(())
}

/// Print the effective configuration as TOML
fn show_config(config: &config::Config) -> anyhow::Result<()> {
    if let Some(path) = config::Config::default_path() {
        println!("# Config file: {:?}", path);
        if !path.exists() {
            println!("# (not present, showing defaults)");
        }
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
