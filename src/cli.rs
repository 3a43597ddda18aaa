// Command-line interface definitions for documental

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "documental")]
#[command(author, version, about = "Snarky print-queue watching agent")]
#[command(long_about = "
DocuMental watches your print queues and turns job events into short,
sarcastic desktop notifications generated by a local LLM.

SETUP:
  1. Start an OpenAI-compatible server (LM Studio, llama.cpp server) with a model loaded
  2. Optionally edit ~/.config/documental/config.toml (see 'documental config')
  3. Run: documental printers (to list available queues)
  4. Run: documental (to start watching)

USAGE:
  Watches every queue by default. Select queues with --queue (name or
  index from 'documental printers'). Stop with Ctrl+C.
")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Override the LLM endpoint (e.g. http://localhost:1234/v1)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Queue to watch, by name or index; repeatable ("all" for every queue)
    #[arg(long, value_name = "QUEUE")]
    pub queue: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch print queues (default if no command specified)
    Daemon,

    /// List available print queues with their selection indices
    Printers,

    /// Send a synthetic event through the LLM gateway and the sinks
    Test {
        /// Event description, e.g. "Job ID 124: Status change to 'Error'"
        event: String,
    },

    /// Show the effective configuration
    Config,
}
