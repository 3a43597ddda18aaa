//! DocuMental: a print-queue watching agent with LLM-generated notifications
//!
//! This library provides the core functionality for:
//! - Watching print queues through a small backend capability interface
//!   (CUPS polling implementation included)
//! - Diffing job snapshots into typed lifecycle events
//! - Aggregating per-queue watchers into one ordered consumer stream
//! - Debouncing repeat status noise while letting high-priority states through
//! - Enriching events with durable per-user/per-document print history
//! - Generating notification text via an OpenAI-compatible LLM server
//! - Dispatching to desktop notifications and optional speech synthesis
//!
//! # Architecture
//!
//! ```text
//!  ┌───────────┐   ┌───────────┐   ┌───────────┐
//!  │ Watcher A │   │ Watcher B │   │ Watcher N │   one task per queue
//!  └─────┬─────┘   └─────┬─────┘   └─────┬─────┘
//!        │    events     │               │
//!        └───────────────┼───────────────┘
//!                        ▼
//!              ┌───────────────────┐
//!              │    Aggregator     │  unbounded mpsc, per-queue FIFO
//!              └─────────┬─────────┘
//!                        ▼
//!    Debounce ─▶ Memory (context) ─▶ Brain (LLM) ─▶ Dispatch
//!                        single consumer loop
//! ```

pub mod aggregator;
pub mod brain;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod memory;
pub mod personality;
pub mod printer;
pub mod watcher;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use daemon::Daemon;
pub use error::{DocumentalError, Result};
