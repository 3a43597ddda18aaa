//! Error types for documental
//!
//! Uses thiserror for ergonomic error definitions. Each pipeline stage has
//! its own error enum so callers can branch on kind rather than on message
//! content. Errors are handled at the component boundary where they occur
//! and never unwind past the consumer loop.

use thiserror::Error;

/// Top-level error type for the documental application
#[derive(Error, Debug)]
pub enum DocumentalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watcher error: {0}")]
    Watcher(#[from] WatcherError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the printer backend and queue watchers.
///
/// Fatal to the owning watcher only; other watchers keep running.
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to enumerate printers: {0}")]
    Enumerate(String),

    #[error("Failed to open printer '{0}': {1}")]
    Open(String, String),

    #[error("Failed to enumerate jobs on '{0}': {1}")]
    EnumerateJobs(String, String),

    #[error("Printer '{0}' not found. List queues with: documental printers")]
    UnknownQueue(String),
}

/// Errors from the LLM response gateway.
///
/// All kinds except `NoModels` are transient and retried; `NoModels` means
/// the server has nothing loaded, which retrying won't fix.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection to LLM server failed: {0}")]
    Connection(String),

    #[error("LLM server returned HTTP {0}: {1}")]
    HttpStatus(u16, String),

    #[error("Malformed response from LLM server: {0}")]
    MalformedResponse(String),

    #[error("LLM server reported no loaded models")]
    NoModels,
}

impl GatewayError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::NoModels)
    }
}

/// Errors writing the durable context snapshot.
///
/// Never fatal: the in-memory store stays authoritative for the session.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to write context snapshot to {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize context snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias using DocumentalError
pub type Result<T> = std::result::Result<T, DocumentalError>;
