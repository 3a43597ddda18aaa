//! Daemon module - main event loop orchestration
//!
//! Wires the pipeline together: aggregator workers detect queue changes,
//! the single consumer loop here runs each event through debounce, the
//! context memory, the LLM gateway and finally the dispatch sinks. One
//! event is processed fully before the next is pulled, so memory and dedup
//! state are only ever touched from this task. A slow gateway call delays
//! the next event, never detection.

use crate::aggregator;
use crate::brain::Brain;
use crate::config::{Config, UpdateOn};
use crate::debounce::DedupState;
use crate::dispatch::{self, Speech};
use crate::error::{DocumentalError, Result};
use crate::event::{self, Event, QueueEvent};
use crate::memory::Memory;
use crate::personality;
use crate::printer::{self, PrinterBackend};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Resolve the operator's queue selection against the available queues.
///
/// Entries may be queue names, zero-based indices from `documental
/// printers`, or the word "all". An empty selection also means all.
/// Unknown entries are warned about and skipped; an empty result is an
/// error.
pub fn select_queues(available: &[String], selection: &[String]) -> Result<Vec<String>> {
    if available.is_empty() {
        return Err(DocumentalError::Config(
            "no print queues found on this system".into(),
        ));
    }

    if selection.is_empty() || selection.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        return Ok(available.to_vec());
    }

    let mut chosen = Vec::new();
    for entry in selection {
        let name = if let Ok(index) = entry.parse::<usize>() {
            match available.get(index) {
                Some(name) => Some(name.clone()),
                None => {
                    tracing::warn!("Ignoring invalid queue index {}", index);
                    None
                }
            }
        } else if available.iter().any(|q| q == entry) {
            Some(entry.clone())
        } else {
            tracing::warn!("Ignoring unknown queue '{}'", entry);
            None
        };

        if let Some(name) = name {
            if !chosen.contains(&name) {
                chosen.push(name);
            }
        }
    }

    if chosen.is_empty() {
        return Err(DocumentalError::Config(
            "no valid queues selected".into(),
        ));
    }
    Ok(chosen)
}

/// Main daemon that orchestrates all components
pub struct Daemon {
    config: Config,
    memory: Memory,
    brain: Arc<Brain>,
    speech: Option<Speech>,
    dedup: DedupState,
}

impl Daemon {
    /// Create a new daemon with the given configuration
    pub fn new(config: Config) -> Self {
        let memory = Memory::load(&config.resolve_memory_path());

        let speech = if config.notification.speech {
            Speech::resolve()
        } else {
            None
        };

        let brain = Arc::new(Brain::new(&config.llm));

        Self {
            config,
            memory,
            brain,
            speech,
            dedup: DedupState::new(),
        }
    }

    /// Run the daemon until interrupted.
    ///
    /// `queue_selection` comes from the CLI and overrides the config's
    /// queue list when non-empty.
    pub async fn run(&mut self, queue_selection: &[String]) -> Result<()> {
        tracing::info!("Starting documental daemon");

        let backend: Arc<dyn PrinterBackend> =
            Arc::from(printer::create_backend(&self.config.monitor));

        let available = backend.enumerate()?;
        let selection = if queue_selection.is_empty() {
            self.config.monitor.queues.clone()
        } else {
            queue_selection.to_vec()
        };
        let queues = select_queues(&available, &selection)?;
        tracing::info!("Monitoring queues: {}", queues.join(", "));
        tracing::info!("LLM endpoint: {}", self.config.llm.lm_studio_endpoint);

        let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
            DocumentalError::Config(format!("Failed to set up SIGTERM handler: {}", e))
        })?;

        let cancel = CancellationToken::new();
        let mut events = aggregator::spawn(backend, queues, cancel.clone());

        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(event) => self.process_event(event).await,
                        None => {
                            tracing::warn!("All queue watchers have terminated, shutting down");
                            break;
                        }
                    }
                }

                // Graceful shutdown (SIGINT from Ctrl+C)
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT, shutting down...");
                    break;
                }

                // Graceful shutdown (SIGTERM from systemctl stop)
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, shutting down...");
                    break;
                }
            }
        }

        // Workers observe the token within one wait cycle; no joining on exit
        cancel.cancel();
        tracing::info!("Monitoring stopped. Goodbye!");

        Ok(())
    }

    /// Run one event through debounce, context, gateway and dispatch
    async fn process_event(&mut self, queue_event: QueueEvent) {
        if !self.dedup.should_notify(&queue_event.event) {
            tracing::debug!(
                "Suppressed repeat event on '{}': {:?}",
                queue_event.queue,
                queue_event.event
            );
            return;
        }

        let context = self.context_for(&queue_event.event);
        let keywords = queue_event
            .event
            .job()
            .map(|job| personality::detect_keywords(&job.document))
            .unwrap_or_default();

        let description = event::describe(&queue_event.queue, &queue_event.event, &context, &keywords);
        tracing::info!("Detected event on '{}': {}", queue_event.queue, description);

        // The gateway is blocking HTTP with retries; keep it off the runtime
        let brain = Arc::clone(&self.brain);
        let prompt = description.clone();
        let generated = tokio::task::spawn_blocking(move || brain.generate(&prompt)).await;

        match generated {
            Ok(Ok(message)) => {
                tracing::info!("LLM response: {:?}", message);

                if self.config.notification.desktop {
                    let title = format!("Printer Alert: {}", queue_event.queue);
                    dispatch::notify(&title, &message).await;
                }
                if let Some(ref speech) = self.speech {
                    speech.speak(&message).await;
                }
            }
            Ok(Err(e)) => {
                // Event is dropped, not requeued; the pipeline moves on
                tracing::error!("Gateway failed, dropping event: {}", e);
            }
            Err(e) => {
                tracing::error!("Gateway task panicked: {}", e);
            }
        }
    }

    /// History summary for the event, updating counters per configuration
    fn context_for(&mut self, event: &Event) -> String {
        match event {
            Event::NewJob(job) => self.memory.update_and_summarize(job),
            Event::StatusChange(job) | Event::JobDeleted(job) => {
                match self.config.memory.update_on {
                    UpdateOn::AllEvents => self.memory.update_and_summarize(job),
                    UpdateOn::NewJobs => self.memory.summarize(job),
                }
            }
            Event::WatcherError(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queues(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection_means_all() {
        let available = queues(&["A", "B"]);
        assert_eq!(select_queues(&available, &[]).unwrap(), available);
    }

    #[test]
    fn test_all_keyword() {
        let available = queues(&["A", "B"]);
        assert_eq!(
            select_queues(&available, &queues(&["all"])).unwrap(),
            available
        );
    }

    #[test]
    fn test_selection_by_name() {
        let available = queues(&["A", "B", "C"]);
        assert_eq!(
            select_queues(&available, &queues(&["B"])).unwrap(),
            queues(&["B"])
        );
    }

    #[test]
    fn test_selection_by_index() {
        let available = queues(&["A", "B", "C"]);
        assert_eq!(
            select_queues(&available, &queues(&["0", "2"])).unwrap(),
            queues(&["A", "C"])
        );
    }

    #[test]
    fn test_invalid_entries_skipped() {
        let available = queues(&["A", "B"]);
        assert_eq!(
            select_queues(&available, &queues(&["9", "Ghost", "B"])).unwrap(),
            queues(&["B"])
        );
    }

    #[test]
    fn test_duplicates_removed() {
        let available = queues(&["A", "B"]);
        assert_eq!(
            select_queues(&available, &queues(&["A", "0"])).unwrap(),
            queues(&["A"])
        );
    }

    #[test]
    fn test_all_invalid_is_error() {
        let available = queues(&["A"]);
        assert!(select_queues(&available, &queues(&["Ghost"])).is_err());
    }

    #[test]
    fn test_no_queues_is_error() {
        assert!(select_queues(&[], &[]).is_err());
    }
}
