//! End-to-end pipeline test with mock printer and LLM backends
//!
//! Drives a scripted queue through watcher -> aggregator -> debounce ->
//! memory -> gateway and checks what reaches the (mock) LLM and what comes
//! back out.

use async_trait::async_trait;
use documental::brain::{Brain, ChatBackend};
use documental::debounce::DedupState;
use documental::error::{GatewayError, WatcherError};
use documental::event::{self, Event};
use documental::memory::Memory;
use documental::personality;
use documental::printer::{JobStatus, PrintJob, PrinterBackend, PrinterSession};
use documental::{aggregator, watcher};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn job(id: u32, document: &str, user: &str, status: JobStatus) -> PrintJob {
    PrintJob {
        id,
        document: document.to_string(),
        user: user.to_string(),
        status,
        total_pages: 0,
        size_bytes: 0,
        submitted_at: None,
    }
}

/// Backend whose sessions replay a fixed snapshot sequence, then park
struct ScriptedBackend {
    scripts: Mutex<HashMap<String, Vec<Vec<PrintJob>>>>,
}

impl PrinterBackend for ScriptedBackend {
    fn enumerate(&self) -> Result<Vec<String>, WatcherError> {
        Ok(self.scripts.lock().unwrap().keys().cloned().collect())
    }

    fn open(&self, queue: &str) -> Result<Box<dyn PrinterSession>, WatcherError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .remove(queue)
            .ok_or_else(|| WatcherError::UnknownQueue(queue.to_string()))?;
        Ok(Box::new(ScriptedSession {
            snapshots: script.into_iter().collect(),
            current: Vec::new(),
        }))
    }
}

struct ScriptedSession {
    snapshots: VecDeque<Vec<PrintJob>>,
    current: Vec<PrintJob>,
}

#[async_trait]
impl PrinterSession for ScriptedSession {
    async fn wait_for_change(&mut self) -> Result<(), WatcherError> {
        if self.snapshots.is_empty() {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn jobs(&mut self) -> Result<Vec<PrintJob>, WatcherError> {
        if let Some(next) = self.snapshots.pop_front() {
            self.current = next;
        }
        Ok(self.current.clone())
    }
}

/// Chat backend that records every prompt it receives
#[derive(Clone)]
struct RecordingBackend {
    prompts: Arc<Mutex<Vec<String>>>,
    reply: String,
}

impl ChatBackend for RecordingBackend {
    fn list_models(&self) -> Result<Vec<String>, GatewayError> {
        Ok(vec!["phi-3-mini".to_string()])
    }

    fn complete(&self, _model: &str, _system: &str, user: &str) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(user.to_string());
        Ok(self.reply.clone())
    }
}

#[tokio::test]
async fn test_first_print_flows_end_to_end() {
    // A fresh submission from susan, then the job finishes
    let mut scripts = HashMap::new();
    scripts.insert(
        "HP_LaserJet".to_string(),
        vec![
            vec![],
            vec![job(7, "Resume_final.docx", "susan", JobStatus::SPOOLING)],
        ],
    );
    let backend = Arc::new(ScriptedBackend {
        scripts: Mutex::new(scripts),
    });

    let cancel = CancellationToken::new();
    let mut events = aggregator::spawn(backend, vec!["HP_LaserJet".to_string()], cancel.clone());

    let queue_event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended early");
    cancel.cancel();

    assert_eq!(queue_event.queue, "HP_LaserJet");
    let Event::NewJob(ref new_job) = queue_event.event else {
        panic!("expected NewJob, got {:?}", queue_event.event);
    };

    // Debounce: the first event for a job always proceeds
    let mut dedup = DedupState::new();
    assert!(dedup.should_notify(&queue_event.event));

    // Memory: no prior history, so susan is a first-time offender
    let dir = tempfile::tempdir().unwrap();
    let mut memory = Memory::load(&dir.path().join("memory.json"));
    let context = memory.update_and_summarize(new_job);
    assert_eq!(context, "This is the 1st time 'susan' has printed.");

    // Describe: context and detected keywords make it into the prompt
    let keywords = personality::detect_keywords(&new_job.document);
    assert_eq!(keywords, vec!["resume"]);
    let description = event::describe(&queue_event.queue, &queue_event.event, &context, &keywords);

    // Gateway: the prompt wraps the description; the reply is sanitized
    let recorder = RecordingBackend {
        prompts: Arc::new(Mutex::new(Vec::new())),
        reply: r#"Here you go: "First print ever, Susan, and it's a resume?""#.to_string(),
    };
    let brain = Brain::with_backend(Box::new(recorder.clone()));
    let message = brain.generate(&description).unwrap();

    let prompts = recorder.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("This is the 1st time 'susan' has printed."));
    assert!(prompts[0].contains("Document='Resume_final.docx'"));
    assert!(prompts[0].contains("Detected keywords: resume."));

    assert_eq!(message, "First print ever, Susan, and it's a resume?");
}

#[tokio::test]
async fn test_status_noise_is_debounced_but_errors_get_through() {
    // One job marches through spooling -> printed, then jams on a reprint
    let mut scripts = HashMap::new();
    scripts.insert(
        "Office".to_string(),
        vec![
            vec![],
            vec![job(1, "memo.txt", "dave", JobStatus::SPOOLING)],
            vec![job(1, "memo.txt", "dave", JobStatus::PRINTED)],
            vec![job(1, "memo.txt", "dave", JobStatus::PAPER_OUT)],
        ],
    );
    let backend = Arc::new(ScriptedBackend {
        scripts: Mutex::new(scripts),
    });

    let cancel = CancellationToken::new();
    let mut events = aggregator::spawn(backend, vec!["Office".to_string()], cancel.clone());

    let mut dedup = DedupState::new();
    let mut decisions = Vec::new();
    for _ in 0..3 {
        let queue_event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out")
            .expect("stream ended early");
        decisions.push(dedup.should_notify(&queue_event.event));
    }
    cancel.cancel();

    // NewJob proceeds, the Printed repeat is suppressed, Paper Out bypasses
    assert_eq!(decisions, vec![true, false, true]);
}

#[tokio::test]
async fn test_watcher_failure_reaches_consumer_and_ends_stream() {
    let backend = Arc::new(ScriptedBackend {
        scripts: Mutex::new(HashMap::new()),
    });
    let cancel = CancellationToken::new();
    let mut events = aggregator::spawn(backend, vec!["Ghost".to_string()], cancel.clone());

    let queue_event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out")
        .expect("stream ended early");
    assert!(matches!(queue_event.event, Event::WatcherError(_)));

    // Failure is terminal for this watcher; dedup still lets it through
    let mut dedup = DedupState::new();
    assert!(dedup.should_notify(&queue_event.event));

    let end = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out");
    assert!(end.is_none());
    cancel.cancel();
}

#[test]
fn test_watch_module_reexports_diff() {
    // The diff is pure and reachable for library consumers
    let old = watcher::JobSnapshot::new();
    let mut new = watcher::JobSnapshot::new();
    let j = job(1, "doc.pdf", "susan", JobStatus::SPOOLING);
    new.insert(1, j);

    let events = watcher::diff_snapshots(&old, &new);
    assert_eq!(events.len(), 1);
}
