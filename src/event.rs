//! Typed queue events and their natural-language descriptions
//!
//! Events are immutable once constructed and flow by value from the
//! watchers through the aggregator channel to the consumer loop. The
//! description builder turns an event plus its historical context into the
//! prose handed to the LLM gateway.

use crate::printer::PrintJob;

/// One detected change in a print queue
#[derive(Debug, Clone)]
pub enum Event {
    /// A job appeared that was not in the previous snapshot
    NewJob(PrintJob),
    /// A job's status flags changed to something reportable (carries the new state)
    StatusChange(PrintJob),
    /// A job vanished from the queue (completed or cancelled)
    JobDeleted(PrintJob),
    /// The watcher for this queue failed; its stream ends after this event
    WatcherError(String),
}

impl Event {
    /// The job this event concerns, if any
    pub fn job(&self) -> Option<&PrintJob> {
        match self {
            Event::NewJob(job) | Event::StatusChange(job) | Event::JobDeleted(job) => Some(job),
            Event::WatcherError(_) => None,
        }
    }

    pub fn is_new_job(&self) -> bool {
        matches!(self, Event::NewJob(_))
    }
}

/// An event tagged with the queue it came from
#[derive(Debug, Clone)]
pub struct QueueEvent {
    pub queue: String,
    pub event: Event,
}

/// Build the event description fed to the LLM gateway.
///
/// `context` is the history summary from the memory module (may be empty);
/// `keywords` are the suspicious document-name patterns detected by the
/// personality module (may be empty).
pub fn describe(queue: &str, event: &Event, context: &str, keywords: &[&str]) -> String {
    let mut text = match event {
        Event::NewJob(job) => {
            let mut s = format!(
                "A new print job was submitted on '{}': Document='{}', User='{}'",
                queue, job.document, job.user
            );
            if job.total_pages > 0 {
                s.push_str(&format!(", Pages={}", job.total_pages));
            }
            if job.size_bytes > 0 {
                s.push_str(&format!(", Size={} bytes", job.size_bytes));
            }
            s.push('.');
            s
        }
        Event::StatusChange(job) => format!(
            "The status of a print job changed on '{}': Document='{}', User='{}', Status='{}'.",
            queue,
            job.document,
            job.user,
            job.status.describe()
        ),
        Event::JobDeleted(job) => format!(
            "Job ID {}: Job '{}' completed or removed from queue '{}'.",
            job.id, job.document, queue
        ),
        Event::WatcherError(msg) => {
            format!("The watcher for queue '{}' failed: {}.", queue, msg)
        }
    };

    if !context.is_empty() {
        text.push(' ');
        text.push_str(context);
    }
    if !keywords.is_empty() {
        text.push_str(" Detected keywords: ");
        text.push_str(&keywords.join(", "));
        text.push('.');
    }

    text
}
