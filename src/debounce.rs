//! Dedup/debounce policy: decides which events are notification-worthy
//!
//! Raw status transitions (spooling -> printing -> printed) would fire many
//! low-value notifications per job. The first event for a job always goes
//! through; repeat status changes are suppressed unless they intersect the
//! high-priority mask. This state is deliberately not persisted: a restart
//! resets debounce memory.

use crate::event::Event;
use crate::printer::JobStatus;
use std::collections::HashSet;

/// Per-process set of job ids that have already produced a notification.
/// Ids never leave the set within one process lifetime.
#[derive(Debug, Default)]
pub struct DedupState {
    seen: HashSet<u32>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether this event proceeds to notification, updating the
    /// seen set as a side effect.
    ///
    /// - NewJob: always proceeds
    /// - StatusChange for an unseen job: treated as a first sighting, proceeds
    /// - StatusChange for a seen job: proceeds only for high-priority flags
    /// - JobDeleted: always proceeds (terminal signal, low volume)
    /// - WatcherError: always proceeds
    pub fn should_notify(&mut self, event: &Event) -> bool {
        match event {
            Event::NewJob(job) => {
                self.seen.insert(job.id);
                true
            }
            Event::StatusChange(job) => {
                if self.seen.insert(job.id) {
                    true
                } else {
                    job.status.intersects(JobStatus::HIGH_PRIORITY)
                }
            }
            Event::JobDeleted(_) | Event::WatcherError(_) => true,
        }
    }
}
