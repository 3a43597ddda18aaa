//! Queue watcher: converts raw backend state into a reliable event stream
//!
//! One watcher owns one printer session. It takes an initial job snapshot
//! as baseline, then loops: wait for a change, snapshot again, diff, emit.
//! Backend failure at any point emits a single `Event::WatcherError` and
//! ends the stream; there is no automatic reconnect. The session handle is
//! owned by this function, so it is released on every exit path including
//! failure.

use crate::event::{Event, QueueEvent};
use crate::printer::{JobStatus, PrintJob, PrinterBackend};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Snapshot of a queue, replaced atomically each detection cycle
pub type JobSnapshot = HashMap<u32, PrintJob>;

/// Diff two successive snapshots of the same queue.
///
/// Emits exactly one `NewJob` per id present only in `new`, one
/// `JobDeleted` per id present only in `old`, and a `StatusChange` for ids
/// in both whose status changed *and* whose new flags intersect the
/// reportable set. Transitions outside that set are absorbed silently.
/// Output order is deterministic: additions and changes by ascending id,
/// then deletions by ascending id.
pub fn diff_snapshots(old: &JobSnapshot, new: &JobSnapshot) -> Vec<Event> {
    let mut events = Vec::new();

    let mut new_ids: Vec<u32> = new.keys().copied().collect();
    new_ids.sort_unstable();
    for id in new_ids {
        let job = &new[&id];
        match old.get(&id) {
            None => events.push(Event::NewJob(job.clone())),
            Some(prev) => {
                if prev.status != job.status && job.status.intersects(JobStatus::REPORTABLE) {
                    events.push(Event::StatusChange(job.clone()));
                }
            }
        }
    }

    let mut gone_ids: Vec<u32> = old.keys().filter(|id| !new.contains_key(id)).copied().collect();
    gone_ids.sort_unstable();
    for id in gone_ids {
        events.push(Event::JobDeleted(old[&id].clone()));
    }

    events
}

fn snapshot_from(jobs: Vec<PrintJob>) -> JobSnapshot {
    jobs.into_iter().map(|job| (job.id, job)).collect()
}

/// Watch one queue until cancelled or failed.
///
/// Events go into `tx`; the stream for this queue ends when this function
/// returns. Cancellation is observed within one wait cycle.
pub async fn watch(
    queue: String,
    backend: &dyn PrinterBackend,
    tx: UnboundedSender<QueueEvent>,
    cancel: CancellationToken,
) {
    let send = |event: Event| {
        // A closed channel means the consumer is gone; nothing left to do.
        let _ = tx.send(QueueEvent {
            queue: queue.clone(),
            event,
        });
    };

    let mut session = match backend.open(&queue) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to open queue '{}': {}", queue, e);
            send(Event::WatcherError(e.to_string()));
            return;
        }
    };

    let mut baseline = match session.jobs().await {
        Ok(jobs) => snapshot_from(jobs),
        Err(e) => {
            tracing::error!("Failed to take initial snapshot of '{}': {}", queue, e);
            send(Event::WatcherError(e.to_string()));
            return;
        }
    };
    tracing::info!(
        "Watching queue '{}' ({} job(s) in baseline)",
        queue,
        baseline.len()
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Watcher for '{}' shutting down", queue);
                return;
            }
            result = session.wait_for_change() => {
                if let Err(e) = result {
                    tracing::error!("Wait failed on '{}': {}", queue, e);
                    send(Event::WatcherError(e.to_string()));
                    return;
                }
            }
        }

        let snapshot = match session.jobs().await {
            Ok(jobs) => snapshot_from(jobs),
            Err(e) => {
                tracing::error!("Job enumeration failed on '{}': {}", queue, e);
                send(Event::WatcherError(e.to_string()));
                return;
            }
        };

        for event in diff_snapshots(&baseline, &snapshot) {
            tracing::debug!("Detected on '{}': {:?}", queue, event);
            if tx
                .send(QueueEvent {
                    queue: queue.clone(),
                    event,
                })
                .is_err()
            {
                // Consumer hung up
                return;
            }
        }

        baseline = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u32, status: JobStatus) -> PrintJob {
        PrintJob {
            id,
            document: format!("doc-{}.pdf", id),
            user: "susan".to_string(),
            status,
            total_pages: 1,
            size_bytes: 100,
            submitted_at: None,
        }
    }

    fn snapshot(jobs: &[PrintJob]) -> JobSnapshot {
        jobs.iter().cloned().map(|j| (j.id, j)).collect()
    }

    #[test]
    fn test_new_job_emitted_once() {
        let old = snapshot(&[]);
        let new = snapshot(&[job(1, JobStatus::SPOOLING)]);

        let events = diff_snapshots(&old, &new);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::NewJob(j) if j.id == 1));
    }

    #[test]
    fn test_deleted_job_emitted() {
        let old = snapshot(&[job(1, JobStatus::PRINTING)]);
        let new = snapshot(&[]);

        let events = diff_snapshots(&old, &new);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::JobDeleted(j) if j.id == 1));
    }

    #[test]
    fn test_reportable_status_change_emitted() {
        let old = snapshot(&[job(1, JobStatus::PRINTING)]);
        let new = snapshot(&[job(1, JobStatus::ERROR)]);

        let events = diff_snapshots(&old, &new);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::StatusChange(j) if j.status == JobStatus::ERROR));
    }

    #[test]
    fn test_non_reportable_status_change_absorbed() {
        // Spooling -> printing is routine noise
        let old = snapshot(&[job(1, JobStatus::SPOOLING)]);
        let new = snapshot(&[job(1, JobStatus::PRINTING)]);

        assert!(diff_snapshots(&old, &new).is_empty());
    }

    #[test]
    fn test_unchanged_status_emits_nothing() {
        let old = snapshot(&[job(1, JobStatus::ERROR)]);
        let new = snapshot(&[job(1, JobStatus::ERROR)]);

        assert!(diff_snapshots(&old, &new).is_empty());
    }

    #[test]
    fn test_at_most_one_event_per_id_per_cycle() {
        let old = snapshot(&[job(1, JobStatus::SPOOLING), job(2, JobStatus::PRINTING)]);
        let new = snapshot(&[job(1, JobStatus::PAPER_OUT), job(3, JobStatus::SPOOLING)]);

        let events = diff_snapshots(&old, &new);
        assert_eq!(events.len(), 3);

        let mut ids: Vec<u32> = events.iter().filter_map(|e| e.job().map(|j| j.id)).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_diff_order_is_deterministic() {
        let old = snapshot(&[job(9, JobStatus::PRINTING)]);
        let new = snapshot(&[
            job(3, JobStatus::SPOOLING),
            job(1, JobStatus::SPOOLING),
            job(2, JobStatus::SPOOLING),
        ]);

        let events = diff_snapshots(&old, &new);
        let ids: Vec<u32> = events.iter().filter_map(|e| e.job().map(|j| j.id)).collect();
        // Additions ascending, then the deletion
        assert_eq!(ids, vec![1, 2, 3, 9]);
    }
}
