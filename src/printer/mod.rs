//! Printer backend capability interface
//!
//! The rest of the pipeline never touches a spooler directly. It talks to
//! two small traits: `PrinterBackend` (enumerate queues, open a session)
//! and `PrinterSession` (wait for a change, snapshot the job list). The
//! watcher in `watcher.rs` is written once against these traits; backends
//! with native change notifications and backends that can only poll expose
//! the identical contract.

pub mod cups;

use crate::config::MonitorConfig;
use crate::error::WatcherError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Bitmask of job status flags, mirroring the classic spooler flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JobStatus(pub u32);

impl JobStatus {
    pub const NORMAL: JobStatus = JobStatus(0);
    pub const PAUSED: JobStatus = JobStatus(0x0001);
    pub const ERROR: JobStatus = JobStatus(0x0002);
    pub const DELETING: JobStatus = JobStatus(0x0004);
    pub const SPOOLING: JobStatus = JobStatus(0x0008);
    pub const PRINTING: JobStatus = JobStatus(0x0010);
    pub const OFFLINE: JobStatus = JobStatus(0x0020);
    pub const PAPER_OUT: JobStatus = JobStatus(0x0040);
    pub const PRINTED: JobStatus = JobStatus(0x0080);
    pub const DELETED: JobStatus = JobStatus(0x0100);
    pub const BLOCKED: JobStatus = JobStatus(0x0200);
    pub const USER_INTERVENTION: JobStatus = JobStatus(0x0400);

    /// Status flags worth surfacing as a StatusChange event. Transitions
    /// outside this set are absorbed into the baseline without emission.
    pub const REPORTABLE: JobStatus = JobStatus(
        Self::PAUSED.0
            | Self::ERROR.0
            | Self::OFFLINE.0
            | Self::PAPER_OUT.0
            | Self::USER_INTERVENTION.0
            | Self::BLOCKED.0
            | Self::SPOOLING.0
            | Self::PRINTED.0,
    );

    /// Status flags that bypass debounce suppression for already-notified
    /// jobs. These are the operationally significant states.
    pub const HIGH_PRIORITY: JobStatus = JobStatus(
        Self::ERROR.0 | Self::PAPER_OUT.0 | Self::USER_INTERVENTION.0 | Self::BLOCKED.0,
    );

    /// Whether any flag is shared with `other`
    pub fn intersects(self, other: JobStatus) -> bool {
        self.0 & other.0 != 0
    }

    /// Human-readable name for the most significant set flag
    pub fn describe(self) -> String {
        const NAMES: &[(JobStatus, &str)] = &[
            (JobStatus::PAUSED, "Paused"),
            (JobStatus::ERROR, "Error"),
            (JobStatus::DELETING, "Deleting"),
            (JobStatus::SPOOLING, "Spooling"),
            (JobStatus::PRINTING, "Printing"),
            (JobStatus::OFFLINE, "Offline"),
            (JobStatus::PAPER_OUT, "Paper Out"),
            (JobStatus::PRINTED, "Printed"),
            (JobStatus::DELETED, "Deleted"),
            (JobStatus::BLOCKED, "Blocked"),
            (JobStatus::USER_INTERVENTION, "User Intervention"),
        ];

        for (flag, name) in NAMES {
            if self.intersects(*flag) {
                return (*name).to_string();
            }
        }
        if self == JobStatus::NORMAL {
            "Normal".to_string()
        } else {
            format!("Unknown Status ({})", self.0)
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// One unit of work in a print queue.
///
/// Identity is `id`, unique within a queue's lifetime. An id recycled by
/// the OS after a long idle period is treated as a new entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintJob {
    pub id: u32,
    pub document: String,
    pub user: String,
    pub status: JobStatus,
    pub total_pages: u32,
    pub size_bytes: u64,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Capability for enumerating queues and opening watch sessions
pub trait PrinterBackend: Send + Sync {
    /// List the names of all available print queues
    fn enumerate(&self) -> Result<Vec<String>, WatcherError>;

    /// Open a session on the named queue
    fn open(&self, queue: &str) -> Result<Box<dyn PrinterSession>, WatcherError>;
}

/// One open handle on one queue.
///
/// `wait_for_change` is the suspension point of a watcher: a native change
/// notification where the platform has one, a poll delay otherwise. The
/// session releases its resources on drop.
#[async_trait]
pub trait PrinterSession: Send {
    /// Block until the job list may have changed (or the poll interval elapses)
    async fn wait_for_change(&mut self) -> Result<(), WatcherError>;

    /// Snapshot the current job list
    async fn jobs(&mut self) -> Result<Vec<PrintJob>, WatcherError>;
}

/// Factory for the platform printer backend
pub fn create_backend(config: &MonitorConfig) -> Box<dyn PrinterBackend> {
    tracing::debug!(
        "Creating CUPS polling backend (interval: {}s)",
        config.poll_interval_secs
    );
    Box::new(cups::CupsBackend::new(config.poll_interval_secs))
}
