//! CUPS polling backend
//!
//! Talks to the local CUPS installation through its command line tools
//! (`lpstat` for queue enumeration, `lpq` for per-queue job listings).
//! CUPS exposes no change-notification primitive to unprivileged clients,
//! so `wait_for_change` is a fixed poll delay; the watcher contract is the
//! same either way.

use super::{JobStatus, PrintJob, PrinterBackend, PrinterSession};
use crate::error::WatcherError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Backend enumerating and opening CUPS queues
pub struct CupsBackend {
    poll_interval: Duration,
}

impl CupsBackend {
    pub fn new(poll_interval_secs: u64) -> Self {
        Self {
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
        }
    }
}

impl PrinterBackend for CupsBackend {
    fn enumerate(&self) -> Result<Vec<String>, WatcherError> {
        let output = std::process::Command::new("lpstat")
            .arg("-p")
            .stderr(Stdio::null())
            .output()
            .map_err(|e| WatcherError::Enumerate(format!("failed to run lpstat: {}", e)))?;

        // lpstat exits non-zero when no destinations exist; treat that as
        // an empty queue list rather than a failure.
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_printer_list(&stdout))
    }

    fn open(&self, queue: &str) -> Result<Box<dyn PrinterSession>, WatcherError> {
        let known = self.enumerate()?;
        if !known.iter().any(|q| q == queue) {
            return Err(WatcherError::UnknownQueue(queue.to_string()));
        }

        tracing::info!("Opened CUPS queue '{}'", queue);
        Ok(Box::new(CupsSession {
            queue: queue.to_string(),
            poll_interval: self.poll_interval,
        }))
    }
}

/// One polling session on one CUPS queue
struct CupsSession {
    queue: String,
    poll_interval: Duration,
}

#[async_trait]
impl PrinterSession for CupsSession {
    async fn wait_for_change(&mut self) -> Result<(), WatcherError> {
        tokio::time::sleep(self.poll_interval).await;
        Ok(())
    }

    async fn jobs(&mut self) -> Result<Vec<PrintJob>, WatcherError> {
        let output = Command::new("lpq")
            .args(["-P", &self.queue])
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                WatcherError::EnumerateJobs(self.queue.clone(), format!("failed to run lpq: {}", e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_job_listing(&stdout))
    }
}

/// Extract queue names from `lpstat -p` output.
///
/// Lines look like: `printer HP_LaserJet is idle.  enabled since ...`
fn parse_printer_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("printer"), Some(name)) => Some(name.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// Parse `lpq -P <queue>` output into print jobs.
///
/// Expected shape:
/// ```text
/// HP_LaserJet is ready and printing
/// Rank    Owner   Job     File(s)                         Total Size
/// active  susan   123     Resume_final.docx               10240 bytes
/// 1st     dave    124     quarterly report.pdf            2048 bytes
/// ```
///
/// The File(s) column may contain spaces, so the document name is taken as
/// everything between the job id and the trailing `<n> bytes` pair. Page
/// counts are not exposed by lpq and stay zero.
fn parse_job_listing(output: &str) -> Vec<PrintJob> {
    let queue_offline = output
        .lines()
        .next()
        .map(|line| line.contains("not ready"))
        .unwrap_or(false);

    let mut jobs = Vec::new();
    let mut seen_header = false;

    for line in output.lines() {
        if !seen_header {
            if line.trim_start().starts_with("Rank") {
                seen_header = true;
            }
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            continue;
        }

        let rank = tokens[0];
        let owner = tokens[1];
        let Ok(id) = tokens[2].parse::<u32>() else {
            continue;
        };

        // Trailing "<n> bytes" pair, when present
        let (doc_tokens, size_bytes) = if tokens.len() >= 5 && tokens[tokens.len() - 1] == "bytes" {
            (
                &tokens[3..tokens.len() - 2],
                tokens[tokens.len() - 2].parse::<u64>().unwrap_or(0),
            )
        } else {
            (&tokens[3..], 0)
        };

        let mut status = if rank == "active" {
            JobStatus::PRINTING
        } else if rank.eq_ignore_ascii_case("held") {
            JobStatus::PAUSED
        } else {
            JobStatus::SPOOLING
        };
        if queue_offline {
            status = JobStatus(status.0 | JobStatus::OFFLINE.0);
        }

        jobs.push(PrintJob {
            id,
            document: doc_tokens.join(" "),
            user: owner.to_string(),
            status,
            total_pages: 0,
            size_bytes,
            submitted_at: None,
        });
    }

    jobs
}
