//! Durable print-history context store
//!
//! Keeps per-user and per-document print counts in a JSON snapshot so the
//! generated notifications can reference history ("the 5th time Dave has
//! printed"). The store is only ever touched by the consumer loop, so it
//! needs no locking. Every mutation is followed by a synchronous
//! best-effort save; a failed write keeps the in-memory store authoritative
//! for the rest of the session.

use crate::error::PersistenceError;
use crate::printer::PrintJob;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// History for one user or one document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub print_count: u64,
    pub last_print_at: DateTime<Utc>,
}

/// On-disk snapshot shape
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MemoryData {
    pub users: BTreeMap<String, HistoryEntry>,
    pub documents: BTreeMap<String, HistoryEntry>,
}

/// The agent's long-term memory, backed by a JSON file
#[derive(Debug)]
pub struct Memory {
    path: PathBuf,
    data: MemoryData,
}

/// Integer to ordinal string: 1 -> "1st", 2 -> "2nd", 11 -> "11th", 21 -> "21st"
pub fn ordinal(n: u64) -> String {
    let suffix = if (11..=13).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}

impl Memory {
    /// Load the snapshot from `path`.
    ///
    /// A missing file is the normal first run: an empty store is returned
    /// and persisted immediately. A corrupt file logs a warning and yields
    /// an empty in-memory store without overwriting the file; the next
    /// successful update will replace it.
    pub fn load(path: &Path) -> Memory {
        if !path.exists() {
            tracing::debug!("No memory snapshot at {:?}, starting fresh", path);
            let memory = Memory {
                path: path.to_path_buf(),
                data: MemoryData::default(),
            };
            if let Err(e) = memory.save() {
                tracing::warn!("Could not persist initial memory snapshot: {}", e);
            }
            return memory;
        }

        let data = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        "Could not parse {:?}, starting with a fresh memory: {}",
                        path,
                        e
                    );
                    MemoryData::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Could not read {:?}, starting with a fresh memory: {}",
                    path,
                    e
                );
                MemoryData::default()
            }
        };

        Memory {
            path: path.to_path_buf(),
            data,
        }
    }

    /// Persist the current snapshot. Pretty-printed so the file stays
    /// inspectable by hand.
    pub fn save(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, contents).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Record `job` in the history and return the context summary.
    ///
    /// Counters for the user and the document are incremented (empty names
    /// are skipped), the snapshot is saved synchronously, and the summary
    /// reflects the updated counts. Save failures are logged, never fatal.
    pub fn update_and_summarize(&mut self, job: &PrintJob) -> String {
        let now = Utc::now();
        let mut parts = Vec::new();

        if !job.user.is_empty() {
            let entry = self
                .data
                .users
                .entry(job.user.clone())
                .or_insert(HistoryEntry {
                    print_count: 0,
                    last_print_at: now,
                });
            entry.print_count += 1;
            entry.last_print_at = now;
            parts.push(format!(
                "This is the {} time '{}' has printed.",
                ordinal(entry.print_count),
                job.user
            ));
        }

        if !job.document.is_empty() {
            let entry = self
                .data
                .documents
                .entry(job.document.clone())
                .or_insert(HistoryEntry {
                    print_count: 0,
                    last_print_at: now,
                });
            entry.print_count += 1;
            entry.last_print_at = now;
            // Only worth mentioning once the document is a repeat offender
            if entry.print_count > 1 {
                parts.push(format!(
                    "The document '{}' has been printed {} times before.",
                    job.document, entry.print_count
                ));
            }
        }

        if let Err(e) = self.save() {
            tracing::warn!("Could not persist memory snapshot: {}", e);
        }

        parts.join(" ")
    }

    /// Context summary without touching the counters.
    ///
    /// Used for events that are not fresh submissions when the config says
    /// counters update on new jobs only. Keys with no recorded history
    /// contribute nothing.
    pub fn summarize(&self, job: &PrintJob) -> String {
        let mut parts = Vec::new();

        if let Some(entry) = self.data.users.get(&job.user) {
            parts.push(format!(
                "This is the {} time '{}' has printed.",
                ordinal(entry.print_count),
                job.user
            ));
        }

        if let Some(entry) = self.data.documents.get(&job.document) {
            if entry.print_count > 1 {
                parts.push(format!(
                    "The document '{}' has been printed {} times before.",
                    job.document, entry.print_count
                ));
            }
        }

        parts.join(" ")
    }

    /// Recorded print count for a user (zero when never seen)
    pub fn user_print_count(&self, user: &str) -> u64 {
        self.data.users.get(user).map(|e| e.print_count).unwrap_or(0)
    }

    /// Recorded print count for a document (zero when never seen)
    pub fn document_print_count(&self, document: &str) -> u64 {
        self.data
            .documents
            .get(document)
            .map(|e| e.print_count)
            .unwrap_or(0)
    }
}
