//! Aggregator: fans N queue watchers into one consumer-facing stream
//!
//! One detached tokio task per watched queue, each owning exactly one
//! watcher. Producers push into an unbounded channel and never block; the
//! consumer races `recv` against the cancellation token so it stays
//! responsive while idle. Within one queue delivery order equals detection
//! order; across queues events interleave arbitrarily.

use crate::event::QueueEvent;
use crate::printer::PrinterBackend;
use crate::watcher;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;

/// Spawn one watcher task per queue and return the merged event stream.
///
/// The receiver yields `None` once every watcher has terminated (all
/// senders dropped). Worker tasks are detached; shutdown never joins them,
/// they exit within one wait cycle of `cancel`.
pub fn spawn(
    backend: Arc<dyn PrinterBackend>,
    queues: Vec<String>,
    cancel: CancellationToken,
) -> UnboundedReceiver<QueueEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    for queue in queues {
        let backend = Arc::clone(&backend);
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            watcher::watch(queue, backend.as_ref(), tx, cancel).await;
        });
    }

    rx
}
