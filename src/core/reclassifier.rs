//! Background worker that keeps the inexpensiveness flag up to date.
//!
//! Product creation enqueues the restaurant through [`Reclassifier::schedule`] and returns
//! right away. A single task drains the queue and runs
//! [`recompute_inexpensiveness`](crate::core::inexpensiveness::recompute_inexpensiveness)
//! for each job. Failures are logged and dropped; they never reach the code that
//! scheduled the job, so the flag can stay stale until the next product is created.

use crate::core::inexpensiveness::recompute_inexpensiveness;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, warn};

/// Counters reported by the worker when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclassifierStats {
    /// Jobs that ran to completion, including ones that left the flag untouched
    pub processed: u64,
    /// Jobs whose recomputation returned an error
    pub failed: u64,
}

/// Handle to the reclassification worker.
pub struct Reclassifier {
    sender: mpsc::UnboundedSender<i64>,
    task: JoinHandle<ReclassifierStats>,
}

impl Reclassifier {
    /// Starts the worker on the current Tokio runtime, sharing `db` with the caller.
    #[must_use]
    pub fn spawn(db: Arc<DatabaseConnection>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_worker(db, receiver));
        Self { sender, task }
    }

    /// Queues a recomputation for `restaurant_id` without waiting for it.
    pub fn schedule(&self, restaurant_id: i64) {
        if self.sender.send(restaurant_id).is_err() {
            warn!(restaurant_id, "Reclassifier worker is gone, dropping job");
        } else {
            debug!(restaurant_id, "Reclassification scheduled");
        }
    }

    /// Stops accepting jobs and waits until every queued job has run.
    pub async fn shutdown(self) -> ReclassifierStats {
        drop(self.sender);
        match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Reclassifier worker terminated abnormally: {}", e);
                ReclassifierStats::default()
            }
        }
    }
}

async fn run_worker(
    db: Arc<DatabaseConnection>,
    mut receiver: mpsc::UnboundedReceiver<i64>,
) -> ReclassifierStats {
    let mut stats = ReclassifierStats::default();

    while let Some(restaurant_id) = receiver.recv().await {
        stats.processed += 1;
        if let Err(e) = recompute_inexpensiveness(db.as_ref(), restaurant_id).await {
            stats.failed += 1;
            warn!(restaurant_id, "Failed to recompute inexpensiveness: {}", e);
        }
    }

    info!(
        processed = stats.processed,
        failed = stats.failed,
        "Reclassifier worker stopped"
    );
    stats
}
