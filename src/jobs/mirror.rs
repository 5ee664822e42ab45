use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::model::Job;
use super::store::JobStore;

enum MirrorOp {
    Set(Box<Job>),
    Delete(String),
    Flush(oneshot::Sender<()>),
}

/// Best-effort asynchronous copy of the in-memory job table into a [`JobStore`].
///
/// A single writer task drains an unbounded queue, so records reach the store in
/// mutation order and callers never wait on I/O. Failed writes are logged and dropped.
#[derive(Clone)]
pub struct PersistenceMirror {
    tx: mpsc::UnboundedSender<MirrorOp>,
}

impl PersistenceMirror {
    /// Spawns the writer task. Requires a running tokio runtime.
    pub fn spawn(store: Arc<dyn JobStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(store, rx));
        Self { tx }
    }

    /// Queues a snapshot of `job`.
    pub fn persist(&self, job: &Job) {
        if self.tx.send(MirrorOp::Set(Box::new(job.clone()))).is_err() {
            warn!(job_id = %job.id, "Persistence mirror closed, job not persisted");
        }
    }

    /// Queues removal of a job record.
    pub fn forget(&self, id: &str) {
        if self.tx.send(MirrorOp::Delete(id.to_string())).is_err() {
            warn!(job_id = id, "Persistence mirror closed, job record not removed");
        }
    }

    /// Waits until everything queued so far has been handed to the store.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(MirrorOp::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn drain(store: Arc<dyn JobStore>, mut rx: mpsc::UnboundedReceiver<MirrorOp>) {
    while let Some(op) = rx.recv().await {
        match op {
            MirrorOp::Set(job) => {
                if let Err(e) = store.set(&job).await {
                    warn!(job_id = %job.id, error = %e, "Failed to persist job");
                }
            }
            MirrorOp::Delete(id) => {
                if let Err(e) = store.delete(&id).await {
                    warn!(job_id = %id, error = %e, "Failed to delete persisted job");
                }
            }
            MirrorOp::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("Persistence mirror stopped");
}
