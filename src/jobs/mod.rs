//! Job lifecycle: the per-document state machine, its in-memory table and durable store.

pub mod error;
pub mod manager;
pub mod mirror;
pub mod model;
pub mod store;


pub use error::{JobError, JobResult, StoreError, StoreResult};
pub use manager::{EvaluationStart, JobManager, SWEEP_INTERVAL};
pub use mirror::PersistenceMirror;
pub use model::{Job, JobStatus};
pub use store::{FileJobStore, JobPatch, JobStore, MemoryJobStore, apply_patch, retention_cutoff};
