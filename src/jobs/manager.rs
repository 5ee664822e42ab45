use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::Mutex;
use tokio::time;
use tracing::{debug, error, info, instrument, warn};

use super::error::{JobError, JobResult};
use super::mirror::PersistenceMirror;
use super::model::{Job, JobStatus};
use super::store::{JobStore, retention_cutoff};
use crate::analyzer::{ComplianceAnalyzer, ProgressSink, ProgressUpdate};
use crate::document::DocumentStats;

/// How often the retention sweeper runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

type JobEntry = Arc<Mutex<Job>>;

/// Outcome of an evaluate request that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationStart {
    /// A background run was spawned for these frameworks.
    Started { frameworks: Vec<String> },
    /// The job already finished; nothing was re-run.
    AlreadyCompleted,
}

struct Inner {
    /// Authoritative for the lifetime of the process. Never evicts on its own.
    jobs: Cache<String, JobEntry>,
    store: Arc<dyn JobStore>,
    mirror: PersistenceMirror,
    analyzer: Arc<ComplianceAnalyzer>,
    retention: Duration,
    sweeper_running: AtomicBool,
    shutdown_initiated: AtomicBool,
}

/// Owns every job's state machine: `uploaded -> processing -> completed | failed`.
///
/// Each job sits behind its own mutex, so a progress write from a running evaluation and a
/// status read from a poller always see a consistent snapshot. Every mutation is queued on
/// the [`PersistenceMirror`].
#[derive(Clone)]
pub struct JobManager {
    inner: Arc<Inner>,
}

impl JobManager {
    /// Creates a manager and spawns its persistence writer. Requires a tokio runtime.
    pub fn new(
        analyzer: Arc<ComplianceAnalyzer>,
        store: Arc<dyn JobStore>,
        retention: Duration,
    ) -> Self {
        let mirror = PersistenceMirror::spawn(Arc::clone(&store));
        Self {
            inner: Arc::new(Inner {
                jobs: Cache::builder().build(),
                store,
                mirror,
                analyzer,
                retention,
                sweeper_running: AtomicBool::new(false),
                shutdown_initiated: AtomicBool::new(false),
            }),
        }
    }

    pub fn analyzer(&self) -> &Arc<ComplianceAnalyzer> {
        &self.inner.analyzer
    }

    /// Loads every durable record into memory.
    ///
    /// Jobs interrupted mid-run stay in `processing`; nothing resumes them.
    pub async fn restore(&self) -> JobResult<usize> {
        let jobs = self.inner.store.list_all().await?;
        let count = jobs.len();
        for job in jobs {
            if job.is_processing() {
                warn!(job_id = %job.id, "Restored job is stuck in processing");
            }
            self.inner
                .jobs
                .insert(job.id.clone(), Arc::new(Mutex::new(job)));
        }
        info!(count, "Restored jobs from store");
        Ok(count)
    }

    /// Records an uploaded document as a new job.
    pub fn register_upload(
        &self,
        filename: impl Into<String>,
        file_path: PathBuf,
        stats: DocumentStats,
    ) -> Job {
        let job = Job::uploaded(filename, file_path, stats);
        self.inner.mirror.persist(&job);
        self.inner
            .jobs
            .insert(job.id.clone(), Arc::new(Mutex::new(job.clone())));
        info!(job_id = %job.id, filename = %job.filename, chars = job.char_count, "Registered upload");
        job
    }

    /// Returns a consistent snapshot of a job.
    pub async fn get_job(&self, id: &str) -> JobResult<Job> {
        let entry = self.entry(id).await?;
        let snapshot = entry.lock().clone();
        Ok(snapshot)
    }

    async fn entry(&self, id: &str) -> JobResult<JobEntry> {
        if let Some(entry) = self.inner.jobs.get(id) {
            return Ok(entry);
        }
        // A queued delete must land before the store is consulted.
        self.inner.mirror.flush().await;
        match self.inner.store.get(id).await? {
            Some(job) => Ok(self
                .inner
                .jobs
                .entry(id.to_string())
                .or_insert(Arc::new(Mutex::new(job)))
                .into_value()),
            None => Err(JobError::NotFound { id: id.to_string() }),
        }
    }

    /// Moves an `uploaded` or `failed` job into `processing` and spawns its run.
    ///
    /// Every framework is validated first; on any rejection the job is left untouched.
    #[instrument(skip(self, frameworks))]
    pub async fn start_evaluation(
        &self,
        id: &str,
        frameworks: &[String],
        max_controls: Option<usize>,
    ) -> JobResult<EvaluationStart> {
        let entry = self.entry(id).await?;

        let (file_path, frameworks) = {
            let mut job = entry.lock();
            if !self.is_live(id) {
                return Err(JobError::NotFound { id: id.to_string() });
            }
            match job.status {
                JobStatus::Processing => {
                    return Err(JobError::AlreadyProcessing { id: id.to_string() });
                }
                JobStatus::Completed => return Ok(EvaluationStart::AlreadyCompleted),
                JobStatus::Uploaded | JobStatus::Failed => {}
            }

            let frameworks = self.inner.analyzer.resolve_frameworks(frameworks)?;
            job.begin(frameworks.clone());
            self.inner.mirror.persist(&job);
            (job.file_path.clone(), frameworks)
        };

        info!(job_id = id, frameworks = ?frameworks, "Job processing");
        tokio::spawn(self.clone().run(
            id.to_string(),
            entry,
            file_path,
            frameworks.clone(),
            max_controls,
        ));

        Ok(EvaluationStart::Started { frameworks })
    }

    /// Drives one run to `completed` or `failed`.
    ///
    /// The analysis runs in its own task so a panic still lands the job in `failed`.
    async fn run(
        self,
        job_id: String,
        entry: JobEntry,
        file_path: PathBuf,
        frameworks: Vec<String>,
        max_controls: Option<usize>,
    ) {
        let analyzer = Arc::clone(&self.inner.analyzer);
        let manager = self.clone();
        let progress_entry = Arc::clone(&entry);

        let task = tokio::spawn(async move {
            let record = move |update: ProgressUpdate| {
                let mut job = progress_entry.lock();
                job.record_progress(update);
                manager.persist_live(&job);
            };
            let sink: &ProgressSink = &record;
            analyzer
                .analyze_document(&file_path, &frameworks, max_controls, Some(sink))
                .await
        });

        let outcome = match task.await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("evaluation task aborted: {e}")),
        };

        let mut job = entry.lock();
        if !self.is_live(&job_id) {
            info!(job_id = %job_id, "Job deleted during evaluation, outcome discarded");
            return;
        }
        match outcome {
            Ok(results) => {
                info!(
                    job_id = %job_id,
                    overall_score = results.summary.overall_score,
                    controls = results.summary.total_controls_evaluated,
                    "Job completed"
                );
                job.complete(results);
            }
            Err(message) => {
                error!(job_id = %job_id, error = %message, "Job failed");
                job.fail(message);
            }
        }
        self.inner.mirror.persist(&job);
    }

    fn is_live(&self, id: &str) -> bool {
        self.inner.jobs.contains_key(id)
    }

    /// Queues a write unless the job was deleted. Call with the job's lock held.
    fn persist_live(&self, job: &Job) {
        if self.is_live(&job.id) {
            self.inner.mirror.persist(job);
        } else {
            debug!(job_id = %job.id, "Skipping write for deleted job");
        }
    }

    /// Drops a job from memory and queues removal of its record.
    ///
    /// Runs under the job's lock, so a concurrent run either persists before the delete
    /// is queued or sees the job gone and persists nothing.
    fn evict(&self, id: &str, entry: &JobEntry) -> PathBuf {
        let job = entry.lock();
        self.inner.jobs.invalidate(id);
        self.inner.mirror.forget(id);
        job.file_path.clone()
    }

    /// Removes the job from memory and the store, then deletes its upload (best effort).
    pub async fn delete_job(&self, id: &str) -> JobResult<()> {
        let entry = self.entry(id).await?;
        let file_path = self.evict(id, &entry);
        remove_upload(&file_path).await;

        info!(job_id = id, "Deleted job");
        Ok(())
    }

    /// Drops jobs older than the retention period from memory and the store.
    /// Returns how many records went away.
    pub async fn sweep_expired(&self) -> JobResult<usize> {
        let Some(cutoff) = retention_cutoff(self.inner.retention) else {
            return Ok(0);
        };

        let expired: Vec<(String, JobEntry)> = self
            .inner
            .jobs
            .iter()
            .filter(|(_, entry)| entry.lock().created_at < cutoff)
            .map(|(id, entry)| ((*id).clone(), entry))
            .collect();

        for (id, entry) in &expired {
            let file_path = self.evict(id, entry);
            remove_upload(&file_path).await;
        }

        self.inner.mirror.flush().await;
        // Records never loaded into memory.
        let stray = self
            .inner
            .store
            .delete_older_than(self.inner.retention)
            .await?;
        info!(evicted = expired.len(), stray, "Swept expired jobs");
        Ok(expired.len() + stray)
    }

    /// Starts the daily retention sweeper (no-op if already running).
    pub fn start_sweeper(&self) -> tokio::task::JoinHandle<()> {
        if self.inner.sweeper_running.swap(true, Ordering::AcqRel) {
            return tokio::spawn(async {});
        }

        let manager = self.clone();
        tokio::spawn(async move {
            let mut interval = time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                if manager.inner.shutdown_initiated.load(Ordering::Acquire) {
                    break;
                }
                if let Err(e) = manager.sweep_expired().await {
                    warn!(error = %e, "Retention sweep failed");
                }
            }
            manager.inner.sweeper_running.store(false, Ordering::Release);
        })
    }

    /// Stops the sweeper and waits for queued writes to reach the store.
    pub async fn shutdown(&self) {
        if self.inner.shutdown_initiated.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.mirror.flush().await;
    }

    /// Waits for queued writes to reach the store.
    pub async fn flush(&self) {
        self.inner.mirror.flush().await;
    }
}

async fn remove_upload(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove uploaded file"),
    }
}
