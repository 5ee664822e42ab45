//! Durable job stores.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};
use super::model::Job;

/// Top-level job fields to overwrite, keyed by their serialized names.
pub type JobPatch = Map<String, Value>;

/// CRUD over jobs keyed by id.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Inserts or replaces a job.
    async fn set(&self, job: &Job) -> StoreResult<()>;

    async fn get(&self, id: &str) -> StoreResult<Option<Job>>;

    /// Overwrites the patched fields and returns the stored job.
    async fn update(&self, id: &str, patch: &JobPatch) -> StoreResult<Job>;

    /// Returns `true` if a record was removed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    async fn list_all(&self) -> StoreResult<Vec<Job>>;

    /// Removes jobs created more than `age` ago and returns how many were removed.
    async fn delete_older_than(&self, age: Duration) -> StoreResult<usize>;
}

/// Applies a patch to a copy of `job`. The id never changes.
pub fn apply_patch(job: &Job, patch: &JobPatch) -> StoreResult<Job> {
    let mut value = serde_json::to_value(job)?;
    if let Value::Object(fields) = &mut value {
        for (key, patched) in patch {
            if key == "id" {
                continue;
            }
            fields.insert(key.clone(), patched.clone());
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Creation-time cutoff for `delete_older_than`. `None` when nothing can be that old.
pub fn retention_cutoff(age: Duration) -> Option<DateTime<Utc>> {
    let age = TimeDelta::from_std(age).ok()?;
    Utc::now().checked_sub_signed(age)
}

/// In-process store, mostly for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn set(&self, job: &Job) -> StoreResult<()> {
        self.jobs.write().insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().get(id).cloned())
    }

    async fn update(&self, id: &str, patch: &JobPatch) -> StoreResult<Job> {
        let mut jobs = self.jobs.write();
        let current = jobs
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let updated = apply_patch(current, patch)?;
        jobs.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.jobs.write().remove(id).is_some())
    }

    async fn list_all(&self) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.read().values().cloned().collect())
    }

    async fn delete_older_than(&self, age: Duration) -> StoreResult<usize> {
        let Some(cutoff) = retention_cutoff(age) else {
            return Ok(0);
        };
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, job| job.created_at >= cutoff);
        Ok(before - jobs.len())
    }
}

/// One pretty-printed `<id>.json` file per job.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    dir: PathBuf,
}

impl FileJobStore {
    const EXTENSION: &'static str = "json";

    /// Opens the store, creating `dir` if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids are generated UUIDs; anything else cannot name a file in the store.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{id}.{}", Self::EXTENSION)))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    async fn read_job(path: &Path) -> StoreResult<Option<Job>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(path, e)),
        }
    }

    async fn write_job(&self, path: &Path, job: &Job) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(job)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| Self::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| Self::io_error(path, e))
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn set(&self, job: &Job) -> StoreResult<()> {
        let path = self.path_for(&job.id).ok_or_else(|| StoreError::NotFound {
            id: job.id.clone(),
        })?;
        self.write_job(&path, job).await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Job>> {
        match self.path_for(id) {
            Some(path) => Self::read_job(&path).await,
            None => Ok(None),
        }
    }

    async fn update(&self, id: &str, patch: &JobPatch) -> StoreResult<Job> {
        let path = self
            .path_for(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let current = Self::read_job(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let updated = apply_patch(&current, patch)?;
        self.write_job(&path, &updated).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let Some(path) = self.path_for(id) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<Job>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?;

        let mut jobs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(Self::EXTENSION) {
                continue;
            }
            match Self::read_job(&path).await {
                Ok(Some(job)) => jobs.push(job),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable job record"),
            }
        }
        debug!(dir = %self.dir.display(), count = jobs.len(), "Listed job records");
        Ok(jobs)
    }

    async fn delete_older_than(&self, age: Duration) -> StoreResult<usize> {
        let Some(cutoff) = retention_cutoff(age) else {
            return Ok(0);
        };
        let mut removed = 0;
        for job in self.list_all().await? {
            if job.created_at < cutoff && self.delete(&job.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
