//! In-memory table of active jobs.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{Job, JobId};

/// Active jobs in insertion order.
///
/// Cloning gives another handle to the same table.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<Vec<Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job, or replace the entry with the same id in place.
    pub async fn upsert(&self, job_id: JobId, mut job: Job) {
        job.job_id = job_id;
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|j| j.job_id == job_id) {
            Some(existing) => *existing = job,
            None => jobs.push(job),
        }
    }

    /// Get a job by id.
    pub async fn get(&self, job_id: JobId) -> Option<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .find(|j| j.job_id == job_id)
            .cloned()
    }

    /// Check whether a job is still active.
    pub async fn contains(&self, job_id: JobId) -> bool {
        self.jobs.read().await.iter().any(|j| j.job_id == job_id)
    }

    /// Remove a job. Removing an absent id is a no-op.
    pub async fn remove(&self, job_id: JobId) -> Option<Job> {
        let mut jobs = self.jobs.write().await;
        let index = jobs.iter().position(|j| j.job_id == job_id)?;
        Some(jobs.remove(index))
    }

    /// Record one successful share and return the new count.
    ///
    /// The count saturates at the job's target. Returns `None` if the job is
    /// no longer registered.
    pub async fn record_share(&self, job_id: JobId) -> Option<u32> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.iter_mut().find(|j| j.job_id == job_id)?;
        if job.count < job.target {
            job.count += 1;
        }
        Some(job.count)
    }

    /// All active jobs in insertion order.
    pub async fn snapshot_all(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
