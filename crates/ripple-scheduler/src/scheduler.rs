//! Job scheduler implementation.

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use ripple_graph::{PostId, SharePoster};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tracing::{debug, info, warn};

use crate::{
    HistoryLog, Job, JobId, JobRegistry, JobSpec, SchedulerError, ShareRequest,
    Termination,
};

/// Returned to the caller once a job is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub job_id: JobId,
    pub post_id: PostId,
    pub access_token: String,
}

/// The share-job scheduler.
///
/// Owns the registry of active jobs and the submission history. Each accepted
/// job runs on its own tokio task until it completes, fails, expires or the
/// scheduler shuts down.
pub struct Scheduler {
    poster: Arc<dyn SharePoster>,
    registry: JobRegistry,
    history: HistoryLog,
    next_id: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
}

impl Scheduler {
    /// Create a new scheduler.
    pub fn new(poster: Arc<dyn SharePoster>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            poster,
            registry: JobRegistry::new(),
            history: HistoryLog::new(),
            next_id: AtomicU64::new(1),
            shutdown_tx,
        }
    }

    /// Active jobs.
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Accepted submissions.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Validate a submission, resolve its post id and start the job.
    ///
    /// Returns once the job is active; how it eventually ends is only visible
    /// through the registry and the logs.
    pub async fn submit(&self, request: ShareRequest) -> Result<SubmitReceipt, SchedulerError> {
        let (receipt, _handle) = self.submit_tracked(request).await?;
        Ok(receipt)
    }

    /// Like [`Scheduler::submit`], but also hands back the job task.
    pub async fn submit_tracked(
        &self,
        request: ShareRequest,
    ) -> Result<(SubmitReceipt, JoinHandle<Termination>), SchedulerError> {
        let spec = request.validate()?;
        self.start(spec).await
    }

    #[tracing::instrument(skip(self, spec), fields(url = %spec.url, amount = spec.amount, interval = ?spec.interval))]
    async fn start(
        &self,
        spec: JobSpec,
    ) -> Result<(SubmitReceipt, JoinHandle<Termination>), SchedulerError> {
        let post_id = self
            .poster
            .resolve_post_id(&spec.url)
            .await?
            .ok_or(SchedulerError::InvalidLink)?;

        let job_id = JobId::new(self.next_id.fetch_add(1, AtomicOrdering::Relaxed));
        let job = Job::new(job_id, post_id.clone(), spec.url.clone(), spec.amount);
        self.registry.upsert(job_id, job).await;

        let task = JobTask {
            job_id,
            post_id: post_id.clone(),
            access_token: spec.access_token.clone(),
            target: spec.amount,
            period: spec.tick_period(),
            poster: Arc::clone(&self.poster),
            registry: self.registry.clone(),
            shutdown_rx: self.shutdown_tx.subscribe(),
        };
        let handle = tokio::spawn(task.run());

        self.history.append(spec.submitted).await;
        info!(job_id = %job_id, post_id = %post_id, "share job accepted");

        Ok((
            SubmitReceipt {
                job_id,
                post_id,
                access_token: spec.access_token,
            },
            handle,
        ))
    }

    /// Stop every running job.
    pub fn shutdown(&self) {
        info!("scheduler shutting down");
        self.shutdown_tx.send_replace(true);
    }
}

/// Result of one share attempt.
#[derive(Debug)]
enum TickOutcome {
    Progressed(u32),
    Completed,
    Failed(SchedulerError),
    Removed,
}

/// State owned by a single job's task.
struct JobTask {
    job_id: JobId,
    post_id: PostId,
    access_token: String,
    target: u32,
    period: Duration,
    poster: Arc<dyn SharePoster>,
    registry: JobRegistry,
    shutdown_rx: watch::Receiver<bool>,
}

impl JobTask {
    /// Drive the job until it terminates, then remove it from the registry.
    ///
    /// Ticks fire every `period` starting one period after the job starts. The
    /// deadline sits at `period * target`. A tick due at the deadline still
    /// runs; an attempt started earlier is cut off when the deadline passes.
    async fn run(mut self) -> Termination {
        let start = Instant::now();
        let deadline_at = start + self.period * self.target;
        let deadline = sleep_until(deadline_at);
        tokio::pin!(deadline);

        let mut ticker = interval_at(start + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let termination = loop {
            if *self.shutdown_rx.borrow() {
                break Termination::Interrupted {
                    count: self.count().await,
                };
            }

            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break Termination::Interrupted { count: self.count().await };
                    }
                }

                at = ticker.tick() => {
                    let outcome = match at.cmp(&deadline_at) {
                        Ordering::Greater => {
                            break Termination::Expired { count: self.count().await };
                        }
                        Ordering::Equal => self.attempt().await,
                        Ordering::Less => {
                            if Instant::now() >= deadline_at {
                                break Termination::Expired { count: self.count().await };
                            }
                            tokio::select! {
                                biased;
                                outcome = self.attempt() => outcome,
                                _ = &mut deadline => {
                                    break Termination::Expired { count: self.count().await };
                                }
                            }
                        }
                    };

                    match outcome {
                        TickOutcome::Progressed(count) => {
                            debug!(job_id = %self.job_id, count, target = self.target, "share recorded");
                        }
                        TickOutcome::Completed => break Termination::Completed,
                        TickOutcome::Failed(error) => {
                            break Termination::Failed {
                                count: self.count().await,
                                error: error.to_string(),
                            };
                        }
                        TickOutcome::Removed => break Termination::Removed,
                    }
                }

                _ = &mut deadline => {
                    break Termination::Expired { count: self.count().await };
                }
            }
        };

        self.registry.remove(self.job_id).await;
        self.log_termination(&termination);
        termination
    }

    /// One share attempt. Never retried.
    async fn attempt(&self) -> TickOutcome {
        if !self.registry.contains(self.job_id).await {
            return TickOutcome::Removed;
        }

        if let Err(e) = self.poster.share(&self.post_id, &self.access_token).await {
            return TickOutcome::Failed(SchedulerError::ShareAttempt(e));
        }

        match self.registry.record_share(self.job_id).await {
            Some(count) if count >= self.target => TickOutcome::Completed,
            Some(count) => TickOutcome::Progressed(count),
            None => TickOutcome::Removed,
        }
    }

    async fn count(&self) -> u32 {
        self.registry
            .get(self.job_id)
            .await
            .map(|j| j.count)
            .unwrap_or(0)
    }

    fn log_termination(&self, termination: &Termination) {
        match termination {
            Termination::Completed => {
                info!(job_id = %self.job_id, post_id = %self.post_id, target = self.target, "share job completed");
            }
            Termination::Failed { count, error } => {
                warn!(
                    job_id = %self.job_id,
                    post_id = %self.post_id,
                    count,
                    target = self.target,
                    error = %error,
                    "share job failed"
                );
            }
            Termination::Expired { count } => {
                warn!(
                    job_id = %self.job_id,
                    post_id = %self.post_id,
                    count,
                    target = self.target,
                    "share job hit its deadline before reaching target"
                );
            }
            Termination::Interrupted { count } => {
                info!(job_id = %self.job_id, count, "share job interrupted by shutdown");
            }
            Termination::Removed => {
                debug!(job_id = %self.job_id, "share job removed from registry, stopping");
            }
        }
    }
}
