//! Scheduler types.

use std::fmt;
use std::time::Duration;

use ripple_graph::PostId;
use serde::{Deserialize, Serialize};

use crate::SchedulerError;

/// Longest wall-clock span a single job may cover (`amount * interval`).
pub const MAX_JOB_SECS: u64 = 30 * 24 * 60 * 60;

/// Synthetic key of an accepted submission.
///
/// Allocated from a per-scheduler counter, so two jobs on the same post never
/// share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// An active share job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Registry key.
    pub job_id: JobId,
    /// Post id resolved from `url` when the job was accepted.
    pub post_id: PostId,
    /// URL as submitted.
    pub url: String,
    /// Successful share attempts so far.
    pub count: u32,
    /// Number of shares requested.
    pub target: u32,
}

impl Job {
    /// Create a job with no shares recorded yet.
    pub fn new(job_id: JobId, post_id: PostId, url: String, target: u32) -> Self {
        Self {
            job_id,
            post_id,
            url,
            count: 0,
            target,
        }
    }
}

/// A number that clients may send either as JSON number or as a numeric string.
///
/// Serializes back to the form it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Numeric {
    /// Interpret as a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Numeric::Int(n) => *n as f64,
            Numeric::Float(f) => *f,
            Numeric::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    fn is_blank(&self) -> bool {
        matches!(self, Numeric::Text(s) if s.trim().is_empty())
    }
}

/// A raw submission as it arrives from the HTTP layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub access_token: Option<String>,
    pub url: Option<String>,
    pub amount: Option<Numeric>,
    pub interval: Option<Numeric>,
}

impl ShareRequest {
    /// Check that every field is present and usable.
    ///
    /// Absent fields, blank strings and anything that reads as zero are
    /// reported as missing.
    pub fn validate(self) -> Result<JobSpec, SchedulerError> {
        let access_token = non_blank(self.access_token).ok_or_else(SchedulerError::missing_fields)?;
        let url = non_blank(self.url).ok_or_else(SchedulerError::missing_fields)?;
        let raw_amount = self.amount.ok_or_else(SchedulerError::missing_fields)?;
        let raw_interval = self.interval.ok_or_else(SchedulerError::missing_fields)?;

        let amount = nonzero(&raw_amount, "amount")?;
        let interval = nonzero(&raw_interval, "interval")?;

        if amount < 0.0 || amount.fract() != 0.0 || amount > f64::from(u32::MAX) {
            return Err(SchedulerError::Validation(
                "amount must be a positive whole number".to_string(),
            ));
        }
        let amount = amount as u32;

        let interval = Duration::try_from_secs_f64(interval)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                SchedulerError::Validation("interval must be a positive number of seconds".to_string())
            })?;

        match interval.checked_mul(amount) {
            Some(total) if total <= Duration::from_secs(MAX_JOB_SECS) => {}
            _ => {
                return Err(SchedulerError::Validation(format!(
                    "amount * interval must not exceed {} seconds",
                    MAX_JOB_SECS
                )));
            }
        }

        let submitted = HistoryRecord {
            access_token: access_token.clone(),
            url: url.clone(),
            amount: raw_amount,
            interval: raw_interval,
        };

        Ok(JobSpec {
            access_token,
            url,
            amount,
            interval,
            submitted,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn nonzero(value: &Numeric, field: &str) -> Result<f64, SchedulerError> {
    if value.is_blank() {
        return Err(SchedulerError::missing_fields());
    }
    match value.as_f64() {
        Some(n) if n == 0.0 => Err(SchedulerError::missing_fields()),
        Some(n) => Ok(n),
        None => Err(SchedulerError::Validation(format!("{field} must be a number"))),
    }
}

/// A validated submission.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    pub access_token: String,
    pub url: String,
    /// Number of shares, always > 0.
    pub amount: u32,
    /// Time between attempts, never zero.
    pub interval: Duration,
    /// The submission as received, for the history log.
    pub submitted: HistoryRecord,
}

impl JobSpec {
    /// Time between two share attempts.
    pub fn tick_period(&self) -> Duration {
        self.interval
    }

    /// Time after which the job is stopped even if short of its target.
    pub fn deadline(&self) -> Duration {
        self.interval * self.amount
    }
}

/// Snapshot of an accepted submission, with `amount` and `interval` kept in
/// the form the client sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub access_token: String,
    pub url: String,
    pub amount: Numeric,
    pub interval: Numeric,
}

/// How a job left the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Every requested share succeeded.
    Completed,
    /// A share attempt failed; no further attempts were made.
    Failed { count: u32, error: String },
    /// The deadline passed before the target was reached.
    Expired { count: u32 },
    /// The scheduler shut down.
    Interrupted { count: u32 },
    /// The job disappeared from the registry underneath its task.
    Removed,
}
