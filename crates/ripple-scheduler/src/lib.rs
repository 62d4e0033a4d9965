//! Timed share-job scheduler for Ripple.
//!
//! This crate provides the in-memory job engine that:
//! - Resolves a submitted URL to a post id before accepting a job
//! - Runs one task per job, issuing one share attempt per interval tick
//! - Stops a job on its first failed attempt, on reaching its target, or at its deadline
//! - Tracks active jobs in a [`JobRegistry`] and accepted submissions in a [`HistoryLog`]

mod error;
mod history;
mod registry;
mod scheduler;
mod types;

pub use error::SchedulerError;
pub use history::HistoryLog;
pub use registry::JobRegistry;
pub use scheduler::{Scheduler, SubmitReceipt};
pub use types::{HistoryRecord, Job, JobId, JobSpec, Numeric, ShareRequest, Termination};
