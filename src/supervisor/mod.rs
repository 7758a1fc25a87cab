//! Poll-driven supervision of one submitted job.
//!
//! The supervisor owns a single cooperative loop: await a tick, poll the
//! substrate, interpret what it reports. Failure is detected only by
//! polling, so it lags a real failure by up to one interval; on detection
//! the loop ends early without waiting for remaining work. Either way the
//! loop exits, failures are re-checked once more and a best-effort stop is
//! issued to the substrate.

pub mod state;
pub mod ticker;

use crate::substrate::{JobControl, JobDescriptor, JobStatus};
use self::ticker::Ticker;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info};

/// Delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Dump the job-state buckets every this many poll iterations.
pub const DEFAULT_REPORT_EVERY: u64 = 10_000;

/// How a supervised job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisionOutcome {
    Completed,
    /// The failed jobs, each reported exactly once.
    Failed(Vec<JobDescriptor>),
}

pub struct JobSupervisor {
    report_every: u64,
}

impl JobSupervisor {
    pub fn new() -> Self {
        Self {
            report_every: DEFAULT_REPORT_EVERY,
        }
    }

    pub fn with_report_every(mut self, report_every: u64) -> Self {
        self.report_every = report_every.max(1);
        self
    }

    /// Poll `control` until the substrate reports the job finished, or
    /// until a failure is observed.
    ///
    /// Each iteration checks for failed jobs first and breaks early when
    /// any are present. Every `report_every` iterations (the first
    /// included) the Running/Ready/Waiting/Succeeded buckets are dumped at
    /// info level, purely observationally. On exit the failure check runs
    /// once more — a job can fail between the last poll and loop exit —
    /// and `stop()` is issued. Failure messages are deduplicated by job
    /// name across the in-loop report and the exit re-check, so each is
    /// surfaced exactly once.
    pub async fn supervise<C, T>(&self, control: &C, ticker: &mut T) -> SupervisionOutcome
    where
        C: JobControl,
        T: Ticker,
    {
        let mut status = JobStatus::Waiting;
        let mut reported: HashSet<String> = HashSet::new();
        let mut failures: Vec<JobDescriptor> = Vec::new();
        let mut iteration: u64 = 0;

        while !control.all_finished().await {
            let failed = control.failed_jobs().await;
            if !failed.is_empty() {
                report_failures(failed, &mut reported, &mut failures);
                status = advance(status, JobStatus::Failed);
                break;
            }

            status = advance(status, observed_status(control).await);

            if iteration % self.report_every == 0 {
                report_buckets(control).await;
            }
            iteration += 1;
            ticker.tick().await;
        }

        let failed = control.failed_jobs().await;
        if !failed.is_empty() {
            report_failures(failed, &mut reported, &mut failures);
            status = advance(status, JobStatus::Failed);
        } else if failures.is_empty() {
            status = advance(status, JobStatus::Succeeded);
        }
        debug!(?status, "supervision finished");
        control.stop().await;

        if failures.is_empty() {
            SupervisionOutcome::Completed
        } else {
            SupervisionOutcome::Failed(failures)
        }
    }
}

impl Default for JobSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold a polled status into the tracked one, keeping the current status
/// when the substrate reports something the state machine rejects.
fn advance(current: JobStatus, observed: JobStatus) -> JobStatus {
    match state::observe(current, observed) {
        Ok(next) => {
            if next != current {
                debug!(from = ?current, to = ?next, "job status advanced");
            }
            next
        }
        Err(e) => {
            debug!("{e}, keeping {current:?}");
            current
        }
    }
}

/// Derive the job's non-terminal status from the substrate's buckets.
async fn observed_status<C: JobControl>(control: &C) -> JobStatus {
    if !control.running_jobs().await.is_empty() {
        JobStatus::Running
    } else if !control.ready_jobs().await.is_empty() {
        JobStatus::Ready
    } else {
        JobStatus::Waiting
    }
}

fn report_failures(
    failed: Vec<JobDescriptor>,
    reported: &mut HashSet<String>,
    failures: &mut Vec<JobDescriptor>,
) {
    for job in failed {
        if reported.insert(job.name.clone()) {
            let message = job.failure_message.as_deref().unwrap_or("no failure message");
            error!(job = %job.name, "job failed: {message}");
            failures.push(job);
        }
    }
}

async fn report_buckets<C: JobControl>(control: &C) {
    let buckets = [
        ("running", control.running_jobs().await),
        ("ready", control.ready_jobs().await),
        ("waiting", control.waiting_jobs().await),
        ("successful", control.successful_jobs().await),
    ];
    for (label, jobs) in buckets {
        let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
        info!("{label} jobs: [{}]", names.join(", "));
    }
}
