//! The job-execution interface this crate consumes, not implements.
//!
//! The pipeline runs under an external execution substrate that schedules
//! extract/combine/reduce invocations, guarantees every tuple for a key
//! reaches a single aggregator call, and reports job state. This module
//! defines the narrow surface the supervisor polls ([`JobControl`]) and the
//! submission request shape; [`local`] provides an in-process
//! implementation so the binary runs end to end without a cluster.

pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Lifecycle state the substrate reports for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Waiting,
    Ready,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// One job as the substrate describes it in a status poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub name: String,
    pub status: JobStatus,
    pub failure_message: Option<String>,
}

/// Submission request: where to read, where to write, and the pass-through
/// configuration the substrate forwards to its workers.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Final-stage parallelism. Fixed at 1 for this pipeline.
    pub reduce_parallelism: usize,
    pub properties: HashMap<String, String>,
}

impl JobRequest {
    pub fn new(name: impl Into<String>, input: PathBuf, output: PathBuf) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            reduce_parallelism: 1,
            properties: HashMap::new(),
        }
    }

    /// Copy the process environment into the pass-through properties, the
    /// way the submitting host propagates its configuration to workers.
    pub fn with_env(mut self) -> Self {
        self.properties = std::env::vars().collect();
        self
    }
}

/// Poll surface of a submitted job.
///
/// Failure is observable only through [`failed_jobs`](Self::failed_jobs);
/// there is no push notification, so detection lags a real failure by up to
/// one poll interval. [`stop`](Self::stop) is a best-effort request —
/// in-flight work may continue briefly after it returns.
#[async_trait]
pub trait JobControl: Send + Sync {
    async fn all_finished(&self) -> bool;
    async fn failed_jobs(&self) -> Vec<JobDescriptor>;
    async fn running_jobs(&self) -> Vec<JobDescriptor>;
    async fn ready_jobs(&self) -> Vec<JobDescriptor>;
    async fn waiting_jobs(&self) -> Vec<JobDescriptor>;
    async fn successful_jobs(&self) -> Vec<JobDescriptor>;
    async fn stop(&self);
}
